use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::super::{publish_events, ChatError, CommandHandler, SharedSession};
use crate::infrastructure::EventBus;
use crate::modules::chat::domain::{MessageId, Persona, SendRejection};
use crate::modules::chat::ports::{FragmentStream, FragmentSubscription, LLMError};

/// 发送消息命令
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    /// 用户输入（未去除空白）
    pub text: String,
}

impl SendMessageCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 一次发送的结果
#[derive(Debug)]
pub enum SendOutcome {
    /// 未受理：空白文本、已有发送在进行或会话未就绪
    Ignored(SendRejection),
    /// 流正常结束
    Completed {
        /// 助手回复的消息 ID，零片段时为 None
        reply_id: Option<MessageId>,
        fragments: usize,
    },
    /// 出错，转录中已追加失败提示
    Failed { error: ChatError },
}

impl SendOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, SendOutcome::Ignored(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SendOutcome::Completed { .. })
    }
}

/// 发送消息命令处理器
///
/// 受理检查与状态切换在同一次写锁内完成，流式消费期间不持有锁
pub struct SendMessageHandler {
    slot: SharedSession,
    persona: Persona,
    fragment_timeout: Option<Duration>,
    event_bus: Arc<EventBus>,
}

impl SendMessageHandler {
    pub fn new(
        slot: SharedSession,
        persona: Persona,
        fragment_timeout: Option<Duration>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            slot,
            persona,
            fragment_timeout,
            event_bus,
        }
    }

    /// 发起请求，等待期间同样响应取消和超时
    async fn open_stream(
        &self,
        transport: &dyn crate::modules::chat::ports::ChatTransport,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<FragmentStream, LLMError> {
        let request = async {
            match self.fragment_timeout {
                Some(limit) => tokio::time::timeout(limit, transport.send_message_stream(text))
                    .await
                    .unwrap_or(Err(LLMError::Timeout(limit.as_secs()))),
                None => transport.send_message_stream(text).await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LLMError::Cancelled),
            result = request => result,
        }
    }

    /// 消费片段流，返回收到的片段数
    async fn consume(&self, mut subscription: FragmentSubscription) -> Result<usize, LLMError> {
        while let Some(item) = subscription.next().await {
            let fragment = item?;
            debug!(
                "[SendMessageHandler] Fragment #{} ({} chars)",
                subscription.received(),
                fragment.len()
            );
            let events = {
                let mut slot = self.slot.write().await;
                slot.session.apply_fragment(&fragment)
            };
            publish_events(&self.event_bus, events);
        }
        Ok(subscription.received())
    }

    async fn finish(&self, result: Result<usize, LLMError>) -> SendOutcome {
        let mut slot = self.slot.write().await;
        slot.in_flight = None;

        match result {
            Ok(fragments) => {
                let reply_id = slot.session.reply_id();
                let events = slot.session.complete_send();
                drop(slot);
                publish_events(&self.event_bus, events);
                info!(
                    "[SendMessageHandler] Reply completed with {} fragments",
                    fragments
                );
                SendOutcome::Completed {
                    reply_id,
                    fragments,
                }
            }
            Err(e) => {
                error!("[SendMessageHandler] Error sending message: {}", e);
                let events = slot.session.fail_send(
                    &self.persona.failure_text,
                    &self.persona.error_banner,
                    &e.to_string(),
                );
                drop(slot);
                publish_events(&self.event_bus, events);
                SendOutcome::Failed {
                    error: ChatError::Transport(e),
                }
            }
        }
    }
}

#[async_trait]
impl CommandHandler<SendMessageCommand, SendOutcome> for SendMessageHandler {
    async fn handle(&self, command: SendMessageCommand) -> Result<SendOutcome, ChatError> {
        let cancel = CancellationToken::new();

        let (pending, transport) = {
            let mut slot = self.slot.write().await;
            let (pending, events) = match slot
                .session
                .begin_send(&command.text, &self.persona.typing_text)
            {
                Ok(accepted) => accepted,
                Err(rejection) => {
                    debug!("[SendMessageHandler] Send ignored: {}", rejection);
                    return Ok(SendOutcome::Ignored(rejection));
                }
            };
            slot.in_flight = Some(cancel.clone());
            let transport = slot.transport.clone();
            drop(slot);
            publish_events(&self.event_bus, events);
            (pending, transport)
        };

        info!(
            "[SendMessageHandler] Sending message {} ({} chars)",
            pending.user_message_id,
            pending.text.len()
        );

        let result = match transport {
            Some(transport) => {
                let opened = self
                    .open_stream(transport.as_ref(), &pending.text, &cancel)
                    .await;
                match opened {
                    Ok(stream) => {
                        let subscription = FragmentSubscription::new(stream, cancel)
                            .with_fragment_timeout(self.fragment_timeout);
                        self.consume(subscription).await
                    }
                    Err(e) => Err(e),
                }
            }
            None => Err(LLMError::InvalidRequest(
                "chat session has no transport".to_string(),
            )),
        };

        Ok(self.finish(result).await)
    }
}
