use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{
    CancelGenerationCommand, CancelGenerationHandler, ChatError, ChatSnapshot, CommandHandler,
    GetSnapshotHandler, GetSnapshotQuery, OpenSessionCommand, OpenSessionHandler,
    QueryHandler, SendMessageCommand, SendMessageHandler, SendOutcome, SessionSlot,
    SharedSession,
};
use crate::infrastructure::EventBus;
use crate::modules::chat::domain::{Persona, SessionId, SessionState};
use crate::modules::chat::ports::GenerativeModelPort;
use crate::modules::config::ChatConfig;

/// 聊天会话管理器
///
/// 页面生命周期内唯一的会话。由拥有它的组件持有，随组件一起销毁；
/// 关闭聊天窗口不会销毁会话，也不会取消进行中的发送。
pub struct ChatSessionManager {
    slot: SharedSession,
    open_handler: OpenSessionHandler,
    send_handler: SendMessageHandler,
    cancel_handler: CancelGenerationHandler,
    snapshot_handler: GetSnapshotHandler,
}

impl ChatSessionManager {
    pub fn new(
        model: Arc<dyn GenerativeModelPort>,
        config: ChatConfig,
        persona: Persona,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let slot: SharedSession = Arc::new(RwLock::new(SessionSlot::new()));
        let fragment_timeout = config.response_timeout;

        Self {
            open_handler: OpenSessionHandler::new(
                slot.clone(),
                model,
                config,
                persona.clone(),
                event_bus.clone(),
            ),
            send_handler: SendMessageHandler::new(
                slot.clone(),
                persona.clone(),
                fragment_timeout,
                event_bus,
            ),
            cancel_handler: CancelGenerationHandler::new(slot.clone()),
            snapshot_handler: GetSnapshotHandler::new(slot.clone(), persona),
            slot,
        }
    }

    /// 打开会话（幂等）
    ///
    /// 首次调用时创建远程会话；缺少凭据或创建失败时会话进入 Unavailable
    pub async fn open_session(&self) -> Result<SessionState, ChatError> {
        let response = self.open_handler.handle(OpenSessionCommand).await?;
        if response.created {
            info!("[ChatSessionManager] Session opened");
        }
        Ok(response.state)
    }

    /// 发送用户消息并消费回复流，直到流结束或出错
    pub async fn send_user_message(&self, text: &str) -> SendOutcome {
        match self
            .send_handler
            .handle(SendMessageCommand::new(text))
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => SendOutcome::Failed { error },
        }
    }

    /// 在后台任务中发送，调用方可立即返回继续渲染
    pub fn spawn_send(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<SendOutcome> {
        let manager = Arc::clone(self);
        let text = text.into();
        tokio::spawn(async move { manager.send_user_message(&text).await })
    }

    /// 关闭聊天窗口，会话和进行中的发送保持不变
    pub async fn close_session(&self) {
        let slot = self.slot.read().await;
        debug!(
            "[ChatSessionManager] Widget closed, session {} kept ({} messages, state {})",
            slot.session.id(),
            slot.session.transcript().len(),
            slot.session.state()
        );
    }

    /// 停止当前生成，返回是否有发送被取消
    pub async fn cancel_in_flight(&self) -> bool {
        self.cancel_handler
            .handle(CancelGenerationCommand)
            .await
            .unwrap_or(false)
    }

    /// 当前会话快照
    pub async fn snapshot(&self) -> Result<ChatSnapshot, ChatError> {
        self.snapshot_handler.handle(GetSnapshotQuery).await
    }

    pub async fn state(&self) -> SessionState {
        self.slot.read().await.session.state()
    }

    pub async fn session_id(&self) -> SessionId {
        self.slot.read().await.session.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::AppEvent;
    use crate::modules::chat::domain::{ChatDomainEvent, MessageKind, MessageRole, SendRejection};
    use crate::modules::chat::ports::{
        ChatSetup, ChatTransport, FragmentStream, LLMError, ProviderInfo,
    };
    use crate::modules::config::ApiKey;
    use async_trait::async_trait;
    use futures::stream;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    type FragmentSender = mpsc::UnboundedSender<Result<String, LLMError>>;

    /// 由测试逐个推送片段的模型
    struct ChannelModel {
        pending: Arc<Mutex<VecDeque<mpsc::UnboundedReceiver<Result<String, LLMError>>>>>,
        fail_on_create: bool,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl ChannelModel {
        fn new() -> Self {
            Self {
                pending: Arc::new(Mutex::new(VecDeque::new())),
                fail_on_create: false,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                fail_on_create: true,
                ..Self::new()
            }
        }

        /// 为下一次发送准备一个回复通道
        fn next_reply(&self) -> FragmentSender {
            let (tx, rx) = mpsc::unbounded_channel();
            self.pending.lock().unwrap().push_back(rx);
            tx
        }
    }

    struct ChannelChat {
        pending: Arc<Mutex<VecDeque<mpsc::UnboundedReceiver<Result<String, LLMError>>>>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatTransport for ChannelChat {
        async fn send_message_stream(&self, text: &str) -> Result<FragmentStream, LLMError> {
            self.sent.lock().unwrap().push(text.to_string());
            let rx = self
                .pending
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::NetworkError("no reply scripted".to_string()))?;
            Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })))
        }
    }

    impl GenerativeModelPort for ChannelModel {
        fn provider_info(&self) -> ProviderInfo {
            ProviderInfo {
                id: "channel".to_string(),
                name: "Channel".to_string(),
                model: "test".to_string(),
            }
        }

        fn create_chat(
            &self,
            _credential: &ApiKey,
            _setup: ChatSetup,
        ) -> Result<Arc<dyn ChatTransport>, LLMError> {
            if self.fail_on_create {
                return Err(LLMError::NetworkError("unreachable".to_string()));
            }
            Ok(Arc::new(ChannelChat {
                pending: self.pending.clone(),
                sent: self.sent.clone(),
            }))
        }
    }

    fn config_with_key() -> ChatConfig {
        ChatConfig {
            api_key: ApiKey::new("test-key"),
            ..ChatConfig::default()
        }
    }

    fn manager(model: Arc<ChannelModel>, config: ChatConfig) -> Arc<ChatSessionManager> {
        Arc::new(ChatSessionManager::new(
            model,
            config,
            Persona::eloytext(),
            Arc::new(EventBus::new()),
        ))
    }

    /// 让后台发送任务运行，直到条件满足
    async fn settle_until<F>(manager: &ChatSessionManager, mut done: F) -> ChatSnapshot
    where
        F: FnMut(&ChatSnapshot) -> bool,
    {
        for _ in 0..200 {
            let snapshot = manager.snapshot().await.unwrap();
            if done(&snapshot) {
                return snapshot;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }

    fn texts(snapshot: &ChatSnapshot) -> Vec<&str> {
        snapshot.messages.iter().map(|m| m.text()).collect()
    }

    #[tokio::test]
    async fn test_open_session_seeds_greeting_once() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model, config_with_key());

        assert_eq!(manager.open_session().await.unwrap(), SessionState::Ready);
        assert_eq!(manager.open_session().await.unwrap(), SessionState::Ready);

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].role(), MessageRole::Assistant);
        assert_eq!(snapshot.messages[0].text(), Persona::eloytext().greeting);
    }

    #[tokio::test]
    async fn test_missing_credential_makes_chat_unavailable() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), ChatConfig::default());

        let err = manager.open_session().await.unwrap_err();
        assert!(matches!(err, ChatError::Configuration(_)));
        assert!(err.is_permanent());

        let snapshot = manager.snapshot().await.unwrap();
        assert!(snapshot.is_unavailable());
        assert!(snapshot.messages.is_empty());
        assert_eq!(
            snapshot.unavailable_banner.as_deref(),
            Some("Live chat is temporarily unavailable. The API key is not configured.")
        );

        // 再次打开仍然不可用，发送被忽略且不产生网络请求
        assert!(manager.open_session().await.is_err());
        let outcome = manager.send_user_message("Hello").await;
        assert!(matches!(
            outcome,
            SendOutcome::Ignored(SendRejection::NotReady(SessionState::Unavailable))
        ));
        assert!(model.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialization_failure_sets_last_error() {
        let model = Arc::new(ChannelModel::failing());
        let manager = manager(model, config_with_key());

        let err = manager.open_session().await.unwrap_err();
        assert!(matches!(err, ChatError::Initialization(_)));

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Unavailable);
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Could not initialize chat service. Please try again later.")
        );
        assert_eq!(
            snapshot.unavailable_banner.as_deref(),
            Some("Live chat is temporarily unavailable. The API key is not configured.")
        );
    }

    #[tokio::test]
    async fn test_blank_text_is_ignored() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let outcome = manager.send_user_message("   \n\t").await;
        assert!(matches!(outcome, SendOutcome::Ignored(SendRejection::EmptyText)));
        assert_eq!(manager.snapshot().await.unwrap().messages.len(), 1);
        assert!(model.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_before_open_is_ignored() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model, config_with_key());

        let outcome = manager.send_user_message("Hi").await;
        assert!(matches!(
            outcome,
            SendOutcome::Ignored(SendRejection::NotReady(SessionState::Uninitialized))
        ));
    }

    #[tokio::test]
    async fn test_streaming_scenario_builds_single_reply() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        let task = manager.spawn_send("  What services do you offer?  ");

        // 片段到达前：用户消息 + 占位消息
        let snapshot = settle_until(&manager, |s| s.messages.len() == 3).await;
        assert!(snapshot.is_awaiting_response);
        assert_eq!(snapshot.messages[1].text(), "What services do you offer?");
        assert_eq!(snapshot.messages[2].kind(), MessageKind::Placeholder);
        assert_eq!(snapshot.messages[2].text(), "EloyText is typing...");

        // 第一个片段替换占位消息
        reply.send(Ok("Legal".to_string())).unwrap();
        let snapshot = settle_until(&manager, |s| {
            s.messages.last().map(|m| m.text()) == Some("Legal")
        })
        .await;
        assert_eq!(snapshot.messages.len(), 3);
        assert!(snapshot.messages.iter().all(|m| !m.is_placeholder()));
        assert!(snapshot.is_awaiting_response);
        let reply_id = snapshot.messages[2].id();

        // 后续片段原地追加
        for fragment in [" Drafting", ", Copywriting", ", and Content Strategy."] {
            reply.send(Ok(fragment.to_string())).unwrap();
        }
        drop(reply);

        let outcome = task.await.unwrap();
        match outcome {
            SendOutcome::Completed {
                reply_id: Some(id),
                fragments,
            } => {
                assert_eq!(id, reply_id);
                assert_eq!(fragments, 4);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Ready);
        assert!(!snapshot.is_awaiting_response);
        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(
            snapshot.messages[2].text(),
            "Legal Drafting, Copywriting, and Content Strategy."
        );
        assert_eq!(
            model.sent.lock().unwrap().as_slice(),
            ["What services do you offer?"]
        );
    }

    #[tokio::test]
    async fn test_second_send_while_sending_is_ignored() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        let task = manager.spawn_send("first");
        settle_until(&manager, |s| s.is_awaiting_response).await;

        let outcome = manager.send_user_message("second").await;
        assert!(matches!(
            outcome,
            SendOutcome::Ignored(SendRejection::AlreadySending)
        ));

        drop(reply);
        assert!(task.await.unwrap().is_completed());
        assert_eq!(model.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_fragments_removes_placeholder() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        drop(model.next_reply());
        let outcome = manager.send_user_message("Hello").await;
        assert!(matches!(
            outcome,
            SendOutcome::Completed {
                reply_id: None,
                fragments: 0
            }
        ));

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(texts(&snapshot).len(), 2);
        assert!(snapshot.messages.iter().all(|m| !m.is_placeholder()));
    }

    #[tokio::test]
    async fn test_stream_error_recovers_session() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        reply
            .send(Err(LLMError::NetworkError("connection reset".to_string())))
            .unwrap();
        let outcome = manager.send_user_message("Hello").await;
        assert!(matches!(
            outcome,
            SendOutcome::Failed {
                error: ChatError::Transport(LLMError::NetworkError(_))
            }
        ));

        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Ready);
        assert!(snapshot.messages.iter().all(|m| !m.is_placeholder()));
        let last = snapshot.messages.last().unwrap();
        assert_eq!(last.role(), MessageRole::Assistant);
        assert_eq!(last.kind(), MessageKind::Failure);
        assert_eq!(last.text(), "Sorry, I encountered an error. Please try again.");
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Sorry, something went wrong. Please try again.")
        );

        // 会话仍可用，新的发送清除错误
        let reply = model.next_reply();
        reply.send(Ok("Sure.".to_string())).unwrap();
        drop(reply);
        assert!(manager.send_user_message("Again").await.is_completed());
        let snapshot = manager.snapshot().await.unwrap();
        assert!(snapshot.last_error.is_none());
        assert_eq!(snapshot.messages.last().unwrap().text(), "Sure.");
    }

    #[tokio::test]
    async fn test_error_after_partial_reply_keeps_partial_text() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        reply.send(Ok("Legal".to_string())).unwrap();
        reply
            .send(Err(LLMError::InvalidResponse("bad chunk".to_string())))
            .unwrap();
        let outcome = manager.send_user_message("Hello").await;
        assert!(matches!(outcome, SendOutcome::Failed { .. }));

        let snapshot = manager.snapshot().await.unwrap();
        let tail: Vec<&str> = texts(&snapshot).into_iter().skip(2).collect();
        assert_eq!(
            tail,
            vec!["Legal", "Sorry, I encountered an error. Please try again."]
        );
    }

    #[tokio::test]
    async fn test_close_and_reopen_preserves_transcript() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        reply.send(Ok("Hi there".to_string())).unwrap();
        drop(reply);
        manager.send_user_message("Hello").await;
        let before = manager.snapshot().await.unwrap();

        manager.close_session().await;
        manager.open_session().await.unwrap();

        let after = manager.snapshot().await.unwrap();
        assert_eq!(after.session_id, before.session_id);
        assert_eq!(texts(&after), texts(&before));
    }

    #[tokio::test]
    async fn test_close_does_not_cancel_in_flight_send() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        let reply = model.next_reply();
        let task = manager.spawn_send("Hello");
        settle_until(&manager, |s| s.is_awaiting_response).await;

        manager.close_session().await;
        reply.send(Ok("Still here".to_string())).unwrap();
        drop(reply);

        assert!(task.await.unwrap().is_completed());
        let snapshot = manager.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.last().unwrap().text(), "Still here");
    }

    #[tokio::test]
    async fn test_cancel_in_flight_reports_failure() {
        let model = Arc::new(ChannelModel::new());
        let manager = manager(model.clone(), config_with_key());
        manager.open_session().await.unwrap();

        assert!(!manager.cancel_in_flight().await);

        let _reply = model.next_reply();
        let task = manager.spawn_send("Hello");
        settle_until(&manager, |s| s.is_awaiting_response).await;

        assert!(manager.cancel_in_flight().await);
        let outcome = task.await.unwrap();
        assert!(matches!(
            outcome,
            SendOutcome::Failed {
                error: ChatError::Transport(LLMError::Cancelled)
            }
        ));
        assert_eq!(manager.state().await, SessionState::Ready);
        assert!(!manager.cancel_in_flight().await);
    }

    #[tokio::test]
    async fn test_events_published_for_stream() {
        let model = Arc::new(ChannelModel::new());
        let event_bus = Arc::new(EventBus::new());
        let manager = ChatSessionManager::new(
            model.clone(),
            config_with_key(),
            Persona::eloytext(),
            event_bus.clone(),
        );
        manager.open_session().await.unwrap();
        let mut rx = event_bus.subscribe();

        let reply = model.next_reply();
        reply.send(Ok("A".to_string())).unwrap();
        reply.send(Ok("B".to_string())).unwrap();
        drop(reply);
        manager.send_user_message("Hi").await;

        let mut updates = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Chat(ChatDomainEvent::MessageUpdated(e)) = event {
                updates.push(e.text);
            }
        }
        assert_eq!(updates, vec!["AB".to_string()]);
    }
}
