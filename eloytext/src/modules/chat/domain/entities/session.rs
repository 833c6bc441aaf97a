use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::super::events::{
    ChatDomainEvent, MessageAppendedEvent, MessageRemovedEvent, MessageUpdatedEvent,
    SendFailedEvent, SessionStateChangedEvent, SessionUnavailableEvent,
};
use super::super::value_objects::{MessageId, SessionId, SessionState, UnavailableReason};
use super::{Message, Transcript};

/// 发送被拒绝的原因（调用方视为 no-op）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SendRejection {
    /// 文本为空或仅含空白
    EmptyText,
    /// 已有一个发送在进行中
    AlreadySending,
    /// 会话未就绪（未初始化或不可用）
    NotReady(SessionState),
}

impl fmt::Display for SendRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendRejection::EmptyText => f.write_str("message text is empty"),
            SendRejection::AlreadySending => f.write_str("a send is already in flight"),
            SendRejection::NotReady(state) => write!(f, "session is {}", state),
        }
    }
}

/// 已受理的发送
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub user_message_id: MessageId,
    pub placeholder_id: MessageId,
    /// 去除首尾空白后的文本
    pub text: String,
}

/// 聊天会话 - 聚合根
///
/// 持有转录和状态机。所有变更方法返回产生的领域事件，
/// 由应用层负责发布。
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: SessionId,
    state: SessionState,
    transcript: Transcript,
    last_error: Option<String>,
    unavailable_reason: Option<UnavailableReason>,
    /// 当前 "正在输入" 占位消息
    placeholder_id: Option<MessageId>,
    /// 当前正在接收片段的助手消息
    reply_id: Option<MessageId>,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Uninitialized,
            transcript: Transcript::new(),
            last_error: None,
            unavailable_reason: None,
            placeholder_id: None,
            reply_id: None,
            created_at: Utc::now(),
        }
    }

    // Getters
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        self.unavailable_reason.as_ref()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state.is_awaiting_response()
    }

    pub fn reply_id(&self) -> Option<MessageId> {
        self.reply_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // 业务方法

    /// 初始化成功：进入 Ready 并写入问候语
    ///
    /// 仅在 Uninitialized 状态生效
    pub fn activate(&mut self, greeting: Option<&str>) -> Vec<ChatDomainEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Uninitialized {
            return events;
        }

        if let Some(greeting) = greeting {
            self.append(Message::new_assistant(greeting), &mut events);
        }
        self.transition(SessionState::Ready, &mut events);
        events
    }

    /// 初始化失败或缺少凭据：进入终态 Unavailable
    pub fn mark_unavailable(
        &mut self,
        reason: UnavailableReason,
        error: Option<String>,
    ) -> Vec<ChatDomainEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Uninitialized {
            return events;
        }

        self.last_error = error;
        self.unavailable_reason = Some(reason.clone());
        self.transition(SessionState::Unavailable, &mut events);
        events.push(ChatDomainEvent::SessionUnavailable(SessionUnavailableEvent {
            session_id: self.id,
            reason,
            timestamp: Utc::now(),
        }));
        events
    }

    /// 受理一次发送：追加用户消息和占位消息，进入 Sending
    pub fn begin_send(
        &mut self,
        text: &str,
        placeholder_text: &str,
    ) -> Result<(PendingSend, Vec<ChatDomainEvent>), SendRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SendRejection::EmptyText);
        }
        match self.state {
            SessionState::Ready => {}
            SessionState::Sending => return Err(SendRejection::AlreadySending),
            other => return Err(SendRejection::NotReady(other)),
        }

        let mut events = Vec::new();
        let user_message = Message::new_user(trimmed);
        let user_message_id = user_message.id();
        self.append(user_message, &mut events);

        let placeholder = Message::placeholder(placeholder_text);
        let placeholder_id = placeholder.id();
        self.append(placeholder, &mut events);
        self.placeholder_id = Some(placeholder_id);
        self.reply_id = None;
        self.last_error = None;

        self.transition(SessionState::Sending, &mut events);

        Ok((
            PendingSend {
                user_message_id,
                placeholder_id,
                text: trimmed.to_string(),
            },
            events,
        ))
    }

    /// 写入一个流式片段
    ///
    /// 第一个片段用新的助手消息替换占位消息，之后的片段按 ID 追加到同一条消息
    pub fn apply_fragment(&mut self, fragment: &str) -> Vec<ChatDomainEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Sending {
            return events;
        }

        if let Some(reply_id) = self.reply_id {
            if let Some(message) = self
                .transcript
                .update(reply_id, |m| m.append_text(fragment))
            {
                events.push(ChatDomainEvent::MessageUpdated(MessageUpdatedEvent {
                    session_id: self.id,
                    message_id: reply_id,
                    fragment: fragment.to_string(),
                    text: message.text().to_string(),
                    timestamp: Utc::now(),
                }));
            }
            return events;
        }

        self.remove_placeholder(&mut events);
        let reply = Message::new_assistant(fragment);
        self.reply_id = Some(reply.id());
        self.append(reply, &mut events);
        events
    }

    /// 流正常结束：清理残留的占位消息，回到 Ready
    pub fn complete_send(&mut self) -> Vec<ChatDomainEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Sending {
            return events;
        }

        self.remove_placeholder(&mut events);
        self.reply_id = None;
        self.transition(SessionState::Ready, &mut events);
        events
    }

    /// 发送或流式过程中出错
    ///
    /// 移除占位消息，追加终止提示，记录 `last_error`，会话仍可继续使用。
    /// 已经收到的部分回复保留在转录中。
    pub fn fail_send(
        &mut self,
        failure_text: &str,
        banner: &str,
        cause: &str,
    ) -> Vec<ChatDomainEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Sending {
            return events;
        }

        self.remove_placeholder(&mut events);
        self.reply_id = None;
        self.append(Message::failure(failure_text), &mut events);
        self.last_error = Some(banner.to_string());
        events.push(ChatDomainEvent::SendFailed(SendFailedEvent {
            session_id: self.id,
            error: cause.to_string(),
            timestamp: Utc::now(),
        }));
        self.transition(SessionState::Ready, &mut events);
        events
    }

    fn append(&mut self, message: Message, events: &mut Vec<ChatDomainEvent>) {
        if self.transcript.push(message.clone()) {
            events.push(ChatDomainEvent::MessageAppended(MessageAppendedEvent {
                session_id: self.id,
                message,
                timestamp: Utc::now(),
            }));
        }
    }

    fn remove_placeholder(&mut self, events: &mut Vec<ChatDomainEvent>) {
        if let Some(placeholder_id) = self.placeholder_id.take() {
            if self.transcript.remove(placeholder_id).is_some() {
                events.push(ChatDomainEvent::MessageRemoved(MessageRemovedEvent {
                    session_id: self.id,
                    message_id: placeholder_id,
                    timestamp: Utc::now(),
                }));
            }
        }
    }

    fn transition(&mut self, to: SessionState, events: &mut Vec<ChatDomainEvent>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        events.push(ChatDomainEvent::StateChanged(SessionStateChangedEvent {
            session_id: self.id,
            from,
            to,
            timestamp: Utc::now(),
        }));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
