use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::Message;
use super::value_objects::{MessageId, SessionId, SessionState, UnavailableReason};

/// 领域事件基础 trait
pub trait DomainEvent: Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// 消息追加事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAppendedEvent {
    pub session_id: SessionId,
    pub message: Message,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for MessageAppendedEvent {
    fn event_type(&self) -> &'static str {
        "message.appended"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 流式片段写入事件
///
/// `fragment` 是本次追加的内容，`text` 是追加后的完整文本
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdatedEvent {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub fragment: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for MessageUpdatedEvent {
    fn event_type(&self) -> &'static str {
        "message.updated"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 消息移除事件（占位消息被替换或清理）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRemovedEvent {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for MessageRemovedEvent {
    fn event_type(&self) -> &'static str {
        "message.removed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 会话状态变更事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateChangedEvent {
    pub session_id: SessionId,
    pub from: SessionState,
    pub to: SessionState,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for SessionStateChangedEvent {
    fn event_type(&self) -> &'static str {
        "session.state_changed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 会话不可用事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUnavailableEvent {
    pub session_id: SessionId,
    pub reason: UnavailableReason,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for SessionUnavailableEvent {
    fn event_type(&self) -> &'static str {
        "session.unavailable"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 发送失败事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFailedEvent {
    pub session_id: SessionId,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for SendFailedEvent {
    fn event_type(&self) -> &'static str {
        "send.failed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 聊天领域事件枚举
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatDomainEvent {
    MessageAppended(MessageAppendedEvent),
    MessageUpdated(MessageUpdatedEvent),
    MessageRemoved(MessageRemovedEvent),
    StateChanged(SessionStateChangedEvent),
    SessionUnavailable(SessionUnavailableEvent),
    SendFailed(SendFailedEvent),
}

impl ChatDomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatDomainEvent::MessageAppended(e) => e.event_type(),
            ChatDomainEvent::MessageUpdated(e) => e.event_type(),
            ChatDomainEvent::MessageRemoved(e) => e.event_type(),
            ChatDomainEvent::StateChanged(e) => e.event_type(),
            ChatDomainEvent::SessionUnavailable(e) => e.event_type(),
            ChatDomainEvent::SendFailed(e) => e.event_type(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            ChatDomainEvent::MessageAppended(e) => e.session_id,
            ChatDomainEvent::MessageUpdated(e) => e.session_id,
            ChatDomainEvent::MessageRemoved(e) => e.session_id,
            ChatDomainEvent::StateChanged(e) => e.session_id,
            ChatDomainEvent::SessionUnavailable(e) => e.session_id,
            ChatDomainEvent::SendFailed(e) => e.session_id,
        }
    }
}
