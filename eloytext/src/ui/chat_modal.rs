// Chat Modal View Model
//
// 聊天窗口的渲染数据，由会话快照和输入草稿计算得出

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;

use crate::modules::chat::{ChatSnapshot, Message, MessageId, MessageKind, SessionState};

pub const TITLE: &str = "EloyText Live Chat";
pub const CLOSE_LABEL: &str = "Close chat";
pub const SEND_LABEL: &str = "Send message";

const INPUT_PLACEHOLDER: &str = "Type your message...";
const INPUT_PLACEHOLDER_UNAVAILABLE: &str = "Chat unavailable (API key missing)";
const INPUT_LABEL: &str = "Type your message";
const INPUT_LABEL_UNAVAILABLE: &str = "Chat input disabled due to missing API key";

/// 输入框按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Enter { shift: bool },
    Other,
}

/// 按键对应的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// 发送草稿
    Send,
    /// 交给输入框处理（换行或普通输入）
    Passthrough,
}

impl KeyInput {
    /// Enter 发送，Shift+Enter 换行
    pub fn action(&self) -> KeyAction {
        match self {
            KeyInput::Enter { shift: false } => KeyAction::Send,
            _ => KeyAction::Passthrough,
        }
    }
}

/// 单条消息的渲染数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub is_user: bool,
    pub text: String,
    pub time_label: String,
    pub is_typing: bool,
    pub is_failure: bool,
}

impl MessageView {
    fn from_message<Tz>(message: &Message, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            id: message.id(),
            is_user: message.is_user(),
            text: message.text().to_string(),
            time_label: time_label(message.created_at(), tz),
            is_typing: message.kind() == MessageKind::Placeholder,
            is_failure: message.kind() == MessageKind::Failure,
        }
    }
}

/// 两位小时和分钟，例如 `09:05`
pub fn time_label<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%H:%M").to_string()
}

/// 聊天窗口渲染数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatModal {
    pub title: &'static str,
    pub close_label: &'static str,
    /// 聊天不可用时的常驻横幅
    pub unavailable_banner: Option<String>,
    /// 发送失败的横幅，仅在聊天可用时显示
    pub error_banner: Option<String>,
    pub messages: Vec<MessageView>,
    pub draft: String,
    pub input_placeholder: &'static str,
    pub input_label: &'static str,
    pub input_disabled: bool,
    pub send_label: &'static str,
    pub send_disabled: bool,
}

impl ChatModal {
    /// 按本地时区渲染
    pub fn render(snapshot: &ChatSnapshot, draft: &str) -> Self {
        Self::render_in(snapshot, draft, &Local)
    }

    pub fn render_in<Tz>(snapshot: &ChatSnapshot, draft: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let unavailable = snapshot.state == SessionState::Unavailable;

        let unavailable_banner = if unavailable {
            snapshot.unavailable_banner.clone()
        } else {
            None
        };
        let error_banner = if unavailable {
            None
        } else {
            snapshot.last_error.clone()
        };

        let input_disabled = snapshot.is_awaiting_response || unavailable;

        Self {
            title: TITLE,
            close_label: CLOSE_LABEL,
            unavailable_banner,
            error_banner,
            messages: snapshot
                .messages
                .iter()
                .map(|m| MessageView::from_message(m, tz))
                .collect(),
            draft: draft.to_string(),
            input_placeholder: if unavailable {
                INPUT_PLACEHOLDER_UNAVAILABLE
            } else {
                INPUT_PLACEHOLDER
            },
            input_label: if unavailable {
                INPUT_LABEL_UNAVAILABLE
            } else {
                INPUT_LABEL
            },
            input_disabled,
            send_label: SEND_LABEL,
            send_disabled: input_disabled || draft.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::{SessionId, UnavailableReason};
    use chrono::FixedOffset;

    fn snapshot(state: SessionState) -> ChatSnapshot {
        ChatSnapshot {
            session_id: SessionId::new(),
            state,
            is_awaiting_response: state == SessionState::Sending,
            last_error: None,
            unavailable_reason: None,
            unavailable_banner: None,
            messages: vec![Message::new_assistant("Hello!")],
        }
    }

    #[test]
    fn test_enter_sends_shift_enter_does_not() {
        assert_eq!(KeyInput::Enter { shift: false }.action(), KeyAction::Send);
        assert_eq!(
            KeyInput::Enter { shift: true }.action(),
            KeyAction::Passthrough
        );
        assert_eq!(KeyInput::Other.action(), KeyAction::Passthrough);
    }

    #[test]
    fn test_ready_modal() {
        let modal = ChatModal::render_in(&snapshot(SessionState::Ready), "", &Utc);
        assert_eq!(modal.title, "EloyText Live Chat");
        assert_eq!(modal.input_placeholder, "Type your message...");
        assert!(!modal.input_disabled);
        assert!(modal.send_disabled, "blank draft");
        assert!(modal.unavailable_banner.is_none());

        let modal = ChatModal::render_in(&snapshot(SessionState::Ready), "Hi", &Utc);
        assert!(!modal.send_disabled);
    }

    #[test]
    fn test_sending_disables_input() {
        let modal = ChatModal::render_in(&snapshot(SessionState::Sending), "Hi", &Utc);
        assert!(modal.input_disabled);
        assert!(modal.send_disabled);
    }

    #[test]
    fn test_missing_key_banner_and_placeholder() {
        let mut snap = snapshot(SessionState::Unavailable);
        snap.messages.clear();
        snap.unavailable_reason = Some(UnavailableReason::MissingCredential);
        snap.unavailable_banner =
            Some("Live chat is temporarily unavailable. The API key is not configured.".into());

        let modal = ChatModal::render_in(&snap, "Hi", &Utc);
        assert_eq!(
            modal.unavailable_banner.as_deref(),
            Some("Live chat is temporarily unavailable. The API key is not configured.")
        );
        assert_eq!(modal.input_placeholder, "Chat unavailable (API key missing)");
        assert_eq!(
            modal.input_label,
            "Chat input disabled due to missing API key"
        );
        assert!(modal.input_disabled && modal.send_disabled);
    }

    #[test]
    fn test_error_banner_hidden_when_unavailable() {
        let mut snap = snapshot(SessionState::Unavailable);
        snap.last_error = Some("Could not initialize chat service. Please try again later.".into());
        snap.unavailable_banner =
            Some("Live chat is temporarily unavailable. The API key is not configured.".into());
        let modal = ChatModal::render_in(&snap, "", &Utc);
        assert!(modal.error_banner.is_none());
        assert_eq!(
            modal.unavailable_banner.as_deref(),
            Some("Live chat is temporarily unavailable. The API key is not configured.")
        );

        let mut snap = snapshot(SessionState::Ready);
        snap.last_error = Some("Sorry, something went wrong. Please try again.".into());
        let modal = ChatModal::render_in(&snap, "", &Utc);
        assert_eq!(
            modal.error_banner.as_deref(),
            Some("Sorry, something went wrong. Please try again.")
        );
    }

    #[test]
    fn test_time_label_uses_zone() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T08:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(time_label(at, &Utc), "08:05");
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(time_label(at, &plus_two), "10:05");
    }

    #[test]
    fn test_message_flags() {
        let mut snap = snapshot(SessionState::Sending);
        snap.messages.push(Message::new_user("Hi"));
        snap.messages.push(Message::placeholder("EloyText is typing..."));
        let modal = ChatModal::render_in(&snap, "", &Utc);
        assert!(!modal.messages[0].is_user);
        assert!(modal.messages[1].is_user);
        assert!(modal.messages[2].is_typing);
    }
}
