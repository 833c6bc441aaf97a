use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::value_objects::MessageId;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// 访客输入
    User,
    /// 模型回复（包括占位和错误提示）
    Assistant,
}

impl MessageRole {
    /// 转换为 Gemini 格式的角色名
    pub fn to_gemini_role(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }
}

/// 消息种类
///
/// 区分正常消息、"正在输入" 占位消息和发送失败后的终止提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Normal,
    Placeholder,
    Failure,
}

/// 消息实体
///
/// 属于 ChatSession 聚合，流式回复期间文本可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    role: MessageRole,
    kind: MessageKind,
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    fn build(role: MessageRole, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            kind,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// 创建用户消息
    pub fn new_user(text: impl Into<String>) -> Self {
        Self::build(MessageRole::User, MessageKind::Normal, text)
    }

    /// 创建助手消息
    pub fn new_assistant(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, MessageKind::Normal, text)
    }

    /// 创建 "正在输入" 占位消息
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, MessageKind::Placeholder, text)
    }

    /// 创建发送失败提示
    pub fn failure(text: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, MessageKind::Failure, text)
    }

    // Getters
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == MessageKind::Placeholder
    }

    /// 追加内容（用于流式响应）
    pub fn append_text(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }
}
