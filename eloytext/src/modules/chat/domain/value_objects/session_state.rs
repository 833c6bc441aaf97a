use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话状态机
///
/// `Uninitialized → Ready → Sending → Ready`，
/// 凭据缺失或初始化失败时 `Uninitialized → Unavailable`（页面生命周期内终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Uninitialized,
    Ready,
    Sending,
    Unavailable,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Ready => "ready",
            SessionState::Sending => "sending",
            SessionState::Unavailable => "unavailable",
        }
    }

    /// 是否正在等待模型回复
    pub fn is_awaiting_response(&self) -> bool {
        matches!(self, SessionState::Sending)
    }

    pub fn can_send(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Unavailable)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会话不可用的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum UnavailableReason {
    /// 未配置 API 凭据
    MissingCredential,
    /// 创建远程会话时出错
    InitializationFailed(String),
}
