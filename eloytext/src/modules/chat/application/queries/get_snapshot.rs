use async_trait::async_trait;
use serde::Serialize;

use super::super::{ChatError, QueryHandler, SharedSession};
use crate::modules::chat::domain::{Message, Persona, SessionId, SessionState, UnavailableReason};

/// 获取会话快照查询
#[derive(Debug, Clone, Default)]
pub struct GetSnapshotQuery;

/// 会话快照，供界面渲染
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub session_id: SessionId,
    pub state: SessionState,
    pub is_awaiting_response: bool,
    pub last_error: Option<String>,
    pub unavailable_reason: Option<UnavailableReason>,
    /// 会话不可用时常驻显示的横幅
    pub unavailable_banner: Option<String>,
    /// 按插入顺序
    pub messages: Vec<Message>,
}

impl ChatSnapshot {
    pub fn is_unavailable(&self) -> bool {
        self.state == SessionState::Unavailable
    }
}

/// 获取会话快照查询处理器
pub struct GetSnapshotHandler {
    slot: SharedSession,
    persona: Persona,
}

impl GetSnapshotHandler {
    pub fn new(slot: SharedSession, persona: Persona) -> Self {
        Self { slot, persona }
    }
}

#[async_trait]
impl QueryHandler<GetSnapshotQuery, ChatSnapshot> for GetSnapshotHandler {
    async fn handle(&self, _query: GetSnapshotQuery) -> Result<ChatSnapshot, ChatError> {
        let slot = self.slot.read().await;
        let session = &slot.session;

        // 凭据缺失和初始化失败显示同一条横幅
        let unavailable_banner = session
            .unavailable_reason()
            .map(|_| self.persona.unavailable_banner.clone());

        Ok(ChatSnapshot {
            session_id: session.id(),
            state: session.state(),
            is_awaiting_response: session.is_awaiting_response(),
            last_error: session.last_error().map(str::to_string),
            unavailable_reason: session.unavailable_reason().cloned(),
            unavailable_banner,
            messages: session.transcript().to_vec(),
        })
    }
}
