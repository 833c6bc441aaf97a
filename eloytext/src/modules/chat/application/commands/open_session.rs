use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::super::{publish_events, ChatError, CommandHandler, SharedSession};
use crate::infrastructure::EventBus;
use crate::modules::chat::domain::{ChatSession, Persona, SessionState, UnavailableReason};
use crate::modules::chat::ports::{ChatSetup, GenerativeModelPort};
use crate::modules::config::ChatConfig;

/// 打开会话命令（幂等）
#[derive(Debug, Clone, Default)]
pub struct OpenSessionCommand;

/// 打开会话响应
#[derive(Debug, Clone)]
pub struct OpenSessionResponse {
    pub state: SessionState,
    /// 本次调用是否创建了远程会话
    pub created: bool,
}

/// 打开会话命令处理器
///
/// 首次打开时创建远程会话并写入问候语；之后的调用只返回当前状态
pub struct OpenSessionHandler {
    slot: SharedSession,
    model: Arc<dyn GenerativeModelPort>,
    config: ChatConfig,
    persona: Persona,
    event_bus: Arc<EventBus>,
}

impl OpenSessionHandler {
    pub fn new(
        slot: SharedSession,
        model: Arc<dyn GenerativeModelPort>,
        config: ChatConfig,
        persona: Persona,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            slot,
            model,
            config,
            persona,
            event_bus,
        }
    }

    fn unavailable_error(&self, session: &ChatSession) -> ChatError {
        match session.unavailable_reason() {
            Some(UnavailableReason::InitializationFailed(message)) => {
                ChatError::Initialization(message.clone())
            }
            _ => ChatError::Configuration(self.persona.unavailable_banner.clone()),
        }
    }
}

#[async_trait]
impl CommandHandler<OpenSessionCommand, OpenSessionResponse> for OpenSessionHandler {
    async fn handle(&self, _command: OpenSessionCommand) -> Result<OpenSessionResponse, ChatError> {
        let mut slot = self.slot.write().await;

        match slot.session.state() {
            SessionState::Uninitialized => {}
            SessionState::Unavailable => return Err(self.unavailable_error(&slot.session)),
            state => {
                return Ok(OpenSessionResponse {
                    state,
                    created: false,
                })
            }
        }

        let session_id = slot.session.id();

        let Some(api_key) = self.config.api_key.as_ref() else {
            warn!(
                "[OpenSessionHandler] API key is missing, chat disabled for session {}",
                session_id
            );
            let events = slot
                .session
                .mark_unavailable(UnavailableReason::MissingCredential, None);
            publish_events(&self.event_bus, events);
            return Err(ChatError::Configuration(
                self.persona.unavailable_banner.clone(),
            ));
        };

        let setup = ChatSetup::new(&self.config.model, &self.persona.system_instruction);
        match self.model.create_chat(api_key, setup) {
            Ok(transport) => {
                info!(
                    "[OpenSessionHandler] Chat session {} created with model {}",
                    session_id, self.config.model
                );
                slot.transport = Some(transport);
                let events = slot.session.activate(Some(&self.persona.greeting));
                publish_events(&self.event_bus, events);
                Ok(OpenSessionResponse {
                    state: slot.session.state(),
                    created: true,
                })
            }
            Err(e) => {
                error!("[OpenSessionHandler] Failed to initialize chat: {}", e);
                let events = slot.session.mark_unavailable(
                    UnavailableReason::InitializationFailed(e.to_string()),
                    Some(self.persona.init_error_banner.clone()),
                );
                publish_events(&self.event_bus, events);
                Err(ChatError::Initialization(e.to_string()))
            }
        }
    }
}
