use async_trait::async_trait;
use tracing::info;

use super::super::{ChatError, CommandHandler, SharedSession};

/// 停止生成命令
#[derive(Debug, Clone, Default)]
pub struct CancelGenerationCommand;

/// 停止生成命令处理器
///
/// 触发进行中发送的取消令牌；该发送随后按传输失败收尾
pub struct CancelGenerationHandler {
    slot: SharedSession,
}

impl CancelGenerationHandler {
    pub fn new(slot: SharedSession) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl CommandHandler<CancelGenerationCommand, bool> for CancelGenerationHandler {
    async fn handle(&self, _command: CancelGenerationCommand) -> Result<bool, ChatError> {
        let slot = self.slot.read().await;
        match slot.in_flight.as_ref() {
            Some(token) if !token.is_cancelled() => {
                info!(
                    "[CancelGenerationHandler] Cancelling in-flight send for session {}",
                    slot.session.id()
                );
                token.cancel();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
