// Chat Application Layer - 应用层
// 实现 CQRS 模式的命令和查询处理器

pub mod commands;
pub mod queries;
mod session_manager;

// 导出命令和查询
pub use commands::*;
pub use queries::*;
pub use session_manager::ChatSessionManager;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::domain::{ChatDomainEvent, ChatSession};
use super::ports::{ChatTransport, LLMError};
use crate::infrastructure::{AppEvent, EventBus};

/// 聊天应用层错误类型
#[derive(Debug, Error)]
pub enum ChatError {
    /// 凭据缺失或无效，整个页面生命周期内有效
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 创建远程会话失败
    #[error("Chat initialization failed: {0}")]
    Initialization(String),

    /// 网络或流式传输失败，会话仍可继续使用
    #[error("Transport error: {0}")]
    Transport(#[from] LLMError),
}

impl ChatError {
    /// 是否为永久性错误
    pub fn is_permanent(&self) -> bool {
        matches!(self, ChatError::Configuration(_) | ChatError::Initialization(_))
    }
}

/// 命令处理器 trait
///
/// 遵循 CQRS 模式，命令处理器负责执行有副作用的操作
#[async_trait]
pub trait CommandHandler<C, R>: Send + Sync
where
    C: Send + Sync,
{
    /// 执行命令
    async fn handle(&self, command: C) -> Result<R, ChatError>;
}

/// 查询处理器 trait
///
/// 遵循 CQRS 模式，查询处理器负责只读操作
#[async_trait]
pub trait QueryHandler<Q, R>: Send + Sync
where
    Q: Send + Sync,
{
    /// 执行查询
    async fn handle(&self, query: Q) -> Result<R, ChatError>;
}

/// 会话槽位
///
/// 聚合根加上运行时资源：远程会话句柄和进行中发送的取消令牌
pub struct SessionSlot {
    pub session: ChatSession,
    pub transport: Option<Arc<dyn ChatTransport>>,
    pub in_flight: Option<CancellationToken>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self {
            session: ChatSession::new(),
            transport: None,
            in_flight: None,
        }
    }
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// 处理器之间共享的会话
pub type SharedSession = Arc<RwLock<SessionSlot>>;

/// 发布领域事件
pub(crate) fn publish_events(event_bus: &EventBus, events: Vec<ChatDomainEvent>) {
    for event in &events {
        tracing::trace!(
            "[ChatSession] {} event for session {}",
            event.event_type(),
            event.session_id()
        );
    }
    event_bus.publish_all(events.into_iter().map(AppEvent::Chat));
}
