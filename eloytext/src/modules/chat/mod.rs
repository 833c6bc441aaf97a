// Chat Module - 聊天模块
//
// 实现六边形架构（Hexagonal Architecture）：
// - domain: 领域层，包含实体、值对象、领域服务和领域事件
// - ports: 端口层，定义与外部世界的抽象接口
// - infrastructure: 基础设施层，实现端口的具体适配器
// - application: 应用层，实现 CQRS 命令和查询处理器

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型
pub use application::{
    // Traits
    ChatError,
    ChatSessionManager,
    CommandHandler,
    QueryHandler,
    // Commands
    CancelGenerationCommand,
    CancelGenerationHandler,
    OpenSessionCommand,
    OpenSessionHandler,
    OpenSessionResponse,
    SendMessageCommand,
    SendMessageHandler,
    SendOutcome,
    // Queries
    ChatSnapshot,
    GetSnapshotHandler,
    GetSnapshotQuery,
};

pub use domain::{
    ChatDomainEvent, ChatSession, Message, MessageId, MessageKind, MessageRole, Persona,
    SendRejection, SessionId, SessionState, Transcript, UnavailableReason,
};

pub use infrastructure::{GeminiAdapter, GeminiChat, ScriptedModelAdapter, ScriptedReply};

pub use ports::{
    ChatSetup, ChatTransport, FragmentStream, FragmentSubscription, GenerativeModelPort,
    LLMError, ProviderInfo,
};

use std::sync::Arc;

use crate::infrastructure::EventBus;
use crate::modules::config::ChatConfig;

/// Chat 模块容器
///
/// 管理模块内的依赖注入
pub struct ChatModule {
    model: Arc<dyn GenerativeModelPort>,
    config: ChatConfig,
    persona: Persona,
    event_bus: Arc<EventBus>,
}

impl ChatModule {
    /// 使用 Gemini 适配器创建（生产环境）
    ///
    /// # Errors
    /// HTTP 客户端无法初始化时返回错误
    pub fn new(config: ChatConfig, event_bus: Arc<EventBus>) -> Result<Self, LLMError> {
        let model: Arc<dyn GenerativeModelPort> = Arc::new(GeminiAdapter::new(
            config.api_base_url.clone(),
            config.model.clone(),
        )?);
        Ok(Self::with_model(model, config, event_bus))
    }

    /// 使用自定义模型适配器创建
    pub fn with_model(
        model: Arc<dyn GenerativeModelPort>,
        config: ChatConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            model,
            config,
            persona: Persona::eloytext(),
            event_bus,
        }
    }

    /// 替换助手人设
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// 为拥有者组件创建一个新的会话管理器
    pub fn create_session_manager(&self) -> ChatSessionManager {
        ChatSessionManager::new(
            self.model.clone(),
            self.config.clone(),
            self.persona.clone(),
            self.event_bus.clone(),
        )
    }

    // Accessors

    pub fn provider_info(&self) -> ProviderInfo {
        self.model.provider_info()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }
}
