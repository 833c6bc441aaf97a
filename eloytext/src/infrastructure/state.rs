use std::sync::Arc;
use tracing::info;

use super::EventBus;
use crate::modules::chat::{ChatModule, GenerativeModelPort};
use crate::modules::config::SiteConfig;
use crate::modules::contact::{ContactModule, FormEndpointPort};
use crate::modules::page::PageModule;
use crate::shared::AppResult;

/// 应用全局状态
///
/// 组合根：持有配置、事件总线和各业务模块
pub struct AppState {
    pub config: SiteConfig,
    pub event_bus: Arc<EventBus>,
    pub chat: ChatModule,
    pub contact: ContactModule,
    pub page: PageModule,
}

impl AppState {
    /// 使用真实的 HTTP 适配器创建
    pub fn from_config(config: SiteConfig) -> AppResult<Self> {
        let event_bus = Arc::new(EventBus::new());
        let chat = ChatModule::new(config.chat.clone(), event_bus.clone())?;
        let contact = ContactModule::new(config.contact.clone(), event_bus.clone())?;
        let page = PageModule::new(event_bus.clone());

        info!(
            "[AppState] Initialized with provider {}",
            chat.provider_info().name
        );

        Ok(Self {
            config,
            event_bus,
            chat,
            contact,
            page,
        })
    }

    /// 使用自定义端口创建
    pub fn with_ports(
        config: SiteConfig,
        model: Arc<dyn GenerativeModelPort>,
        endpoint: Arc<dyn FormEndpointPort>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let chat = ChatModule::with_model(model, config.chat.clone(), event_bus.clone());
        let contact =
            ContactModule::with_endpoint(endpoint, config.contact.clone(), event_bus.clone());
        let page = PageModule::new(event_bus.clone());

        Self {
            config,
            event_bus,
            chat,
            contact,
            page,
        }
    }
}
