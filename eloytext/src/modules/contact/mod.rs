// Contact Module - 联系表单模块
//
// 层次结构:
// - domain: 表单实体、校验与编码
// - ports: 表单接收端点抽象
// - infrastructure: HTTP 端点实现
// - application: 表单控制器

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{ContactError, ContactFormController};
pub use domain::{
    ContactEvent, FieldErrors, FormEncoder, FormField, FormSubmission, FormValidator,
    SubmissionStatus, FAILURE_MESSAGE, SUCCESS_MESSAGE,
};
pub use infrastructure::HttpFormEndpoint;
pub use ports::{FormEndpointPort, SubmitError};

use std::sync::Arc;

use crate::infrastructure::EventBus;
use crate::modules::config::ContactConfig;

/// Contact 模块容器
pub struct ContactModule {
    endpoint: Arc<dyn FormEndpointPort>,
    config: ContactConfig,
    event_bus: Arc<EventBus>,
}

impl ContactModule {
    /// 使用 HTTP 端点创建
    pub fn new(config: ContactConfig, event_bus: Arc<EventBus>) -> Result<Self, SubmitError> {
        let endpoint: Arc<dyn FormEndpointPort> = Arc::new(HttpFormEndpoint::new()?);
        Ok(Self::with_endpoint(endpoint, config, event_bus))
    }

    /// 使用自定义端点创建
    pub fn with_endpoint(
        endpoint: Arc<dyn FormEndpointPort>,
        config: ContactConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            endpoint,
            config,
            event_bus,
        }
    }

    /// 为联系表单区块创建控制器
    pub fn create_controller(&self) -> ContactFormController {
        ContactFormController::new(
            self.endpoint.clone(),
            self.config.clone(),
            self.event_bus.clone(),
        )
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }
}
