// Config Module
//
// 站点配置模块
//
// 层次结构:
// - domain: 领域层，包含配置实体和值对象
// - ports: 端口层，定义配置来源的抽象接口
// - infrastructure: 基础设施层，实现环境变量和内存配置来源

pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型

// Domain
pub use domain::{ApiKey, ChatConfig, ContactConfig, SiteConfig};

// Ports
pub use ports::{keys, ConfigError, ConfigSource};

// Infrastructure
pub use infrastructure::{EnvConfigSource, InMemoryConfigSource};

use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Config 模块容器
///
/// 从配置来源组装并校验站点配置
pub struct ConfigModule {
    source: Arc<dyn ConfigSource>,
}

impl ConfigModule {
    /// 使用进程环境变量
    pub fn from_env() -> Self {
        Self::with_source(Arc::new(EnvConfigSource::new()))
    }

    /// 使用自定义来源创建
    pub fn with_source(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }

    /// 加载站点配置
    ///
    /// 凭据缺失不是错误：聊天会以不可用状态呈现
    pub fn load(&self) -> Result<SiteConfig, ConfigError> {
        let api_key = self.value(keys::API_KEY).and_then(ApiKey::new);
        if api_key.is_none() {
            tracing::warn!(
                "{} is missing. Chat functionality will be disabled.",
                keys::API_KEY
            );
        }

        let mut chat = ChatConfig {
            api_key,
            ..ChatConfig::default()
        };
        if let Some(model) = self.value(keys::MODEL) {
            chat.model = model;
        }
        if let Some(raw) = self.value(keys::API_BASE_URL) {
            chat.api_base_url = parse_url(keys::API_BASE_URL, &raw)?;
        }
        if let Some(raw) = self.value(keys::RESPONSE_TIMEOUT_SECS) {
            chat.response_timeout = Some(parse_timeout(&raw)?);
        }

        let contact = match self.value(keys::SITE_URL) {
            Some(raw) => ContactConfig::new(parse_url(keys::SITE_URL, &raw)?),
            None => ContactConfig::default(),
        };

        tracing::info!(
            "Configuration loaded: model={}, chat_enabled={}, form_endpoint={}",
            chat.model,
            chat.has_credential(),
            contact.endpoint()
        );

        Ok(SiteConfig { chat, contact })
    }

    /// 读取非空值
    fn value(&self, key: &str) -> Option<String> {
        self.source
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("unsupported scheme: {}", other),
        }),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        key: keys::RESPONSE_TIMEOUT_SECS.to_string(),
        message,
    };
    let secs: u64 = raw.parse().map_err(|_| invalid(format!("not a number: {}", raw)))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(Duration::from_secs(secs))
}
