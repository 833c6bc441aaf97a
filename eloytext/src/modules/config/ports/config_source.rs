// Config Source Port
//
// 配置来源端口定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// 识别的配置键
pub mod keys {
    /// 模型凭据
    pub const API_KEY: &str = "API_KEY";
    pub const MODEL: &str = "ELOYTEXT_MODEL";
    pub const API_BASE_URL: &str = "ELOYTEXT_API_BASE_URL";
    pub const SITE_URL: &str = "ELOYTEXT_SITE_URL";
    pub const RESPONSE_TIMEOUT_SECS: &str = "ELOYTEXT_RESPONSE_TIMEOUT_SECS";
}

/// 配置来源 - 按键读取原始字符串值
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}
