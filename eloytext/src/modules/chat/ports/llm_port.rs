use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::modules::config::ApiKey;

/// LLM 错误类型
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: String, message: String },

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No fragment received within {0}s")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,
}

/// 片段流：惰性、有限、不可重启
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LLMError>> + Send>>;

/// 模型提供商信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub model: String,
}

/// 创建远程会话所需的参数
#[derive(Debug, Clone)]
pub struct ChatSetup {
    /// 模型 ID
    pub model: String,
    /// 固定的系统指令
    pub system_instruction: String,
}

impl ChatSetup {
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
        }
    }
}

/// 远程会话句柄
///
/// 句柄自己维护多轮上下文，每次调用只传入一条用户文本
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// 发送用户文本，返回回复片段流
    async fn send_message_stream(&self, text: &str) -> Result<FragmentStream, LLMError>;
}

/// 生成式模型服务端口 - 核心抽象接口
///
/// 所有模型提供商适配器都必须实现此 trait
pub trait GenerativeModelPort: Send + Sync {
    /// 获取提供商信息
    fn provider_info(&self) -> ProviderInfo;

    /// 创建一个配置了系统指令的远程会话
    fn create_chat(
        &self,
        credential: &ApiKey,
        setup: ChatSetup,
    ) -> Result<Arc<dyn ChatTransport>, LLMError>;
}
