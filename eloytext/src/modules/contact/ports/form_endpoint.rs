use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 表单提交错误类型
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// 表单接收端点
///
/// 只关心传输成败：收到任何 HTTP 响应都算送达，不解析响应内容
#[async_trait]
pub trait FormEndpointPort: Send + Sync {
    /// 以 form-urlencoded 方式提交一次
    async fn submit(&self, endpoint: &Url, body: String) -> Result<(), SubmitError>;
}
