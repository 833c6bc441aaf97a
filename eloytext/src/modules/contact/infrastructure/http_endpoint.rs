use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::modules::contact::ports::{FormEndpointPort, SubmitError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 基于 reqwest 的表单端点
pub struct HttpFormEndpoint {
    client: Client,
}

impl HttpFormEndpoint {
    pub fn new() -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SubmitError::NetworkError(e.to_string()))?;
        Ok(Self { client })
    }

    /// 直连本机，不经过系统代理
    #[cfg(test)]
    fn direct() -> Self {
        Self {
            client: Client::builder().no_proxy().build().unwrap(),
        }
    }
}

#[async_trait]
impl FormEndpointPort for HttpFormEndpoint {
    async fn submit(&self, endpoint: &Url, body: String) -> Result<(), SubmitError> {
        debug!("[HttpFormEndpoint] POST {} ({} bytes)", endpoint, body.len());

        let response = self
            .client
            .post(endpoint.clone())
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::NetworkError(e.to_string()))?;

        // 静态托管的表单收集器可能返回重定向或错误页，这里只记录
        let status = response.status();
        if !status.is_success() {
            warn!("[HttpFormEndpoint] Endpoint answered with status {}", status);
        }

        Ok(())
    }
}
