use futures::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{FragmentStream, LLMError};

/// 片段订阅
///
/// 对片段流的显式封装：`next()` 返回下一个片段、结束或错误，
/// 并带有取消令牌。订阅与界面可见性无关，关闭窗口不会取消它。
/// 一旦结束（正常、出错或取消），之后的 `next()` 一律返回 `None`。
pub struct FragmentSubscription {
    stream: FragmentStream,
    cancel: CancellationToken,
    fragment_timeout: Option<Duration>,
    received: usize,
    finished: bool,
}

impl FragmentSubscription {
    pub fn new(stream: FragmentStream, cancel: CancellationToken) -> Self {
        Self {
            stream,
            cancel,
            fragment_timeout: None,
            received: 0,
            finished: false,
        }
    }

    /// 设置两个片段之间的最长等待时间
    pub fn with_fragment_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fragment_timeout = timeout;
        self
    }

    /// 已收到的片段数量
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 等待下一个片段
    pub async fn next(&mut self) -> Option<Result<String, LLMError>> {
        if self.finished {
            return None;
        }

        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Some(Err(LLMError::Cancelled)),
            item = Self::next_item(&mut self.stream, self.fragment_timeout) => item,
        };

        match item {
            Some(Ok(fragment)) => {
                self.received += 1;
                Some(Ok(fragment))
            }
            Some(Err(e)) => {
                debug!(
                    "[FragmentSubscription] Ended with error after {} fragments: {}",
                    self.received, e
                );
                self.finished = true;
                Some(Err(e))
            }
            None => {
                debug!("[FragmentSubscription] Ended after {} fragments", self.received);
                self.finished = true;
                None
            }
        }
    }

    async fn next_item(
        stream: &mut FragmentStream,
        timeout: Option<Duration>,
    ) -> Option<Result<String, LLMError>> {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                Ok(item) => item,
                Err(_) => Some(Err(LLMError::Timeout(limit.as_secs()))),
            },
            None => stream.next().await,
        }
    }
}
