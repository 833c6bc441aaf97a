// Gemini Adapter - Google Generative Language API
//
// 实现 streamGenerateContent 的 SSE 流式适配器

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use url::Url;

use crate::modules::chat::ports::{
    ChatSetup, ChatTransport, FragmentStream, GenerativeModelPort, LLMError, ProviderInfo,
};
use crate::modules::config::ApiKey;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini API 请求
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

/// 一轮对话内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn new(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![GeminiPart {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// 流式响应中的一个事件
#[derive(Debug, Deserialize)]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiErrorBody {
    fn into_error(self) -> LLMError {
        let code = if self.status.is_empty() {
            self.code.to_string()
        } else {
            self.status
        };
        LLMError::ApiError {
            code,
            message: self.message,
        }
    }
}

/// 将非 2xx 响应映射为 LLMError
fn map_status_error(status: StatusCode, body: &str) -> LLMError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::AuthenticationError(message),
        StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitError,
        StatusCode::BAD_REQUEST => LLMError::InvalidRequest(message),
        _ => LLMError::ApiError {
            code: status.as_str().to_string(),
            message,
        },
    }
}

/// SSE 解码器
///
/// 按字节缓冲，只在完整的行上解码，避免多字节字符被网络分块切开
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// 写入一块数据，返回其中完整行解析出的片段
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, LLMError>> {
        self.buffer.extend_from_slice(bytes);
        let mut items = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(item) = Self::parse_line(&String::from_utf8_lossy(&line)) {
                items.push(item);
            }
        }
        items
    }

    /// 流结束时处理缓冲区中剩余的不完整行
    fn finish(&mut self) -> Option<Result<String, LLMError>> {
        let rest = std::mem::take(&mut self.buffer);
        Self::parse_line(&String::from_utf8_lossy(&rest))
    }

    /// 解析一行 SSE，非数据行和空片段返回 None
    fn parse_line(line: &str) -> Option<Result<String, LLMError>> {
        let data = line.trim().strip_prefix("data:")?.trim_start();
        if data.is_empty() {
            return None;
        }

        let response: GeminiStreamResponse = match serde_json::from_str(data) {
            Ok(response) => response,
            Err(e) => return Some(Err(LLMError::InvalidResponse(e.to_string()))),
        };

        if let Some(body) = response.error {
            return Some(Err(body.into_error()));
        }

        let text: String = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            None
        } else {
            Some(Ok(text))
        }
    }
}

type ByteStream = BoxStream<'static, Result<Vec<u8>, LLMError>>;

/// 流式读取状态
struct StreamState {
    bytes: ByteStream,
    decoder: SseDecoder,
    queued: VecDeque<Result<String, LLMError>>,
    reply: String,
    user_text: String,
    history: Arc<Mutex<Vec<GeminiContent>>>,
    done: bool,
}

impl StreamState {
    fn new(bytes: ByteStream, user_text: &str, history: Arc<Mutex<Vec<GeminiContent>>>) -> Self {
        Self {
            bytes,
            decoder: SseDecoder::default(),
            queued: VecDeque::new(),
            reply: String::new(),
            user_text: user_text.to_string(),
            history,
            done: false,
        }
    }

    fn into_fragments(self) -> FragmentStream {
        Box::pin(stream::unfold(self, Self::next_fragment))
    }

    async fn next_fragment(mut self) -> Option<(Result<String, LLMError>, Self)> {
        loop {
            if self.done {
                return None;
            }

            if let Some(item) = self.queued.pop_front() {
                match &item {
                    Ok(fragment) => self.reply.push_str(fragment),
                    Err(_) => self.done = true,
                }
                return Some((item, self));
            }

            match self.bytes.next().await {
                Some(Ok(bytes)) => {
                    self.queued.extend(self.decoder.push(&bytes));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some((Err(e), self));
                }
                None => {
                    if let Some(item) = self.decoder.finish() {
                        self.queued.push_back(item);
                        continue;
                    }
                    self.done = true;
                    self.commit_turn().await;
                    return None;
                }
            }
        }
    }

    /// 流正常结束后把本轮对话写入历史
    ///
    /// 没有任何文本的回复（如被安全策略拦截）连同提问一起丢弃，
    /// 空文本的 model 轮次会让之后的每次请求都被拒绝
    async fn commit_turn(&mut self) {
        if self.reply.is_empty() {
            debug!("[GeminiChat] Empty reply, turn not added to history");
            return;
        }
        let mut history = self.history.lock().await;
        history.push(GeminiContent::new("user", std::mem::take(&mut self.user_text)));
        history.push(GeminiContent::new("model", std::mem::take(&mut self.reply)));
        debug!("[GeminiChat] History now holds {} turns", history.len());
    }
}

/// Gemini 远程会话
///
/// 持有系统指令和多轮历史
pub struct GeminiChat {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
    system_instruction: String,
    history: Arc<Mutex<Vec<GeminiContent>>>,
}

impl GeminiChat {
    fn new(client: Client, endpoint: String, api_key: ApiKey, system_instruction: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            system_instruction,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 历史加上本轮提问
    async fn request_contents(&self, text: &str) -> Vec<GeminiContent> {
        let mut contents = self.history.lock().await.clone();
        contents.push(GeminiContent::new("user", text));
        contents
    }
}

#[async_trait]
impl ChatTransport for GeminiChat {
    async fn send_message_stream(&self, text: &str) -> Result<FragmentStream, LLMError> {
        let contents = self.request_contents(text).await;

        let request = GeminiRequest {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: &self.system_instruction,
                }],
            },
            contents,
        };

        debug!(
            "[GeminiChat] Sending streaming request ({} turns)",
            request.contents.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("[GeminiChat] API error: {} - {}", status, error_text);
            return Err(map_status_error(status, &error_text));
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|b| b.to_vec())
                    .map_err(|e| LLMError::NetworkError(e.to_string()))
            })
            .boxed();

        Ok(StreamState::new(bytes, text, self.history.clone()).into_fragments())
    }
}

/// Gemini 适配器
pub struct GeminiAdapter {
    client: Client,
    api_base_url: Url,
    default_model: String,
}

impl GeminiAdapter {
    pub fn new(api_base_url: Url, default_model: impl Into<String>) -> Result<Self, LLMError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api_base_url,
            default_model: default_model.into(),
        })
    }

    /// streamGenerateContent 地址（不含查询参数）
    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent",
            self.api_base_url.as_str().trim_end_matches('/'),
            model
        )
    }
}

impl GenerativeModelPort for GeminiAdapter {
    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "gemini".to_string(),
            name: "Google Gemini".to_string(),
            model: self.default_model.clone(),
        }
    }

    fn create_chat(
        &self,
        credential: &ApiKey,
        setup: ChatSetup,
    ) -> Result<Arc<dyn ChatTransport>, LLMError> {
        let model = if setup.model.trim().is_empty() {
            warn!("[GeminiAdapter] Empty model id, using {}", self.default_model);
            self.default_model.clone()
        } else {
            setup.model
        };

        Ok(Arc::new(GeminiChat::new(
            self.client.clone(),
            self.endpoint(&model),
            credential.clone(),
            setup.system_instruction,
        )))
    }
}
