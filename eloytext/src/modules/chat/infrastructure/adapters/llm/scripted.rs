// Scripted Adapter - 离线模型
//
// 用于测试或未接入真实模型时按脚本回放回复

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::modules::chat::ports::{
    ChatSetup, ChatTransport, FragmentStream, GenerativeModelPort, LLMError, ProviderInfo,
};
use crate::modules::config::ApiKey;

/// 一次脚本化回复
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// 依次产出这些片段后正常结束
    Fragments(Vec<String>),
    /// 请求阶段即失败
    Reject(String),
    /// 产出部分片段后中断
    FailAfter {
        fragments: Vec<String>,
        error: String,
    },
}

impl ScriptedReply {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::Fragments(fragments.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
struct Script {
    replies: VecDeque<ScriptedReply>,
    received: Vec<String>,
}

/// 脚本化模型适配器
///
/// 队列为空时回显用户输入，按 5 个字符切分模拟流式输出
#[derive(Clone, Default)]
pub struct ScriptedModelAdapter {
    script: Arc<Mutex<Script>>,
    fail_on_create: bool,
}

impl ScriptedModelAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建会话时总是失败
    pub fn failing() -> Self {
        Self {
            fail_on_create: true,
            ..Self::default()
        }
    }

    /// 追加一条回复
    pub fn push_reply(&self, reply: ScriptedReply) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push_back(reply);
        }
        self
    }

    /// 已收到的用户文本
    pub fn received(&self) -> Vec<String> {
        self.script
            .lock()
            .map(|script| script.received.clone())
            .unwrap_or_default()
    }

    fn echo(text: &str) -> Vec<String> {
        let reply = format!(
            "Thanks for your message: \"{}\". This is an offline reply; set API_KEY to talk to the live assistant.",
            text
        );
        reply
            .chars()
            .collect::<Vec<_>>()
            .chunks(5)
            .map(|c| c.iter().collect::<String>())
            .collect()
    }
}

struct ScriptedChat {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl ChatTransport for ScriptedChat {
    async fn send_message_stream(&self, text: &str) -> Result<FragmentStream, LLMError> {
        let reply = {
            let mut script = self
                .script
                .lock()
                .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;
            script.received.push(text.to_string());
            script.replies.pop_front()
        };

        let items: Vec<Result<String, LLMError>> = match reply {
            None => ScriptedModelAdapter::echo(text).into_iter().map(Ok).collect(),
            Some(ScriptedReply::Fragments(fragments)) => fragments.into_iter().map(Ok).collect(),
            Some(ScriptedReply::Reject(message)) => return Err(LLMError::NetworkError(message)),
            Some(ScriptedReply::FailAfter { fragments, error }) => fragments
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(LLMError::NetworkError(error))))
                .collect(),
        };

        Ok(Box::pin(stream::iter(items)))
    }
}

impl GenerativeModelPort for ScriptedModelAdapter {
    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "scripted".to_string(),
            name: "Scripted Provider (Offline)".to_string(),
            model: "scripted-model".to_string(),
        }
    }

    fn create_chat(
        &self,
        _credential: &ApiKey,
        _setup: ChatSetup,
    ) -> Result<Arc<dyn ChatTransport>, LLMError> {
        if self.fail_on_create {
            return Err(LLMError::NetworkError(
                "scripted adapter refuses to create chats".to_string(),
            ));
        }
        Ok(Arc::new(ScriptedChat {
            script: self.script.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(stream: FragmentStream) -> Vec<Result<String, LLMError>> {
        stream.collect().await
    }

    fn chat(adapter: &ScriptedModelAdapter) -> Arc<dyn ChatTransport> {
        adapter
            .create_chat(&ApiKey::new("k").unwrap(), ChatSetup::new("m", "s"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_replays_queued_fragments_then_echoes() {
        let adapter = ScriptedModelAdapter::new();
        adapter.push_reply(ScriptedReply::fragments(["Legal", " Drafting"]));
        let chat = chat(&adapter);

        let first = collect(chat.send_message_stream("one").await.unwrap()).await;
        let texts: Vec<String> = first.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Legal", " Drafting"]);

        let echo: String = collect(chat.send_message_stream("two").await.unwrap())
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert!(echo.contains("\"two\""));
        assert_eq!(adapter.received(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_fail_after_yields_error_last() {
        let adapter = ScriptedModelAdapter::new();
        adapter.push_reply(ScriptedReply::FailAfter {
            fragments: vec!["partial".to_string()],
            error: "reset".to_string(),
        });
        let items = collect(chat(&adapter).send_message_stream("x").await.unwrap()).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(LLMError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_reject_fails_request() {
        let adapter = ScriptedModelAdapter::new();
        adapter.push_reply(ScriptedReply::Reject("offline".to_string()));
        assert!(chat(&adapter).send_message_stream("x").await.is_err());
    }

    #[test]
    fn test_failing_adapter_refuses_create() {
        let adapter = ScriptedModelAdapter::failing();
        assert!(adapter
            .create_chat(&ApiKey::new("k").unwrap(), ChatSetup::new("m", "s"))
            .is_err());
    }
}
