use serde::{Deserialize, Serialize};

const SYSTEM_INSTRUCTION: &str = "You are EloyText's friendly and helpful AI assistant. Your purpose is to provide information about EloyText's services (Legal Drafting, Copywriting, Content Strategy), help users understand how EloyText can benefit their business, and guide them on how to get started or schedule a consultation. Keep responses concise and professional. If a question is outside your scope, politely state that and suggest contacting EloyText directly or scheduling a consultation. Do not use markdown formatting in your responses.";

/// 助手人设与界面文案
///
/// 领域服务：集中管理系统指令以及聊天窗口中出现的固定文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// 创建远程会话时下发的系统指令
    pub system_instruction: String,
    /// 会话就绪后的第一条助手消息
    pub greeting: String,
    /// 占位消息文本
    pub typing_text: String,
    /// 发送失败时追加到转录中的助手消息
    pub failure_text: String,
    /// 发送失败时的错误横幅
    pub error_banner: String,
    /// 初始化失败时记录的错误
    pub init_error_banner: String,
    /// 会话不可用时的常驻横幅
    pub unavailable_banner: String,
}

impl Persona {
    /// EloyText 站点助手
    pub fn eloytext() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            greeting: "Hello! I'm the EloyText AI assistant. How can I help you today regarding our legal-grade copywriting services?".to_string(),
            typing_text: "EloyText is typing...".to_string(),
            failure_text: "Sorry, I encountered an error. Please try again.".to_string(),
            error_banner: "Sorry, something went wrong. Please try again.".to_string(),
            init_error_banner: "Could not initialize chat service. Please try again later."
                .to_string(),
            unavailable_banner:
                "Live chat is temporarily unavailable. The API key is not configured.".to_string(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::eloytext()
    }
}
