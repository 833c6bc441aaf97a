// Config Domain Entities
//
// 站点配置实体定义

use std::time::Duration;
use url::Url;

use super::value_objects::ApiKey;

/// 默认模型
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
/// 默认模型 API 地址
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// 默认站点地址（本地开发服务器）
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
/// 表单名称，表单处理服务按此字段归类提交
pub const DEFAULT_FORM_NAME: &str = "contact";
/// 蜜罐字段名
pub const DEFAULT_HONEYPOT_FIELD: &str = "bot-field";
/// 提交成功横幅的显示时长
pub const SUCCESS_DISPLAY: Duration = Duration::from_millis(5000);

/// 站点配置
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    pub chat: ChatConfig,
    pub contact: ContactConfig,
}

/// 聊天配置
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// 模型凭据，缺失时聊天不可用
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub api_base_url: Url,
    /// 两个片段之间的最长等待时间，None 表示不限
    pub response_timeout: Option<Duration>,
}

impl ChatConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: default_url(DEFAULT_API_BASE_URL),
            response_timeout: None,
        }
    }
}

/// 联系表单配置
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub site_url: Url,
    pub form_name: String,
    pub honeypot_field: String,
    pub success_display: Duration,
}

impl ContactConfig {
    pub fn new(site_url: Url) -> Self {
        Self {
            site_url,
            form_name: DEFAULT_FORM_NAME.to_string(),
            honeypot_field: DEFAULT_HONEYPOT_FIELD.to_string(),
            success_display: SUCCESS_DISPLAY,
        }
    }

    /// 提交地址：站点根路径
    pub fn endpoint(&self) -> Url {
        let mut endpoint = self.site_url.clone();
        endpoint.set_path("/");
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        endpoint
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self::new(default_url(DEFAULT_SITE_URL))
    }
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in url constant must parse")
}
