// Config Value Objects
//
// 配置相关的值对象定义

use std::fmt;

/// 模型 API 凭据
///
/// 去除首尾空白后为空视为未配置。Debug 输出不包含明文。
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// 从原始值创建，空白值返回 None
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// 获取明文（仅用于请求头）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_absent() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
    }

    #[test]
    fn test_key_is_trimmed() {
        let key = ApiKey::new("  abc123 \n").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("secret-value").unwrap();
        assert!(!format!("{:?}", key).contains("secret"));
    }
}
