// Contact Domain Services
//
// 表单校验与编码

use once_cell::sync::Lazy;
use regex::Regex;

use super::entities::{FieldErrors, FormField, FormSubmission};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid")
});

/// 表单校验器
pub struct FormValidator;

impl FormValidator {
    /// 校验表单，返回空集合表示通过
    pub fn validate(form: &FormSubmission) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if form.name.trim().is_empty() {
            errors.insert(FormField::Name, "Full name is required.".to_string());
        }

        if form.email.trim().is_empty() {
            errors.insert(FormField::Email, "Email address is required.".to_string());
        } else if !EMAIL_PATTERN.is_match(&form.email) {
            errors.insert(FormField::Email, "Email address is invalid.".to_string());
        }

        if form.message.trim().is_empty() {
            errors.insert(FormField::Message, "Message is required.".to_string());
        }

        errors
    }
}

/// 表单编码器（application/x-www-form-urlencoded）
pub struct FormEncoder;

impl FormEncoder {
    /// 编码键值对，保持给定顺序
    pub fn encode<'a, I>(pairs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 编码一次提交：表单名、空的蜜罐字段、各字段
    pub fn encode_submission(
        form: &FormSubmission,
        form_name: &str,
        honeypot_field: &str,
    ) -> String {
        let mut pairs = vec![("form-name", form_name), (honeypot_field, "")];
        pairs.extend(FormField::ALL.iter().map(|f| (f.as_str(), form.field(*f))));
        Self::encode(pairs)
    }
}
