// Contact Domain Entities
//
// 联系表单实体定义

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 提交成功提示
pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been received.";

/// 提交失败提示
pub const FAILURE_MESSAGE: &str =
    "Sorry, there was an error sending your message. Please try again later.";

/// 表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
}

impl FormField {
    /// 所有字段，按表单顺序
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Email,
        FormField::Subject,
        FormField::Message,
    ];

    /// 提交时使用的字段名
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Subject => "subject",
            FormField::Message => "message",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, FormField::Subject)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 字段错误：字段 -> 提示文本
pub type FieldErrors = BTreeMap<FormField, String>;

/// 提交状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed { message: String },
}

impl SubmissionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }

    /// 需要显示的横幅文本
    pub fn banner(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Succeeded => Some(SUCCESS_MESSAGE),
            SubmissionStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// 表单提交 - 聚合根
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub errors: FieldErrors,
    pub status: SubmissionStatus,
    /// 每次成功提交递增，用于识别过期的自动隐藏计时
    #[serde(skip)]
    pub success_epoch: u64,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Subject => &self.subject,
            FormField::Message => &self.message,
        }
    }

    /// 修改字段值并清除该字段的错误
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Subject => &mut self.subject,
            FormField::Message => &mut self.message,
        };
        *slot = value.into();
        self.errors.remove(&field);
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// 清空所有字段和错误
    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.subject.clear();
        self.message.clear();
        self.errors.clear();
    }
}
