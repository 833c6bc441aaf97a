// Contact Domain Events

use serde::Serialize;

use super::entities::{FieldErrors, FormField, SubmissionStatus};

/// 联系表单事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContactEvent {
    /// 提交状态变化
    StatusChanged { status: SubmissionStatus },
    /// 校验未通过
    ValidationFailed { errors: FieldErrors },
    /// 字段被修改
    FieldEdited { field: FormField },
}
