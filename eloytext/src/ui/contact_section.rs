// Contact Section View Model

use serde::Serialize;
use std::sync::Arc;

use crate::modules::contact::{
    ContactError, ContactFormController, FormField, FormSubmission, SubmissionStatus,
    SUCCESS_MESSAGE,
};

pub const HEADING: &str = "Get In Touch";

/// 单个字段的渲染数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub field: FormField,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    pub value: String,
    pub error: Option<String>,
}

fn label(field: FormField) -> &'static str {
    match field {
        FormField::Name => "Full Name",
        FormField::Email => "Email Address",
        FormField::Subject => "Subject",
        FormField::Message => "Your Message",
    }
}

fn placeholder(field: FormField) -> &'static str {
    match field {
        FormField::Name => "e.g. Jane Doe",
        FormField::Email => "you@example.com",
        FormField::Subject => "Regarding your services...",
        FormField::Message => "Tell us more about your needs...",
    }
}

/// 联系表单区块渲染数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSectionView {
    pub heading: &'static str,
    pub success_banner: Option<&'static str>,
    pub error_banner: Option<String>,
    pub fields: Vec<FieldView>,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
}

impl ContactSectionView {
    pub fn render(form: &FormSubmission) -> Self {
        let submitting = form.status.is_submitting();
        Self {
            heading: HEADING,
            success_banner: match form.status {
                SubmissionStatus::Succeeded => Some(SUCCESS_MESSAGE),
                _ => None,
            },
            error_banner: match &form.status {
                SubmissionStatus::Failed { message } => Some(message.clone()),
                _ => None,
            },
            fields: FormField::ALL
                .iter()
                .map(|f| FieldView {
                    field: *f,
                    label: label(*f),
                    placeholder: placeholder(*f),
                    required: f.is_required(),
                    value: form.field(*f).to_string(),
                    error: form.error(*f).map(str::to_string),
                })
                .collect(),
            submit_label: if submitting { "Sending..." } else { "Send Message" },
            submit_disabled: submitting,
        }
    }
}

/// 联系表单区块
pub struct ContactSection {
    controller: Arc<ContactFormController>,
}

impl ContactSection {
    pub fn new(controller: ContactFormController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }

    pub fn controller(&self) -> &Arc<ContactFormController> {
        &self.controller
    }

    pub async fn edit(&self, field: FormField, value: impl Into<String>) {
        self.controller.update_field(field, value).await;
    }

    pub async fn submit(&self) -> Result<(), ContactError> {
        self.controller.submit().await
    }

    pub async fn view(&self) -> ContactSectionView {
        ContactSectionView::render(&self.controller.snapshot().await)
    }
}
