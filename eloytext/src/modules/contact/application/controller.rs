use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::infrastructure::{AppEvent, EventBus};
use crate::modules::config::ContactConfig;
use crate::modules::contact::domain::{
    ContactEvent, FieldErrors, FormEncoder, FormField, FormSubmission, FormValidator,
    SubmissionStatus, FAILURE_MESSAGE,
};
use crate::modules::contact::ports::{FormEndpointPort, SubmitError};

/// 联系表单应用层错误类型
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Form has {} invalid field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("Submission failed: {0}")]
    Transport(#[from] SubmitError),
}

/// 联系表单控制器
///
/// 每次用户提交最多发出一个请求，不重试。成功提示在
/// `success_display` 之后自动隐藏。
pub struct ContactFormController {
    form: Arc<RwLock<FormSubmission>>,
    endpoint: Arc<dyn FormEndpointPort>,
    config: ContactConfig,
    event_bus: Arc<EventBus>,
    hide_task: Mutex<Option<JoinHandle<()>>>,
}

impl ContactFormController {
    pub fn new(
        endpoint: Arc<dyn FormEndpointPort>,
        config: ContactConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            form: Arc::new(RwLock::new(FormSubmission::new())),
            endpoint,
            config,
            event_bus,
            hide_task: Mutex::new(None),
        }
    }

    /// 当前表单快照
    pub async fn snapshot(&self) -> FormSubmission {
        self.form.read().await.clone()
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.form.read().await.status.clone()
    }

    /// 修改字段，同时清除该字段的待显示错误
    pub async fn update_field(&self, field: FormField, value: impl Into<String>) {
        self.form.write().await.set_field(field, value);
        self.publish(ContactEvent::FieldEdited { field });
    }

    /// 提交表单
    ///
    /// 校验失败时不发请求；提交中再次调用被拒绝
    pub async fn submit(&self) -> Result<(), ContactError> {
        let body = {
            let mut form = self.form.write().await;
            if form.status.is_submitting() {
                debug!("[ContactFormController] Submit ignored, already submitting");
                return Err(ContactError::AlreadySubmitting);
            }

            let errors = FormValidator::validate(&form);
            if !errors.is_empty() {
                debug!(
                    "[ContactFormController] Validation failed for {} field(s)",
                    errors.len()
                );
                form.errors = errors.clone();
                drop(form);
                self.publish(ContactEvent::ValidationFailed {
                    errors: errors.clone(),
                });
                return Err(ContactError::Validation(errors));
            }

            form.errors.clear();
            form.status = SubmissionStatus::Submitting;
            FormEncoder::encode_submission(
                &form,
                &self.config.form_name,
                &self.config.honeypot_field,
            )
        };
        self.publish_status(SubmissionStatus::Submitting);

        let endpoint = self.config.endpoint();
        info!("[ContactFormController] Submitting contact form to {}", endpoint);
        let result = self.endpoint.submit(&endpoint, body).await;

        let mut form = self.form.write().await;
        match result {
            Ok(()) => {
                form.clear();
                form.status = SubmissionStatus::Succeeded;
                form.success_epoch += 1;
                let epoch = form.success_epoch;
                drop(form);

                info!("[ContactFormController] Contact form submitted");
                self.publish_status(SubmissionStatus::Succeeded);
                self.schedule_hide(epoch);
                Ok(())
            }
            Err(e) => {
                error!("[ContactFormController] Form submission error: {}", e);
                let status = SubmissionStatus::Failed {
                    message: FAILURE_MESSAGE.to_string(),
                };
                form.status = status.clone();
                drop(form);

                self.publish_status(status);
                Err(ContactError::Transport(e))
            }
        }
    }

    /// 成功提示到期后回到 Idle，期间再次成功会使旧计时失效
    fn schedule_hide(&self, epoch: u64) {
        let form = self.form.clone();
        let event_bus = self.event_bus.clone();
        let delay = self.config.success_display;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut form = form.write().await;
            if form.success_epoch == epoch && form.status == SubmissionStatus::Succeeded {
                form.status = SubmissionStatus::Idle;
                drop(form);
                debug!("[ContactFormController] Success banner hidden");
                event_bus.publish(AppEvent::Contact(ContactEvent::StatusChanged {
                    status: SubmissionStatus::Idle,
                }));
            }
        });

        if let Ok(mut slot) = self.hide_task.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    fn publish_status(&self, status: SubmissionStatus) {
        self.publish(ContactEvent::StatusChanged { status });
    }

    fn publish(&self, event: ContactEvent) {
        self.event_bus.publish(AppEvent::Contact(event));
    }
}

impl Drop for ContactFormController {
    fn drop(&mut self) {
        if let Ok(slot) = self.hide_task.get_mut() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
