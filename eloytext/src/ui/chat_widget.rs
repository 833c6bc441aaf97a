// Chat Widget
//
// 启动按钮 + 聊天窗口。拥有页面生命周期内唯一的聊天会话，
// 组件被丢弃时会话随之销毁。

use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::chat_modal::{ChatModal, KeyAction, KeyInput};
use crate::infrastructure::{AppEvent, EventBus};
use crate::modules::chat::{ChatError, ChatSessionManager, SendOutcome, SessionState};
use crate::modules::page::{ChatLauncher, PageEvent};

/// 启动按钮渲染数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherView {
    pub aria_label: &'static str,
    pub aria_expanded: bool,
}

impl From<&ChatLauncher> for LauncherView {
    fn from(launcher: &ChatLauncher) -> Self {
        Self {
            aria_label: launcher.aria_label(),
            aria_expanded: launcher.aria_expanded(),
        }
    }
}

/// 聊天组件渲染数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatWidgetView {
    pub launcher: LauncherView,
    /// 窗口关闭时为 None
    pub modal: Option<ChatModal>,
}

/// 聊天组件
pub struct ChatWidget {
    manager: Arc<ChatSessionManager>,
    launcher: ChatLauncher,
    draft: String,
    event_bus: Arc<EventBus>,
}

impl ChatWidget {
    pub fn new(manager: ChatSessionManager, event_bus: Arc<EventBus>) -> Self {
        Self {
            manager: Arc::new(manager),
            launcher: ChatLauncher::new(),
            draft: String::new(),
            event_bus,
        }
    }

    pub fn manager(&self) -> &Arc<ChatSessionManager> {
        &self.manager
    }

    pub fn is_open(&self) -> bool {
        self.launcher.is_open()
    }

    pub fn launcher(&self) -> &ChatLauncher {
        &self.launcher
    }

    /// 点击启动按钮
    pub async fn toggle(&mut self) {
        if self.launcher.is_open() {
            self.close().await;
        } else {
            self.open().await;
        }
    }

    /// 打开窗口，首次打开时创建会话
    ///
    /// 会话不可用时窗口照常打开并显示横幅
    pub async fn open(&mut self) -> SessionState {
        if !self.launcher.is_open() {
            self.launcher.set_open(true);
            self.publish_toggle();
        }
        match self.manager.open_session().await {
            Ok(state) => state,
            Err(e) => {
                log_open_error(&e);
                self.manager.state().await
            }
        }
    }

    /// 关闭窗口，会话和进行中的发送不受影响
    pub async fn close(&mut self) {
        if self.launcher.is_open() {
            self.launcher.set_open(false);
            self.publish_toggle();
            self.manager.close_session().await;
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// 输入框按键
    pub async fn handle_key(&mut self, key: KeyInput) -> Option<JoinHandle<SendOutcome>> {
        match key.action() {
            KeyAction::Send => self.submit().await,
            KeyAction::Passthrough => None,
        }
    }

    /// 提交草稿
    ///
    /// 草稿为空、发送进行中或会话不可发送时不做任何事；
    /// 否则清空草稿并在后台发送
    pub async fn submit(&mut self) -> Option<JoinHandle<SendOutcome>> {
        if self.draft.trim().is_empty() {
            return None;
        }
        let state = self.manager.state().await;
        if !state.can_send() {
            debug!("[ChatWidget] Submit ignored in state {}", state);
            return None;
        }
        let text = std::mem::take(&mut self.draft);
        Some(self.manager.spawn_send(text))
    }

    /// 停止当前生成
    pub async fn stop(&self) -> bool {
        self.manager.cancel_in_flight().await
    }

    pub async fn view(&self) -> Result<ChatWidgetView, ChatError> {
        let modal = if self.launcher.is_open() {
            let snapshot = self.manager.snapshot().await?;
            Some(ChatModal::render(&snapshot, &self.draft))
        } else {
            None
        };
        Ok(ChatWidgetView {
            launcher: LauncherView::from(&self.launcher),
            modal,
        })
    }

    fn publish_toggle(&self) {
        self.event_bus.publish(AppEvent::Page(PageEvent::LauncherToggled {
            open: self.launcher.is_open(),
        }));
    }
}

fn log_open_error(error: &ChatError) {
    if error.is_permanent() {
        warn!("[ChatWidget] Chat unavailable: {}", error);
    } else {
        warn!("[ChatWidget] Failed to open chat: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::{ChatModule, ScriptedModelAdapter, ScriptedReply};
    use crate::modules::config::{ApiKey, ChatConfig};

    fn widget_with(adapter: ScriptedModelAdapter, key: Option<&str>) -> ChatWidget {
        let event_bus = Arc::new(EventBus::new());
        let config = ChatConfig {
            api_key: key.and_then(ApiKey::new),
            ..ChatConfig::default()
        };
        let module = ChatModule::with_model(Arc::new(adapter), config, event_bus.clone());
        ChatWidget::new(module.create_session_manager(), event_bus)
    }

    #[tokio::test]
    async fn test_closed_widget_has_no_modal() {
        let widget = widget_with(ScriptedModelAdapter::new(), Some("key"));
        let view = widget.view().await.unwrap();
        assert!(view.modal.is_none());
        assert_eq!(view.launcher.aria_label, "Open live chat");
        assert!(!view.launcher.aria_expanded);
    }

    #[tokio::test]
    async fn test_toggle_opens_session_lazily() {
        let mut widget = widget_with(ScriptedModelAdapter::new(), Some("key"));
        assert_eq!(widget.manager().state().await, SessionState::Uninitialized);

        widget.toggle().await;
        assert!(widget.is_open());
        assert_eq!(widget.manager().state().await, SessionState::Ready);

        let view = widget.view().await.unwrap();
        assert_eq!(view.launcher.aria_label, "Close live chat");
        assert_eq!(view.modal.unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_clears_draft_and_streams() {
        let adapter = ScriptedModelAdapter::new();
        adapter.push_reply(ScriptedReply::fragments(["Legal", " Drafting"]));
        let mut widget = widget_with(adapter, Some("key"));
        widget.open().await;

        widget.set_draft("What do you do?");
        let handle = widget.handle_key(KeyInput::Enter { shift: false }).await;
        assert_eq!(widget.draft(), "");
        assert!(handle.unwrap().await.unwrap().is_completed());

        let modal = widget.view().await.unwrap().modal.unwrap();
        assert_eq!(modal.messages.last().unwrap().text, "Legal Drafting");
    }

    #[tokio::test]
    async fn test_shift_enter_and_blank_draft_do_not_send() {
        let adapter = ScriptedModelAdapter::new();
        let mut widget = widget_with(adapter.clone(), Some("key"));
        widget.open().await;

        widget.set_draft("line one");
        assert!(widget
            .handle_key(KeyInput::Enter { shift: true })
            .await
            .is_none());
        assert_eq!(widget.draft(), "line one");

        widget.set_draft("   ");
        assert!(widget.submit().await.is_none());
        assert!(adapter.received().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_opens_with_banner() {
        let mut widget = widget_with(ScriptedModelAdapter::new(), None);
        assert_eq!(widget.open().await, SessionState::Unavailable);

        widget.set_draft("Hello");
        assert!(widget.submit().await.is_none());
        assert_eq!(widget.draft(), "Hello");

        let modal = widget.view().await.unwrap().modal.unwrap();
        assert!(modal.unavailable_banner.is_some());
        assert!(modal.messages.is_empty());
    }

    #[tokio::test]
    async fn test_reopen_shows_previous_messages() {
        let adapter = ScriptedModelAdapter::new();
        adapter.push_reply(ScriptedReply::fragments(["Hi!"]));
        let mut widget = widget_with(adapter, Some("key"));

        widget.toggle().await;
        widget.set_draft("Hello");
        widget.submit().await.unwrap().await.unwrap();
        widget.toggle().await;
        assert!(widget.view().await.unwrap().modal.is_none());

        widget.toggle().await;
        let texts: Vec<String> = widget
            .view()
            .await
            .unwrap()
            .modal
            .unwrap()
            .messages
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1], "Hello");
        assert_eq!(texts[2], "Hi!");
    }
}
