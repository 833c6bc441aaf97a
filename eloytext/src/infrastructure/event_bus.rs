use serde::Serialize;
use tokio::sync::broadcast;

use crate::modules::chat::ChatDomainEvent;
use crate::modules::contact::ContactEvent;
use crate::modules::page::PageEvent;

/// 应用事件
///
/// 渲染层订阅这些事件来刷新界面
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "source", content = "event", rename_all = "camelCase")]
pub enum AppEvent {
    Chat(ChatDomainEvent),
    Contact(ContactEvent),
    Page(PageEvent),
}

impl AppEvent {
    /// 前端事件名
    pub fn channel(&self) -> &'static str {
        match self {
            AppEvent::Chat(_) => "chat",
            AppEvent::Contact(_) => "contact",
            AppEvent::Page(_) => "page",
        }
    }
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// 发布事件；没有订阅者时静默丢弃
    pub fn publish(&self, event: AppEvent) {
        tracing::debug!("[EventBus] Publishing {} event: {:?}", event.channel(), event);
        let _ = self.sender.send(event);
    }

    pub fn publish_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = AppEvent>,
    {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
