use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::infrastructure::{AppEvent, EventBus};
use crate::modules::page::domain::{PageEvent, PageVisibility, RevealSchedule, Section};

/// 区块显现控制器
///
/// 每个区块一个计时器，到期后标记为可见。控制器被丢弃（页面卸载）
/// 或调用 `stop` 时取消所有未到期的计时器。
pub struct VisibilityController {
    visibility: Arc<RwLock<PageVisibility>>,
    timers: Vec<JoinHandle<()>>,
}

impl VisibilityController {
    /// 按时间表启动计时器，必须在 tokio 运行时内调用
    pub fn start(schedule: &RevealSchedule, event_bus: Arc<EventBus>) -> Self {
        let visibility = Arc::new(RwLock::new(PageVisibility::new()));

        let timers = schedule
            .iter()
            .map(|(section, delay)| {
                let visibility = visibility.clone();
                let event_bus = event_bus.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if visibility.write().await.reveal(section) {
                        debug!("[VisibilityController] {} revealed", section);
                        event_bus.publish(AppEvent::Page(PageEvent::SectionRevealed { section }));
                    }
                })
            })
            .collect();

        Self { visibility, timers }
    }

    pub async fn is_visible(&self, section: Section) -> bool {
        self.visibility.read().await.is_visible(section)
    }

    pub async fn snapshot(&self) -> PageVisibility {
        self.visibility.read().await.clone()
    }

    /// 取消未到期的计时器
    pub fn stop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

impl Drop for VisibilityController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sections_reveal_on_schedule() {
        let controller =
            VisibilityController::start(&RevealSchedule::standard(), Arc::new(EventBus::new()));

        sleep_ms(99).await;
        assert!(!controller.is_visible(Section::Hero).await);

        sleep_ms(2).await;
        assert!(controller.is_visible(Section::Hero).await);
        assert!(!controller.is_visible(Section::ConceptualImage).await);

        sleep_ms(1200).await; // t = 1301
        let page = controller.snapshot().await;
        assert_eq!(
            page.visible_sections(),
            vec![
                Section::Hero,
                Section::ConceptualImage,
                Section::Empower,
                Section::Services
            ]
        );

        sleep_ms(1300).await; // t = 2601
        assert!(controller.snapshot().await.all_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_events_in_schedule_order() {
        let event_bus = Arc::new(EventBus::new());
        let mut rx = event_bus.subscribe();
        let _controller = VisibilityController::start(&RevealSchedule::standard(), event_bus);

        sleep_ms(3000).await;

        let mut revealed = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Page(PageEvent::SectionRevealed { section }) = event {
                revealed.push(section);
            }
        }
        assert_eq!(revealed, Section::ALL.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timers() {
        let event_bus = Arc::new(EventBus::new());
        let mut rx = event_bus.subscribe();
        let controller =
            VisibilityController::start(&RevealSchedule::standard(), event_bus.clone());

        sleep_ms(450).await;
        drop(controller);
        sleep_ms(3000).await;

        let mut revealed = Vec::new();
        while let Ok(AppEvent::Page(PageEvent::SectionRevealed { section })) = rx.try_recv() {
            revealed.push(section);
        }
        assert_eq!(revealed, vec![Section::Hero, Section::ConceptualImage]);
    }
}
