// Page Module - 页面模块
//
// 区块分批显现和聊天启动按钮

pub mod application;
pub mod domain;

pub use application::VisibilityController;
pub use domain::{ChatLauncher, PageEvent, PageVisibility, RevealSchedule, Section};

use std::sync::Arc;

use crate::infrastructure::EventBus;

/// Page 模块容器
pub struct PageModule {
    schedule: RevealSchedule,
    event_bus: Arc<EventBus>,
}

impl PageModule {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_schedule(RevealSchedule::standard(), event_bus)
    }

    pub fn with_schedule(schedule: RevealSchedule, event_bus: Arc<EventBus>) -> Self {
        Self {
            schedule,
            event_bus,
        }
    }

    /// 页面挂载：启动显现计时器
    pub fn mount(&self) -> VisibilityController {
        VisibilityController::start(&self.schedule, self.event_bus.clone())
    }

    pub fn schedule(&self) -> &RevealSchedule {
        &self.schedule
    }
}
