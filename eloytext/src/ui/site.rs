// Site - 挂载后的整个页面

use crate::infrastructure::AppState;
use crate::modules::page::VisibilityController;

use super::chat_widget::ChatWidget;
use super::contact_section::ContactSection;
use super::page_view::PageView;

/// 挂载后的页面
///
/// 拥有显现计时器、聊天组件和联系表单。丢弃即卸载：
/// 未到期的计时器被取消，聊天会话随之销毁。
pub struct Site {
    pub visibility: VisibilityController,
    pub chat: ChatWidget,
    pub contact: ContactSection,
}

impl Site {
    /// 挂载页面，必须在 tokio 运行时内调用
    pub fn mount(state: &AppState) -> Self {
        Self {
            visibility: state.page.mount(),
            chat: ChatWidget::new(
                state.chat.create_session_manager(),
                state.event_bus.clone(),
            ),
            contact: ContactSection::new(state.contact.create_controller()),
        }
    }

    pub async fn page_view(&self) -> PageView {
        PageView::render(&self.visibility.snapshot().await, self.chat.launcher())
    }
}
