// UI Layer - 视图模型
//
// 把各模块状态转换为可直接渲染的数据，不包含样式

pub mod chat_modal;
pub mod chat_widget;
pub mod contact_section;
pub mod page_view;
pub mod site;

pub use chat_modal::{ChatModal, KeyAction, KeyInput, MessageView};
pub use chat_widget::{ChatWidget, ChatWidgetView, LauncherView};
pub use contact_section::{ContactSection, ContactSectionView, FieldView};
pub use page_view::{PageView, SectionView};
pub use site::Site;
