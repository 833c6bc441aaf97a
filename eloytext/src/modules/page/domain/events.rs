// Page Events

use serde::Serialize;

use super::value_objects::Section;

/// 页面事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEvent {
    /// 区块到达显现时间
    SectionRevealed { section: Section },
    /// 聊天启动按钮切换
    LauncherToggled { open: bool },
}
