// Page View Model

use serde::Serialize;

use super::chat_widget::LauncherView;
use crate::modules::page::{ChatLauncher, PageVisibility, Section};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub section: Section,
    pub title: &'static str,
    pub visible: bool,
}

/// 整个页面的渲染数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// 按文档顺序
    pub sections: Vec<SectionView>,
    pub launcher: LauncherView,
}

impl PageView {
    pub fn render(visibility: &PageVisibility, launcher: &ChatLauncher) -> Self {
        Self {
            sections: Section::ALL
                .iter()
                .map(|s| SectionView {
                    section: *s,
                    title: s.title(),
                    visible: visibility.is_visible(*s),
                })
                .collect(),
            launcher: LauncherView::from(launcher),
        }
    }

    pub fn visible_titles(&self) -> Vec<&'static str> {
        self.sections
            .iter()
            .filter(|s| s.visible)
            .map(|s| s.title)
            .collect()
    }
}
