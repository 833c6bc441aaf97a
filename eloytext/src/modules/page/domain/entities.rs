// Page Entities

use serde::Serialize;
use std::collections::BTreeSet;

use super::value_objects::Section;

/// 各区块的可见状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageVisibility {
    visible: BTreeSet<Section>,
}

impl PageVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记区块可见，返回是否为首次
    pub fn reveal(&mut self, section: Section) -> bool {
        self.visible.insert(section)
    }

    pub fn is_visible(&self, section: Section) -> bool {
        self.visible.contains(&section)
    }

    pub fn all_visible(&self) -> bool {
        Section::ALL.iter().all(|s| self.visible.contains(s))
    }

    /// 已显现的区块，按文档顺序
    pub fn visible_sections(&self) -> Vec<Section> {
        self.visible.iter().copied().collect()
    }
}

/// 聊天启动按钮
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLauncher {
    open: bool,
}

impl ChatLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换开关，返回新状态
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn aria_expanded(&self) -> bool {
        self.open
    }

    pub fn aria_label(&self) -> &'static str {
        if self.open {
            "Close live chat"
        } else {
            "Open live chat"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_toggle_and_labels() {
        let mut launcher = ChatLauncher::new();
        assert!(!launcher.aria_expanded());
        assert_eq!(launcher.aria_label(), "Open live chat");

        assert!(launcher.toggle());
        assert!(launcher.aria_expanded());
        assert_eq!(launcher.aria_label(), "Close live chat");

        assert!(!launcher.toggle());
        assert_eq!(launcher.aria_label(), "Open live chat");
    }

    #[test]
    fn test_visibility_keeps_document_order() {
        let mut page = PageVisibility::new();
        assert!(page.reveal(Section::Footer));
        assert!(page.reveal(Section::Hero));
        assert!(!page.reveal(Section::Hero));
        assert_eq!(page.visible_sections(), vec![Section::Hero, Section::Footer]);
        assert!(!page.all_visible());
    }
}
