// Page Value Objects
//
// 页面区块与显现时间表

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 页面区块，按文档顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Hero,
    ConceptualImage,
    Empower,
    Services,
    CallToAction,
    About,
    ContactForm,
    Footer,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Hero,
        Section::ConceptualImage,
        Section::Empower,
        Section::Services,
        Section::CallToAction,
        Section::About,
        Section::ContactForm,
        Section::Footer,
    ];

    /// 页面加载后到显现的延迟
    pub fn reveal_delay(&self) -> Duration {
        let ms = match self {
            Section::Hero => 100,
            Section::ConceptualImage => 400,
            Section::Empower => 800,
            Section::Services => 1200,
            Section::CallToAction => 1600,
            Section::About => 2000,
            Section::ContactForm => 2200,
            Section::Footer => 2600,
        };
        Duration::from_millis(ms)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Hero => "Hero",
            Section::ConceptualImage => "Conceptual Image",
            Section::Empower => "Empower",
            Section::Services => "Services",
            Section::CallToAction => "Call to Action",
            Section::About => "About",
            Section::ContactForm => "Get In Touch",
            Section::Footer => "Footer",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// 显现时间表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSchedule {
    entries: Vec<(Section, Duration)>,
}

impl RevealSchedule {
    /// 站点的固定时间表
    pub fn standard() -> Self {
        Self {
            entries: Section::ALL
                .iter()
                .map(|s| (*s, s.reveal_delay()))
                .collect(),
        }
    }

    /// 所有区块同时显现
    pub fn immediate() -> Self {
        Self {
            entries: Section::ALL.iter().map(|s| (*s, Duration::ZERO)).collect(),
        }
    }

    pub fn delay_for(&self, section: Section) -> Option<Duration> {
        self.entries
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, d)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, Duration)> + '_ {
        self.entries.iter().copied()
    }

    /// 最后一个区块显现的时间
    pub fn total(&self) -> Duration {
        self.entries
            .iter()
            .map(|(_, d)| *d)
            .max()
            .unwrap_or_default()
    }
}

impl Default for RevealSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
