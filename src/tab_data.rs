/// Data structures for StayLane
use serde::{Deserialize, Serialize};

use crate::domain::{display_group_title, display_tab_title};

/// Group id the host reports for a tab that belongs to no group.
pub const TAB_GROUP_ID_NONE: i32 = -1;

/// Window id the host reports when focus leaves every browser window.
pub const WINDOW_ID_NONE: i32 = -1;

/// Window id the host resolves to "the window the caller runs in".
pub const WINDOW_ID_CURRENT: i32 = -2;

/// A tab as the host reports it. Every field the host may omit is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTab {
    pub id: Option<i32>,
    pub index: Option<i32>,
    pub window_id: Option<i32>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub fav_icon_url: Option<String>,
    pub active: Option<bool>,
    pub group_id: Option<i32>,
}

/// Group metadata as the host reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGroup {
    pub id: i32,
    pub title: Option<String>,
    pub color: String,
}

/// A tab normalized for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: i32,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
    pub active: bool,
    pub group_id: Option<i32>,
    pub index: i32,
}

impl Tab {
    /// Normalize a host record. Returns `None` for tabs without an id
    /// (devtools windows and similar), which can never be switched to.
    pub fn from_raw(raw: RawTab) -> Option<Tab> {
        let id = raw.id?;
        let group_id = raw.group_id.filter(|&group| group != TAB_GROUP_ID_NONE);

        Some(Tab {
            id,
            title: display_tab_title(raw.title.as_deref()),
            url: raw.url.unwrap_or_default(),
            fav_icon_url: raw.fav_icon_url.filter(|icon| !icon.is_empty()),
            active: raw.active.unwrap_or(false),
            group_id,
            index: raw.index.unwrap_or(0),
        })
    }
}

/// The fixed palette the host uses for tab groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    /// Unknown names fall back to grey.
    pub fn from_name(name: &str) -> GroupColor {
        match name {
            "blue" => GroupColor::Blue,
            "red" => GroupColor::Red,
            "yellow" => GroupColor::Yellow,
            "green" => GroupColor::Green,
            "pink" => GroupColor::Pink,
            "purple" => GroupColor::Purple,
            "cyan" => GroupColor::Cyan,
            "orange" => GroupColor::Orange,
            _ => GroupColor::Grey,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }

    /// CSS color used for the group header accent
    pub fn hex(self) -> &'static str {
        match self {
            GroupColor::Grey => "#9aa0a6",
            GroupColor::Blue => "#4285f4",
            GroupColor::Red => "#ea4335",
            GroupColor::Yellow => "#fbbc04",
            GroupColor::Green => "#34a853",
            GroupColor::Pink => "#f538a0",
            GroupColor::Purple => "#a142f4",
            GroupColor::Cyan => "#14b5e0",
            GroupColor::Orange => "#ff9800",
        }
    }
}

/// A tab group with its member tabs in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct TabGroup {
    pub id: i32,
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
    pub tabs: Vec<Tab>,
}

impl TabGroup {
    pub fn from_raw(raw: RawGroup, collapsed: bool, tabs: Vec<Tab>) -> TabGroup {
        TabGroup {
            id: raw.id,
            title: display_group_title(raw.title.as_deref()),
            color: GroupColor::from_name(&raw.color),
            collapsed,
            tabs,
        }
    }

    /// Index of the earliest member, which is where the group is drawn.
    /// An empty group sorts as if it were at index 0.
    pub fn lead_index(&self) -> i32 {
        self.tabs.iter().map(|tab| tab.index).min().unwrap_or(0)
    }
}

/// Everything the panel draws for one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub groups: Vec<TabGroup>,
    pub ungrouped: Vec<Tab>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.ungrouped.is_empty()
    }

    pub fn tab_count(&self) -> usize {
        self.ungrouped.len() + self.groups.iter().map(|g| g.tabs.len()).sum::<usize>()
    }

    /// Every tab in window order, regardless of grouping.
    pub fn tabs_in_order(&self) -> Vec<Tab> {
        let mut tabs: Vec<Tab> = self
            .groups
            .iter()
            .flat_map(|group| group.tabs.iter().cloned())
            .chain(self.ungrouped.iter().cloned())
            .collect();
        tabs.sort_by_key(|tab| tab.index);
        tabs
    }

    pub fn group(&self, group_id: i32) -> Option<&TabGroup> {
        self.groups.iter().find(|group| group.id == group_id)
    }
}

/// One entry of the host's recently-closed list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClosedEntry {
    pub tab: Option<ClosedTab>,
    pub window: Option<serde_json::Value>,
}

/// The tab half of a closed entry; `session_id` is what restore takes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClosedTab {
    pub session_id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tab(id: i32, index: i32, group_id: i32) -> RawTab {
        RawTab {
            id: Some(id),
            index: Some(index),
            window_id: Some(1),
            title: Some(format!("Tab {}", id)),
            url: Some("https://example.com".to_string()),
            fav_icon_url: None,
            active: Some(false),
            group_id: Some(group_id),
        }
    }

    #[test]
    fn test_from_raw_strips_group_sentinel() {
        let tab = Tab::from_raw(raw_tab(1, 0, TAB_GROUP_ID_NONE)).unwrap();
        assert_eq!(tab.group_id, None);

        let tab = Tab::from_raw(raw_tab(2, 1, 7)).unwrap();
        assert_eq!(tab.group_id, Some(7));
    }

    #[test]
    fn test_from_raw_defaults() {
        let tab = Tab::from_raw(RawTab {
            id: Some(3),
            ..RawTab::default()
        })
        .unwrap();

        assert_eq!(tab.title, crate::domain::UNTITLED_TAB);
        assert_eq!(tab.url, "");
        assert_eq!(tab.index, 0);
        assert!(!tab.active);
        assert_eq!(tab.group_id, None);
    }

    #[test]
    fn test_from_raw_requires_id() {
        assert!(Tab::from_raw(RawTab::default()).is_none());
    }

    #[test]
    fn test_raw_tab_deserializes_host_shape() {
        let json = r#"{"id":12,"index":4,"windowId":2,"title":"Docs","url":"https://docs.rs/","favIconUrl":"https://docs.rs/favicon.ico","active":true,"groupId":-1,"pinned":false}"#;
        let raw: RawTab = serde_json::from_str(json).unwrap();

        assert_eq!(raw.id, Some(12));
        assert_eq!(raw.window_id, Some(2));
        assert_eq!(raw.fav_icon_url.as_deref(), Some("https://docs.rs/favicon.ico"));

        let tab = Tab::from_raw(raw).unwrap();
        assert!(tab.active);
        assert_eq!(tab.group_id, None);
    }

    #[test]
    fn test_group_color_palette() {
        assert_eq!(GroupColor::from_name("blue"), GroupColor::Blue);
        assert_eq!(GroupColor::from_name("blue").hex(), "#4285f4");
        assert_eq!(GroupColor::from_name("magenta"), GroupColor::Grey);
        assert_eq!(GroupColor::Orange.name(), "orange");
    }

    #[test]
    fn test_lead_index() {
        let tabs = vec![
            Tab::from_raw(raw_tab(1, 5, 9)).unwrap(),
            Tab::from_raw(raw_tab(2, 3, 9)).unwrap(),
        ];
        let raw = RawGroup {
            id: 9,
            title: Some("Work".to_string()),
            color: "blue".to_string(),
        };
        let group = TabGroup::from_raw(raw.clone(), true, tabs);
        assert_eq!(group.lead_index(), 3);

        let empty = TabGroup::from_raw(raw, true, Vec::new());
        assert_eq!(empty.lead_index(), 0);
    }

    #[test]
    fn test_closed_entry_window_has_no_tab() {
        let json = r#"{"lastModified":1700000000,"window":{"sessionId":"w1","tabs":[]}}"#;
        let entry: ClosedEntry = serde_json::from_str(json).unwrap();
        assert!(entry.tab.is_none());
        assert!(entry.window.is_some());
    }
}
