/// Data structures for Tab Sorter
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of a live browser tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

/// Opaque handle of a live browser window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One eligible tab captured at snapshot time.
///
/// Records are never edited after collection; a tab changing windows is
/// expressed as a move against the host, and the next snapshot picks it up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub window_id: WindowId,
    pub domain_key: String,
    /// Milliseconds since the epoch
    pub open_time: f64,
}

impl TabRecord {
    pub fn new(id: TabId, title: String, url: String, window_id: WindowId, open_time: f64) -> TabRecord {
        let domain_key = crate::domain::extract_domain_key(&url);
        TabRecord {
            id,
            title,
            url,
            window_id,
            domain_key,
            open_time,
        }
    }
}

/// Tabs sharing one domain key, in snapshot order
#[derive(Debug, Clone, PartialEq)]
pub struct WindowGroup {
    pub domain_key: String,
    pub tabs: Vec<TabRecord>,
}

impl WindowGroup {
    pub fn urls(&self) -> Vec<String> {
        self.tabs.iter().map(|tab| tab.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }
}

/// Point-in-time capture of every eligible tab plus every window that
/// existed when it was taken (including windows holding only excluded tabs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tabs: Vec<TabRecord>,
    pub windows: Vec<WindowId>,
}
