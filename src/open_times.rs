/// Tab creation times, kept outside the browser's own tab objects
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::Result;
use crate::storage::{KeyValueStore, OPEN_TIMES_KEY, load_json, save_json};
use crate::tab_data::TabId;

/// Creation timestamps (ms since epoch) by tab handle.
///
/// Loaded once when the background starts, persisted after every mutation and
/// evicted when the browser reports a tab removed. Handed to the snapshot
/// collector by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenTimes {
    times: HashMap<TabId, f64>,
}

impl OpenTimes {
    pub fn new() -> Self {
        OpenTimes::default()
    }

    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<OpenTimes> {
        let stored: Option<BTreeMap<String, f64>> = load_json(store, OPEN_TIMES_KEY).await?;
        let mut times = HashMap::new();
        for (key, at) in stored.unwrap_or_default() {
            match key.parse::<i32>() {
                Ok(id) => {
                    times.insert(TabId(id), at);
                }
                Err(_) => log::warn!("Ignoring malformed tab id {:?} in {}", key, OPEN_TIMES_KEY),
            }
        }
        Ok(OpenTimes { times })
    }

    pub async fn persist<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<()> {
        let stored: BTreeMap<String, f64> = self
            .times
            .iter()
            .map(|(id, at)| (id.to_string(), *at))
            .collect();
        save_json(store, OPEN_TIMES_KEY, &stored).await
    }

    pub fn get(&self, tab: TabId) -> Option<f64> {
        self.times.get(&tab).copied()
    }

    pub fn record(&mut self, tab: TabId, created_at: f64) {
        self.times.insert(tab, created_at);
    }

    pub fn evict(&mut self, tab: TabId) -> bool {
        self.times.remove(&tab).is_some()
    }

    /// Drop entries for tabs that closed while nothing was listening.
    /// Returns how many were dropped.
    pub fn retain_live(&mut self, live: &HashSet<TabId>) -> usize {
        let before = self.times.len();
        self.times.retain(|id, _| live.contains(id));
        before - self.times.len()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
