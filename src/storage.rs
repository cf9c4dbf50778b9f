/// Storage serialization utilities for chrome.storage.local
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::tab_data::TabRecord;

/// Most recent snapshot written by the sort path
pub const SNAPSHOT_KEY: &str = "originalTabs";
/// Identity of the snapshot under [`SNAPSHOT_KEY`]
pub const SNAPSHOT_STAMP_KEY: &str = "originalTabsStamp";
/// Tab handle → creation timestamp
pub const OPEN_TIMES_KEY: &str = "tabOpenTimes";
pub const SETTINGS_KEY: &str = "settings";

/// Persistent key-value storage offered by the host
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Identity of a persisted snapshot.
///
/// Sort and export are not serialized against each other, so the snapshot
/// record is last-writer-wins; the stamp only lets export report which run
/// produced the data it is reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStamp {
    pub id: Uuid,
    pub taken_at: f64,
}

impl SnapshotStamp {
    pub fn new(taken_at: f64) -> Self {
        SnapshotStamp {
            id: Uuid::new_v4(),
            taken_at,
        }
    }
}

pub async fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key).await? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    store.set(key, serde_json::to_value(value)?).await
}

pub async fn save_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
    tabs: &[TabRecord],
    stamp: &SnapshotStamp,
) -> Result<()> {
    save_json(store, SNAPSHOT_KEY, tabs).await?;
    save_json(store, SNAPSHOT_STAMP_KEY, stamp).await
}

pub async fn load_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<(Vec<TabRecord>, Option<SnapshotStamp>)>> {
    let tabs: Option<Vec<TabRecord>> = load_json(store, SNAPSHOT_KEY).await?;
    match tabs {
        Some(tabs) => {
            let stamp = load_json(store, SNAPSHOT_STAMP_KEY).await?;
            Ok(Some((tabs, stamp)))
        }
        None => Ok(None),
    }
}
