/// User settings stored alongside extension data
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::operations::SortMethod;
use crate::storage::{KeyValueStore, SETTINGS_KEY, load_json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Used when a sort command names no method
    pub default_method: SortMethod,
    pub export_base_name: String,
    /// Folder prefix under the browser's download directory
    pub export_folder: String,
    /// URL schemes that are never snapshotted, moved or exported
    pub excluded_schemes: Vec<String>,
    pub focus_new_windows: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_method: SortMethod::Domain,
            export_base_name: "tabs".to_string(),
            export_folder: "TabSorter".to_string(),
            excluded_schemes: ["chrome", "chrome-extension", "chrome-untrusted", "devtools", "edge", "about"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            focus_new_windows: false,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Missing or partial records fall back to defaults field by field
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Settings> {
        Ok(load_json(store, SETTINGS_KEY).await?.unwrap_or_default())
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level {:?}, using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}
