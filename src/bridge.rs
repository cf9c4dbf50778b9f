/// chrome.* bindings behind the host traits
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::{self, HostError, TabSorterError};
use crate::export::{Download, Downloader};
use crate::host::{BrowserHost, HostTab, HostWindow, WindowSeed};
use crate::storage::KeyValueStore;
use crate::tab_data::{TabId, WindowId};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/host.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getAllWindows() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getWindowTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createWindow(urls: JsValue, tab_id: Option<i32>, focused: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTab(tab_id: i32, window_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeWindow(window_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn downloadFile(filename: &str, mime_type: &str, contents: &str) -> Result<(), JsValue>;
}

fn js_message(e: &JsValue) -> String {
    match e.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => e.as_string().unwrap_or_else(|| format!("{:?}", e)),
    }
}

fn host_error(e: JsValue) -> HostError {
    HostError::from_message(&js_message(&e))
}

fn parse<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError::Api(format!("Unexpected browser response: {}", e)))
}

/// chrome.windows / chrome.tabs
pub struct ChromeBrowser;

#[async_trait(?Send)]
impl BrowserHost for ChromeBrowser {
    async fn windows(&self) -> Result<Vec<HostWindow>, HostError> {
        parse(getAllWindows().await.map_err(host_error)?)
    }

    async fn window_tabs(&self, window: WindowId) -> Result<Vec<HostTab>, HostError> {
        parse(getWindowTabs(window.0).await.map_err(host_error)?)
    }

    async fn create_window(
        &self,
        seed: WindowSeed,
        focused: bool,
    ) -> Result<WindowId, HostError> {
        let created = match seed {
            WindowSeed::Urls(urls) => {
                let urls = serde_wasm_bindgen::to_value(&urls)
                    .map_err(|e| HostError::Api(e.to_string()))?;
                createWindow(urls, None, focused).await
            }
            WindowSeed::Tab(TabId(tab)) => createWindow(JsValue::UNDEFINED, Some(tab), focused).await,
        };
        let window: HostWindow = parse(created.map_err(host_error)?)?;
        Ok(window.id)
    }

    async fn move_tab(&self, tab: TabId, window: WindowId) -> Result<(), HostError> {
        moveTab(tab.0, window.0).await.map_err(host_error)
    }

    async fn remove_window(&self, window: WindowId) -> Result<(), HostError> {
        removeWindow(window.0).await.map_err(host_error)
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// chrome.storage.local
pub struct ChromeStorage;

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, key: &str) -> error::Result<Option<Value>> {
        let value = getStorage(key)
            .await
            .map_err(|e| TabSorterError::Storage(js_message(&e)))?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| TabSorterError::Storage(format!("Failed to parse {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: Value) -> error::Result<()> {
        // Plain objects, not JS Maps, so chrome.storage can persist them
        let value = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| TabSorterError::Storage(format!("Failed to serialize {}: {}", key, e)))?;

        setStorage(key, value)
            .await
            .map_err(|e| TabSorterError::Storage(js_message(&e)))
    }
}

/// chrome.downloads
pub struct ChromeDownloads;

#[async_trait(?Send)]
impl Downloader for ChromeDownloads {
    async fn download(&self, download: Download) -> error::Result<()> {
        downloadFile(&download.filename, download.mime_type, &download.contents)
            .await
            .map_err(|e| TabSorterError::Download(js_message(&e)))
    }
}
