/// Tab Sorter - Chrome Extension that groups tabs into one window per domain
/// Built with Rust + WASM + Yew

mod bridge;
mod commands;
mod domain;
mod error;
mod export;
mod host;
mod open_times;
mod operations;
mod reconcile;
mod settings;
mod snapshot;
mod storage;
mod tab_data;
pub mod ui;

#[cfg(test)]
mod testing;

use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::bridge::{ChromeBrowser, ChromeDownloads, ChromeStorage};
use crate::commands::TabSorter;
use crate::tab_data::TabId;

pub use crate::commands::{Command, Response};
pub use crate::error::{HostError, TabSorterError};
pub use crate::operations::SortMethod;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export core domain functions for JavaScript access
#[wasm_bindgen]
pub fn extract_domain_key(url: &str) -> String {
    domain::extract_domain_key(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

type ChromeTabSorter = TabSorter<ChromeBrowser, ChromeStorage, ChromeDownloads>;

/// Background service worker handle. Owns the open-times record for the
/// lifetime of the worker.
#[wasm_bindgen]
pub struct Background {
    sorter: Rc<ChromeTabSorter>,
}

#[wasm_bindgen]
impl Background {
    pub async fn load() -> Result<Background, JsValue> {
        let sorter = TabSorter::load(ChromeBrowser, ChromeStorage, ChromeDownloads)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::set_max_level(sorter.settings().level_filter());

        Ok(Background {
            sorter: Rc::new(sorter),
        })
    }

    /// Resolves with `{ success, message }` or `{ success: false, error }`
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Promise {
        let sorter = Rc::clone(&self.sorter);
        future_to_promise(async move {
            let response = match serde_wasm_bindgen::from_value::<serde_json::Value>(message) {
                Ok(request) => sorter.handle(&request).await,
                Err(e) => Response::from(Err(TabSorterError::InvalidRequest(e.to_string()))),
            };
            serde_wasm_bindgen::to_value(&response).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    #[wasm_bindgen(js_name = tabCreated)]
    pub fn tab_created(&self, tab_id: i32, created_at: f64) -> Promise {
        let sorter = Rc::clone(&self.sorter);
        future_to_promise(async move {
            sorter
                .tab_created(TabId(tab_id), created_at)
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    #[wasm_bindgen(js_name = tabRemoved)]
    pub fn tab_removed(&self, tab_id: i32) -> Promise {
        let sorter = Rc::clone(&self.sorter);
        future_to_promise(async move {
            sorter
                .tab_removed(TabId(tab_id))
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }
}
