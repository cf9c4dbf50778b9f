/// In-memory stand-ins for the browser, storage and downloads
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::error::{HostError, Result, TabSorterError};
use crate::export::{Download, Downloader};
use crate::host::{BrowserHost, HostTab, HostWindow, WindowSeed};
use crate::storage::KeyValueStore;
use crate::tab_data::{TabId, WindowId};

pub const FAKE_NOW: f64 = 1_700_000_000_000.0;

#[derive(Debug, Clone)]
struct FakeTab {
    id: TabId,
    url: String,
    title: String,
}

#[derive(Debug)]
struct FakeWindow {
    id: WindowId,
    tabs: Vec<FakeTab>,
}

#[derive(Debug, Default)]
struct FakeState {
    windows: Vec<FakeWindow>,
    next_tab: i32,
    next_window: i32,
    moves: Vec<(TabId, WindowId)>,
    removed_windows: Vec<WindowId>,
    created_windows: Vec<WindowId>,
}

/// Browser model with Chrome's habit of closing a window once its last tab leaves
pub struct FakeBrowser {
    state: RefCell<FakeState>,
    auto_close_empty: Cell<bool>,
    fail_enumeration: Cell<bool>,
    report_unordered: Cell<bool>,
    failing_moves: RefCell<HashSet<TabId>>,
    failing_creates: RefCell<Option<String>>,
    failing_removes: RefCell<HashSet<WindowId>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        FakeBrowser {
            state: RefCell::new(FakeState {
                next_tab: 1,
                next_window: 100,
                ..FakeState::default()
            }),
            auto_close_empty: Cell::new(true),
            fail_enumeration: Cell::new(false),
            report_unordered: Cell::new(false),
            failing_moves: RefCell::new(HashSet::new()),
            failing_creates: RefCell::new(None),
            failing_removes: RefCell::new(HashSet::new()),
        }
    }

    /// Open a window holding `urls`; returns its handle
    pub fn open_window(&self, urls: &[&str]) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = WindowId(state.next_window);
        state.next_window += 1;
        let mut tabs = Vec::new();
        for url in urls {
            let tab_id = TabId(state.next_tab);
            state.next_tab += 1;
            tabs.push(FakeTab {
                id: tab_id,
                url: url.to_string(),
                title: format!("Title of {}", url),
            });
        }
        state.windows.push(FakeWindow { id, tabs });
        id
    }

    pub fn keep_empty_windows(&self) {
        self.auto_close_empty.set(false);
    }

    pub fn fail_enumeration(&self) {
        self.fail_enumeration.set(true);
    }

    /// Report each window's tabs last-to-first; `index` still gives strip position
    pub fn report_tabs_unordered(&self) {
        self.report_unordered.set(true);
    }

    pub fn fail_move(&self, tab: TabId) {
        self.failing_moves.borrow_mut().insert(tab);
    }

    /// Window creation fails when any seed URL contains `needle`
    pub fn fail_create_containing(&self, needle: &str) {
        *self.failing_creates.borrow_mut() = Some(needle.to_string());
    }

    pub fn fail_remove(&self, window: WindowId) {
        self.failing_removes.borrow_mut().insert(window);
    }

    /// Close a window behind the extension's back
    pub fn close_out_of_band(&self, window: WindowId) {
        self.state.borrow_mut().windows.retain(|w| w.id != window);
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.state.borrow().windows.iter().map(|w| w.id).collect()
    }

    pub fn urls_in(&self, window: WindowId) -> Vec<String> {
        self.state
            .borrow()
            .windows
            .iter()
            .find(|w| w.id == window)
            .map(|w| w.tabs.iter().map(|t| t.url.clone()).collect())
            .unwrap_or_default()
    }

    pub fn all_tab_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self
            .state
            .borrow()
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter().map(|t| t.id))
            .collect();
        ids.sort();
        ids
    }

    pub fn window_of(&self, tab: TabId) -> Option<WindowId> {
        self.state
            .borrow()
            .windows
            .iter()
            .find(|w| w.tabs.iter().any(|t| t.id == tab))
            .map(|w| w.id)
    }

    pub fn moves(&self) -> Vec<(TabId, WindowId)> {
        self.state.borrow().moves.clone()
    }

    pub fn removed_windows(&self) -> Vec<WindowId> {
        self.state.borrow().removed_windows.clone()
    }

    pub fn created_windows(&self) -> Vec<WindowId> {
        self.state.borrow().created_windows.clone()
    }

    fn take_tab(state: &mut FakeState, tab: TabId, auto_close: bool) -> Option<FakeTab> {
        let position = state
            .windows
            .iter()
            .position(|w| w.tabs.iter().any(|t| t.id == tab))?;
        let window = &mut state.windows[position];
        let index = window.tabs.iter().position(|t| t.id == tab)?;
        let taken = window.tabs.remove(index);
        if auto_close && window.tabs.is_empty() {
            state.windows.remove(position);
        }
        Some(taken)
    }
}

#[async_trait(?Send)]
impl BrowserHost for FakeBrowser {
    async fn windows(&self) -> std::result::Result<Vec<HostWindow>, HostError> {
        if self.fail_enumeration.get() {
            return Err(HostError::Api("windows.getAll unavailable".to_string()));
        }
        let state = self.state.borrow();
        Ok(state
            .windows
            .iter()
            .map(|w| {
                let mut tabs: Vec<HostTab> = w
                    .tabs
                    .iter()
                    .enumerate()
                    .map(|(index, t)| HostTab {
                        id: t.id,
                        window_id: w.id,
                        index: index as i32,
                        url: Some(t.url.clone()),
                        title: Some(t.title.clone()),
                    })
                    .collect();
                if self.report_unordered.get() {
                    tabs.reverse();
                }
                HostWindow { id: w.id, tabs }
            })
            .collect())
    }

    async fn window_tabs(&self, window: WindowId) -> std::result::Result<Vec<HostTab>, HostError> {
        let windows = self.windows().await?;
        windows
            .into_iter()
            .find(|w| w.id == window)
            .map(|w| w.tabs)
            .ok_or(HostError::Gone { kind: "window", id: window.0 })
    }

    async fn create_window(
        &self,
        seed: WindowSeed,
        _focused: bool,
    ) -> std::result::Result<WindowId, HostError> {
        if let (Some(needle), WindowSeed::Urls(urls)) = (&*self.failing_creates.borrow(), &seed) {
            if urls.iter().any(|u| u.contains(needle.as_str())) {
                return Err(HostError::Api("Window creation refused".to_string()));
            }
        }

        let mut state = self.state.borrow_mut();
        let id = WindowId(state.next_window);
        let tabs = match seed {
            WindowSeed::Urls(urls) => {
                let mut tabs = Vec::new();
                for url in urls {
                    let tab_id = TabId(state.next_tab);
                    state.next_tab += 1;
                    tabs.push(FakeTab {
                        id: tab_id,
                        title: format!("Title of {}", url),
                        url,
                    });
                }
                tabs
            }
            WindowSeed::Tab(tab) => {
                let taken = Self::take_tab(&mut state, tab, self.auto_close_empty.get())
                    .ok_or(HostError::Gone { kind: "tab", id: tab.0 })?;
                vec![taken]
            }
        };
        state.next_window += 1;
        state.windows.push(FakeWindow { id, tabs });
        state.created_windows.push(id);
        Ok(id)
    }

    async fn move_tab(&self, tab: TabId, window: WindowId) -> std::result::Result<(), HostError> {
        if self.failing_moves.borrow().contains(&tab) {
            return Err(HostError::Api(
                "Tabs cannot be edited right now (user may be dragging a tab).".to_string(),
            ));
        }
        let mut state = self.state.borrow_mut();
        if !state.windows.iter().any(|w| w.id == window) {
            return Err(HostError::Gone { kind: "window", id: window.0 });
        }
        let taken = Self::take_tab(&mut state, tab, self.auto_close_empty.get())
            .ok_or(HostError::Gone { kind: "tab", id: tab.0 })?;
        match state.windows.iter_mut().find(|w| w.id == window) {
            Some(target) => target.tabs.push(taken),
            // Target was the tab's own window and closed when emptied.
            None => state.windows.push(FakeWindow { id: window, tabs: vec![taken] }),
        }
        state.moves.push((tab, window));
        Ok(())
    }

    async fn remove_window(&self, window: WindowId) -> std::result::Result<(), HostError> {
        if self.failing_removes.borrow().contains(&window) {
            return Err(HostError::Api("Window is busy".to_string()));
        }
        let mut state = self.state.borrow_mut();
        let before = state.windows.len();
        state.windows.retain(|w| w.id != window);
        if state.windows.len() == before {
            return Err(HostError::Gone { kind: "window", id: window.0 });
        }
        state.removed_windows.push(window);
        Ok(())
    }

    fn now_ms(&self) -> f64 {
        FAKE_NOW
    }
}

/// chrome.storage.local stand-in
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            values: RefCell::new(HashMap::new()),
            fail_writes: Cell::new(false),
        }
    }

    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.get() {
            return Err(TabSorterError::Storage("QUOTA_BYTES quota exceeded".to_string()));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Captures downloads instead of writing files
pub struct RecordingDownloader {
    downloads: RefCell<Vec<Download>>,
    fail: Cell<bool>,
}

impl RecordingDownloader {
    pub fn new() -> Self {
        RecordingDownloader {
            downloads: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        }
    }

    pub fn fail(&self) {
        self.fail.set(true);
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Downloader for RecordingDownloader {
    async fn download(&self, download: Download) -> Result<()> {
        if self.fail.get() {
            return Err(TabSorterError::Download("Download blocked".to_string()));
        }
        self.downloads.borrow_mut().push(download);
        Ok(())
    }
}
