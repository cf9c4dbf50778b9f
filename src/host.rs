/// Browser window/tab control surface
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::HostError;
use crate::tab_data::{TabId, WindowId};

/// A tab as the browser reports it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTab {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A window with its tabs populated
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostWindow {
    pub id: WindowId,
    #[serde(default)]
    pub tabs: Vec<HostTab>,
}

/// What a new window starts with
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSeed {
    /// Open these URLs as fresh tabs, in order
    Urls(Vec<String>),
    /// Move an existing tab into the new window
    Tab(TabId),
}

/// Asynchronous window/tab API of the browser.
///
/// Handles passed in may already be invalid; implementations report that as
/// [`HostError::Gone`] so callers can treat it as a no-op.
#[async_trait(?Send)]
pub trait BrowserHost {
    /// All open windows with tabs populated, in browser enumeration order
    async fn windows(&self) -> Result<Vec<HostWindow>, HostError>;

    /// Current tabs of one window
    async fn window_tabs(&self, window: WindowId) -> Result<Vec<HostTab>, HostError>;

    async fn create_window(&self, seed: WindowSeed, focused: bool) -> Result<WindowId, HostError>;

    /// Move a tab to the end of a window's tab strip
    async fn move_tab(&self, tab: TabId, window: WindowId) -> Result<(), HostError>;

    async fn remove_window(&self, window: WindowId) -> Result<(), HostError>;

    /// Host clock, milliseconds since the epoch
    fn now_ms(&self) -> f64;
}
