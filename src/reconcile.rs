/// Window reconciliation: converge live windows to one window per domain group
use futures::future::join_all;
use std::collections::{HashMap, HashSet};

use crate::error::{Result, TabSorterError};
use crate::host::{BrowserHost, WindowSeed};
use crate::tab_data::{TabId, WindowGroup, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Open a fresh window per group, then close every original window
    Recreate,
    /// Reuse windows that already hold a group's tabs, move the rest, reap empty shells
    Move,
}

/// What a reconciliation run did. Per-item failures end up here, not in errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub windows_created: usize,
    pub tabs_moved: usize,
    pub move_failures: usize,
    pub windows_closed: usize,
    pub close_failures: usize,
    /// Tabs or windows that disappeared before we got to them
    pub already_gone: usize,
}

impl ReconcileReport {
    pub fn failures(&self) -> usize {
        self.move_failures + self.close_failures
    }
}

/// Domain key → home window for a single run.
///
/// A window hosts at most one key and every assigned key has exactly one window.
#[derive(Debug, Default)]
pub struct WindowAssignment {
    homes: HashMap<String, WindowId>,
    claimed: HashSet<WindowId>,
}

impl WindowAssignment {
    /// Returns false if the key already has a home or the window is taken
    pub fn claim(&mut self, domain_key: &str, window: WindowId) -> bool {
        if self.homes.contains_key(domain_key) || self.claimed.contains(&window) {
            return false;
        }
        self.claimed.insert(window);
        self.homes.insert(domain_key.to_string(), window);
        true
    }

    pub fn is_claimed(&self, window: WindowId) -> bool {
        self.claimed.contains(&window)
    }

    pub fn home(&self, domain_key: &str) -> Option<WindowId> {
        self.homes.get(domain_key).copied()
    }

    pub fn home_count(&self) -> usize {
        self.homes.len()
    }
}

/// Recreate mode.
///
/// All windows are opened together and must all succeed before any original
/// window is closed. If one fails, the windows opened in this run are closed
/// again and the originals are left alone.
pub async fn recreate<H: BrowserHost + ?Sized>(
    host: &H,
    groups: &[WindowGroup],
    originals: &[WindowId],
    focused: bool,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    if groups.is_empty() {
        log::info!("No eligible tabs, leaving windows untouched");
        return Ok(report);
    }

    let opened = join_all(
        groups
            .iter()
            .map(|group| host.create_window(WindowSeed::Urls(group.urls()), focused)),
    )
    .await;

    let mut created = Vec::with_capacity(groups.len());
    let mut first_failure = None;
    for (group, result) in groups.iter().zip(opened) {
        match result {
            Ok(window) => {
                log::debug!("Opened window {} for {}", window, group.domain_key);
                created.push(window);
            }
            Err(e) => {
                log::warn!("Failed to open window for {}: {}", group.domain_key, e);
                if first_failure.is_none() {
                    first_failure = Some((group.domain_key.clone(), e));
                }
            }
        }
    }

    if let Some((domain, source)) = first_failure {
        let mut rollback = ReconcileReport::default();
        close_windows(host, &created, &mut rollback).await;
        log::warn!("Rolled back {} new windows", rollback.windows_closed);
        return Err(TabSorterError::WindowCreate { domain, source });
    }
    report.windows_created = created.len();

    close_windows(host, originals, &mut report).await;
    Ok(report)
}

/// Incremental-move mode. Never fails as a whole; see the report for what
/// could not be done.
pub async fn move_in_place<H: BrowserHost + ?Sized>(
    host: &H,
    groups: &[WindowGroup],
    originals: &[WindowId],
    focused: bool,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let mut keys_by_window: HashMap<WindowId, HashSet<&str>> = HashMap::new();
    for group in groups {
        for tab in &group.tabs {
            keys_by_window
                .entry(tab.window_id)
                .or_default()
                .insert(group.domain_key.as_str());
        }
    }

    // Assignment: groups in sort order, first unclaimed original window holding the key wins.
    let mut assignment = WindowAssignment::default();
    let mut seeded: HashSet<TabId> = HashSet::new();
    for group in groups {
        let key = group.domain_key.as_str();
        let reusable = originals.iter().copied().find(|window| {
            !assignment.is_claimed(*window)
                && keys_by_window
                    .get(window)
                    .is_some_and(|keys| keys.contains(key))
        });

        match reusable {
            Some(window) => {
                log::debug!("Reusing window {} for {}", window, key);
                assignment.claim(key, window);
            }
            None => {
                if let Some((window, seed)) = open_home(host, group, focused, &mut report).await {
                    assignment.claim(key, window);
                    seeded.insert(seed);
                }
            }
        }
    }

    log::debug!("{} of {} groups have a home window", assignment.home_count(), groups.len());

    // Move: anything not already in its home goes to the end of the home's strip.
    for group in groups {
        let Some(home) = assignment.home(&group.domain_key) else {
            continue;
        };
        for tab in &group.tabs {
            if tab.window_id == home || seeded.contains(&tab.id) {
                continue;
            }
            match host.move_tab(tab.id, home).await {
                Ok(()) => report.tabs_moved += 1,
                Err(e) if e.is_gone() => {
                    log::debug!("Tab {} vanished before move: {}", tab.id, e);
                    report.already_gone += 1;
                }
                Err(e) => {
                    log::warn!("Failed to move tab {} to window {}: {}", tab.id, home, e);
                    report.move_failures += 1;
                }
            }
        }
    }

    // Reap: only originals that ended up with zero tabs.
    let queried = join_all(
        originals
            .iter()
            .map(|&window| async move { (window, host.window_tabs(window).await) }),
    )
    .await;

    let mut empty = Vec::new();
    for (window, result) in queried {
        match result {
            Ok(tabs) if tabs.is_empty() => empty.push(window),
            Ok(_) => {}
            Err(e) if e.is_gone() => {
                log::debug!("Window {} already closed", window);
                report.already_gone += 1;
            }
            Err(e) => log::warn!("Could not inspect window {}: {}", window, e),
        }
    }
    close_windows(host, &empty, &mut report).await;

    report
}

/// Open a new window for `group`, seeded with its first tab that still exists
async fn open_home<H: BrowserHost + ?Sized>(
    host: &H,
    group: &WindowGroup,
    focused: bool,
    report: &mut ReconcileReport,
) -> Option<(WindowId, TabId)> {
    for tab in &group.tabs {
        match host.create_window(WindowSeed::Tab(tab.id), focused).await {
            Ok(window) => {
                log::debug!("Opened window {} for {} with tab {}", window, group.domain_key, tab.id);
                report.windows_created += 1;
                report.tabs_moved += 1;
                return Some((window, tab.id));
            }
            Err(e) if e.is_gone() => {
                report.already_gone += 1;
            }
            Err(e) => {
                log::warn!("Failed to open window for {}: {}", group.domain_key, e);
                report.move_failures += group.len();
                return None;
            }
        }
    }
    None
}

/// Close windows concurrently; windows that are already gone count as done
async fn close_windows<H: BrowserHost + ?Sized>(
    host: &H,
    windows: &[WindowId],
    report: &mut ReconcileReport,
) {
    let results = join_all(
        windows
            .iter()
            .map(|&window| async move { (window, host.remove_window(window).await) }),
    )
    .await;

    for (window, result) in results {
        match result {
            Ok(()) => report.windows_closed += 1,
            Err(e) if e.is_gone() => {
                log::debug!("Window {} already closed", window);
                report.already_gone += 1;
            }
            Err(e) => {
                log::warn!("Failed to close window {}: {}", window, e);
                report.close_failures += 1;
            }
        }
    }
}
