/// Command surface shared by the popup and the background page
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashSet;

use crate::error::{Result, TabSorterError};
use crate::export::{CSV_MIME_TYPE, Download, Downloader, export_filename, to_csv};
use crate::host::BrowserHost;
use crate::open_times::OpenTimes;
use crate::operations::{SortMethod, group_by_domain};
use crate::reconcile::{ReconcileMode, ReconcileReport, move_in_place, recreate};
use crate::settings::Settings;
use crate::snapshot::collect_snapshot;
use crate::storage::{self, KeyValueStore, SnapshotStamp};
use crate::tab_data::{Snapshot, TabId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SortTabs { method: Option<String> },
    SortTabsMove { method: Option<String> },
    ExportCsv,
}

#[derive(Deserialize)]
struct Request {
    action: String,
    #[serde(default)]
    method: Option<String>,
}

impl Command {
    /// Parse `{ "action": ..., "method": ... }`
    pub fn from_request(request: &Value) -> Result<Command> {
        let request = Request::deserialize(request)
            .map_err(|e| TabSorterError::InvalidRequest(e.to_string()))?;

        match request.action.as_str() {
            "sortTabs" => Ok(Command::SortTabs { method: request.method }),
            "sortTabsMove" => Ok(Command::SortTabsMove { method: request.method }),
            "exportCSV" => Ok(Command::ExportCsv),
            other => Err(TabSorterError::UnknownAction(other.to_string())),
        }
    }
}

/// Reply sent back over the message channel: a message or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String>> for Response {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(message) => Response {
                success: true,
                message: Some(message),
                error: None,
            },
            Err(e) => Response {
                success: false,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// The extension's core service, bound to a browser, a store and a downloader
pub struct TabSorter<H, S, D> {
    host: H,
    store: S,
    downloader: D,
    settings: Settings,
    open_times: RefCell<OpenTimes>,
}

impl<H, S, D> TabSorter<H, S, D>
where
    H: BrowserHost,
    S: KeyValueStore,
    D: Downloader,
{
    pub fn new(host: H, store: S, downloader: D, settings: Settings, open_times: OpenTimes) -> Self {
        TabSorter {
            host,
            store,
            downloader,
            settings,
            open_times: RefCell::new(open_times),
        }
    }

    /// Load settings and open times, dropping times of tabs closed while we were not running
    pub async fn load(host: H, store: S, downloader: D) -> Result<Self> {
        let settings = Settings::load(&store).await?;
        let mut open_times = OpenTimes::load(&store).await?;

        match host.windows().await {
            Ok(windows) => {
                let live: HashSet<TabId> = windows
                    .iter()
                    .flat_map(|w| w.tabs.iter().map(|t| t.id))
                    .collect();
                let dropped = open_times.retain_live(&live);
                if dropped > 0 {
                    log::debug!("Dropped {} stale open times", dropped);
                    open_times.persist(&store).await?;
                }
            }
            Err(e) => log::warn!("Could not prune open times: {}", e),
        }

        Ok(TabSorter::new(host, store, downloader, settings, open_times))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn handle(&self, request: &Value) -> Response {
        let result = match Command::from_request(request) {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(message) => log::info!("{}", message),
            Err(e) => log::warn!("Command failed: {}", e),
        }
        Response::from(result)
    }

    pub async fn execute(&self, command: Command) -> Result<String> {
        match command {
            Command::SortTabs { method } => self.sort(method.as_deref(), ReconcileMode::Recreate).await,
            Command::SortTabsMove { method } => self.sort(method.as_deref(), ReconcileMode::Move).await,
            Command::ExportCsv => self.export_csv().await,
        }
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        let open_times = self.open_times.borrow().clone();
        collect_snapshot(&self.host, &open_times, &self.settings.excluded_schemes).await
    }

    async fn sort(&self, method: Option<&str>, mode: ReconcileMode) -> Result<String> {
        let method = SortMethod::resolve(method, self.settings.default_method);
        let snapshot = self.snapshot().await?;

        let stamp = SnapshotStamp::new(self.host.now_ms());
        storage::save_snapshot(&self.store, &snapshot.tabs, &stamp).await?;

        let groups = group_by_domain(&snapshot.tabs, method);
        let focused = self.settings.focus_new_windows;
        let report = match mode {
            ReconcileMode::Recreate => recreate(&self.host, &groups, &snapshot.windows, focused).await?,
            ReconcileMode::Move => move_in_place(&self.host, &groups, &snapshot.windows, focused).await,
        };
        log::debug!("{:?} by {}: {:?}", mode, method, report);

        Ok(sort_message(mode, snapshot.tabs.len(), groups.len(), &report))
    }

    async fn export_csv(&self) -> Result<String> {
        let now = self.host.now_ms();
        let records = match storage::load_snapshot(&self.store).await? {
            Some((tabs, stamp)) if !tabs.is_empty() => {
                if let Some(stamp) = stamp {
                    log::info!(
                        "Exporting snapshot {} taken {:.0}s ago",
                        stamp.id,
                        (now - stamp.taken_at) / 1000.0
                    );
                }
                tabs
            }
            _ => self.snapshot().await?.tabs,
        };

        let contents = to_csv(&records)?;
        let filename = export_filename(&self.settings.export_folder, &self.settings.export_base_name, now);
        self.downloader
            .download(Download {
                filename: filename.clone(),
                mime_type: CSV_MIME_TYPE,
                contents,
            })
            .await?;

        Ok(format!("Exported {} tabs to {}", records.len(), filename))
    }

    pub async fn tab_created(&self, tab: TabId, created_at: f64) -> Result<()> {
        let open_times = {
            let mut open_times = self.open_times.borrow_mut();
            open_times.record(tab, created_at);
            open_times.clone()
        };
        open_times.persist(&self.store).await
    }

    pub async fn tab_removed(&self, tab: TabId) -> Result<()> {
        let open_times = {
            let mut open_times = self.open_times.borrow_mut();
            if !open_times.evict(tab) {
                return Ok(());
            }
            open_times.clone()
        };
        open_times.persist(&self.store).await
    }
}

fn sort_message(mode: ReconcileMode, tabs: usize, groups: usize, report: &ReconcileReport) -> String {
    let mut message = match mode {
        ReconcileMode::Recreate => format!("Sorted {} tabs into {} windows", tabs, groups),
        ReconcileMode::Move => format!(
            "Moved {} of {} tabs into {} windows",
            report.tabs_moved, tabs, groups
        ),
    };
    if report.failures() > 0 {
        message.push_str(&format!(" ({} operations failed)", report.failures()));
    }
    message
}
