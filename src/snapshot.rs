/// Snapshot collection from live browser state
use url::Url;

use crate::error::{Result, TabSorterError};
use crate::host::BrowserHost;
use crate::open_times::OpenTimes;
use crate::tab_data::{Snapshot, TabRecord};

/// Whether `url` belongs to one of the browser's internal schemes
pub fn is_privileged_url(url: &str, excluded_schemes: &[String]) -> bool {
    match Url::parse(url) {
        Ok(parsed) => excluded_schemes
            .iter()
            .any(|scheme| scheme.eq_ignore_ascii_case(parsed.scheme())),
        Err(_) => false,
    }
}

/// Capture every eligible tab across all windows.
///
/// Windows come in browser enumeration order and tabs in tab-strip order, so
/// snapshot order is the current left-to-right visual order. Read-only: the
/// host is only queried. An enumeration failure yields no snapshot at all.
pub async fn collect_snapshot<H: BrowserHost + ?Sized>(
    host: &H,
    open_times: &OpenTimes,
    excluded_schemes: &[String],
) -> Result<Snapshot> {
    let windows = host.windows().await.map_err(TabSorterError::Enumeration)?;
    let now = host.now_ms();

    let mut snapshot = Snapshot::default();
    for mut window in windows {
        snapshot.windows.push(window.id);
        window.tabs.sort_by_key(|tab| tab.index);

        for tab in window.tabs {
            let url = tab.url.unwrap_or_default();
            if is_privileged_url(&url, excluded_schemes) {
                log::debug!("Skipping internal tab {} ({})", tab.id, url);
                continue;
            }
            let open_time = open_times.get(tab.id).unwrap_or(now);
            snapshot.tabs.push(TabRecord::new(
                tab.id,
                tab.title.unwrap_or_default(),
                url,
                window.id,
                open_time,
            ));
        }
    }

    log::debug!(
        "Collected {} tabs across {} windows",
        snapshot.tabs.len(),
        snapshot.windows.len()
    );
    Ok(snapshot)
}
