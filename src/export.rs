/// CSV export of tab snapshots
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, TabSorterError};
use crate::tab_data::TabRecord;

pub const CSV_HEADER: &str = "ID,Title,URL,TLD,Window ID,Open Time";
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Characters browsers refuse in download file names
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]+"#).expect("valid regex"));

/// A file handed to the browser's download manager
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    /// Relative to the download directory, folder prefix included
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

#[async_trait(?Send)]
pub trait Downloader {
    async fn download(&self, download: Download) -> Result<()>;
}

/// Render milliseconds since the epoch the way `Date.prototype.toISOString` does
pub fn iso_timestamp(millis: f64) -> String {
    let time = DateTime::from_timestamp_millis(millis as i64).unwrap_or_else(|| {
        log::warn!("Timestamp {} out of range, using the epoch", millis);
        DateTime::default()
    });
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Serialize records to CSV, one row per record in input order.
///
/// Title and URL are always quoted; an empty input is an error rather than a
/// header-only document.
pub fn to_csv(records: &[TabRecord]) -> Result<String> {
    if records.is_empty() {
        return Err(TabSorterError::EmptyInput);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for record in records {
        lines.push(format!(
            "{},{},{},{},{},{}",
            record.id,
            quote(&record.title),
            quote(&record.url),
            record.domain_key,
            record.window_id,
            iso_timestamp(record.open_time),
        ));
    }
    Ok(lines.join("\n"))
}

/// `<folder>/<base>_<ISO timestamp with ':' as '-'>.csv`
pub fn export_filename(folder: &str, base_name: &str, now_ms: f64) -> String {
    let base = UNSAFE_FILENAME_CHARS.replace_all(base_name.trim(), "_");
    let base = if base.is_empty() { "tabs".into() } else { base };
    let stamp = iso_timestamp(now_ms).replace(':', "-");
    let folder = folder.trim_matches('/');

    if folder.is_empty() {
        format!("{}_{}.csv", base, stamp)
    } else {
        format!("{}/{}_{}.csv", folder, base, stamp)
    }
}
