/// Domain key extraction for Tab Sorter
use url::Url;

/// Key returned when a URL cannot be parsed
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Extract the grouping key ("TLD group") from a URL
///
/// Algorithm:
/// 1. Parse URL as absolute and take its hostname
/// 2. Split hostname by "."
/// 3. More than one label → last two labels joined by "."
/// 4. Otherwise → the hostname unchanged
///
/// No public-suffix list is consulted, so two-label suffixes collapse:
/// `news.bbc.co.uk` groups under `co.uk`.
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://mail.example.com/z → example.com
/// - http://localhost:3000 → localhost
/// - not a url → unknown
pub fn extract_domain_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let hostname = parsed.host_str().unwrap_or_default();
            let labels: Vec<&str> = hostname.split('.').collect();

            if labels.len() > 1 {
                labels[labels.len() - 2..].join(".")
            } else {
                hostname.to_string()
            }
        }
        Err(e) => {
            log::warn!("Could not parse URL {:?}: {}", url, e);
            UNKNOWN_DOMAIN.to_string()
        }
    }
}
