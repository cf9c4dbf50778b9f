use thiserror::Error;

/// Failure reported by a single browser API call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The handle was invalidated out of band (closed by the user, auto-closed by the browser).
    #[error("No {kind} with id: {id}")]
    Gone { kind: &'static str, id: i32 },

    #[error("Browser API error: {0}")]
    Api(String),
}

impl HostError {
    pub fn is_gone(&self) -> bool {
        matches!(self, HostError::Gone { .. })
    }

    /// Classify a browser error message. Chrome reports invalidated handles as
    /// "No tab with id: 5." / "No window with id: 3.".
    pub fn from_message(message: &str) -> HostError {
        for kind in ["tab", "window"] {
            let prefix = format!("No {} with id: ", kind);
            if let Some(rest) = message.find(&prefix).map(|at| &message[at + prefix.len()..]) {
                let digits: String = rest
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '-')
                    .collect();
                if let Ok(id) = digits.parse() {
                    return HostError::Gone { kind, id };
                }
            }
        }
        HostError::Api(message.to_string())
    }
}

#[derive(Error, Debug)]
pub enum TabSorterError {
    #[error("Failed to enumerate tabs: {0}")]
    Enumeration(#[source] HostError),

    #[error("Failed to open window for {domain}: {source}")]
    WindowCreate {
        domain: String,
        #[source]
        source: HostError,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No tabs to export")]
    EmptyInput,

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TabSorterError>;
