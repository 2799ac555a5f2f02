use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaggerError>;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unknown site: {0}")]
    UnknownSite(String),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("storage error during {operation}: {reason}")]
    Storage { operation: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TaggerError {
    pub fn storage_error(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        TaggerError::Storage {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch_error(url: impl Into<String>, reason: impl Into<String>) -> Self {
        TaggerError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/* reqwest errors carry the url when they have one */
impl From<reqwest::Error> for TaggerError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        TaggerError::Fetch {
            url,
            reason: e.to_string(),
        }
    }
}
