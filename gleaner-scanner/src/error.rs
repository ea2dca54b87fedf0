use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to fetch {target}: {reason}")]
    FetchFailed { target: String, reason: String },

    #[error("Error while reading {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No local filename supplied")]
    EmptyTarget,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    /// True for errors raised while retrieving page content, as opposed to
    /// scanning content that was already retrieved.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScanError::HttpError(_) | ScanError::FetchFailed { .. } | ScanError::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
