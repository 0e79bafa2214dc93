//! Collection service error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to upload files (status {status})")]
    UploadFailed { status: u16 },

    #[error("Failed to submit form data (status {status})")]
    SubmitFailed { status: u16 },

    #[error("Cannot read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status reported by the service, when the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UploadFailed { status } | ApiError::SubmitFailed { status } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
