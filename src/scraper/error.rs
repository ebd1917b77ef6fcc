//! Errors raised by the scrape pipeline stages.

use thiserror::Error;

/// HTTP statuses worth retrying
const TRANSIENT_STATUSES: [u16; 4] = [500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("failed to parse race table: {0}")]
    Parse(String),
}

impl ScrapeError {
    /// Whether the fetch should be attempted again
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Status { status } => TRANSIENT_STATUSES.contains(status),
            _ => false,
        }
    }
}
