//! Race records and API response types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder for a missing link or registration date.
///
/// Distinct from an empty string: a cell that exists but is blank stays `""`.
pub const NO_DATA: &str = "無資料";

/// Race row as scraped, before derived fields are added
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRace {
    pub date: String,
    pub name: String,
    pub location: String,
    pub distance: String,
    pub link: String,
    pub registration_date: String,
}

/// Normalized race record served to queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceRecord {
    pub date: String,      // "MM/DD" expected
    pub name: String,
    pub location: String,  // free text, may name several places
    pub distance: String,
    pub link: String,      // URL or NO_DATA
    pub registration_date: String,
    /// 0 = unrecognized, 1-5 = north/central/south/east/islands
    pub region_code: u8,
    pub month: Option<String>,
}

impl RaceRecord {
    pub fn has_link(&self) -> bool {
        self.link != NO_DATA
    }

    pub fn has_registration_date(&self) -> bool {
        self.registration_date != NO_DATA
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of races in the current snapshot
    pub races: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
