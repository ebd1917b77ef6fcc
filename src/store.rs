//! In-memory snapshot of the race calendar.
//!
//! The store holds one immutable [`Snapshot`] behind an `Arc`. Readers clone
//! the `Arc` and work on it lock-free; a refresh builds a new snapshot and
//! swaps the pointer, so a reader sees either the old or the new table.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::RaceRecord;

/// Races produced by one pipeline run
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub races: Vec<RaceRecord>,
    pub refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(races: Vec<RaceRecord>) -> Self {
        Self {
            races,
            refreshed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }
}

/// Shared holder of the latest snapshot
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot, or `None` before the first refresh
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Replace the snapshot as a unit
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot);
    }
}
