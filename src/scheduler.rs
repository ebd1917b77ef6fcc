//! Periodic refresh of the race snapshot.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::scraper::RaceSource;
use crate::store::{Snapshot, SnapshotStore};

/// Result of one refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshot with this many races is live
    Published(usize),
    /// Pipeline returned no races; previous snapshot kept
    Empty,
    /// Pipeline failed; previous snapshot kept
    Failed,
}

/// Runs the scrape pipeline and publishes its output to the store
pub struct Refresher<S> {
    source: S,
    store: Arc<SnapshotStore>,
}

impl<S: RaceSource> Refresher<S> {
    pub fn new(source: S, store: Arc<SnapshotStore>) -> Self {
        Self { source, store }
    }

    /// Run the pipeline once.
    ///
    /// A non-empty result replaces the snapshot. An empty or failed run keeps
    /// the current snapshot, except before the first publish where an empty
    /// snapshot is installed so queries report that no data is available.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let outcome = match self.source.load().await {
            Ok(races) if !races.is_empty() => {
                let count = races.len();
                self.store.publish(Snapshot::new(races));
                info!("Race data refreshed: {} races", count);
                return RefreshOutcome::Published(count);
            }
            Ok(_) => {
                warn!("Race data refresh returned no races");
                RefreshOutcome::Empty
            }
            Err(e) => {
                error!("Race data refresh failed: {}", e);
                RefreshOutcome::Failed
            }
        };

        if self.store.current().is_none() {
            warn!("Starting with an empty race table");
            self.store.publish(Snapshot::new(Vec::new()));
        }

        outcome
    }

    /// Refresh immediately, then every `interval` until `shutdown` fires.
    ///
    /// A cycle in progress always runs to completion; cancellation is
    /// observed between cycles.
    pub async fn run(self, interval: Duration, shutdown: CancellationToken) {
        info!("Refresh scheduler started (every {:?})", interval);

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
            }
        }

        info!("Refresh scheduler stopped");
    }

    pub fn spawn(self, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(interval, shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::ScrapeError;
    use crate::types::{RaceRecord, NO_DATA};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type LoadResult = Result<Vec<RaceRecord>, ScrapeError>;

    /// Returns queued results in order, then empty tables
    struct FakeSource {
        results: Mutex<VecDeque<LoadResult>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(results: Vec<LoadResult>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                results: Mutex::new(results.into()),
                calls: calls.clone(),
            };
            (source, calls)
        }
    }

    impl RaceSource for FakeSource {
        fn load(&self) -> impl Future<Output = LoadResult> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.results.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()));
            async move { next }
        }
    }

    fn races(n: usize) -> Vec<RaceRecord> {
        (0..n)
            .map(|i| RaceRecord {
                date: "05/01".to_string(),
                name: format!("race {}", i),
                location: "台中市".to_string(),
                distance: "10K".to_string(),
                link: NO_DATA.to_string(),
                registration_date: NO_DATA.to_string(),
                region_code: 2,
                month: Some("05".to_string()),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_refresh_publishes_races() {
        let store = Arc::new(SnapshotStore::new());
        let (source, _) = FakeSource::new(vec![Ok(races(3))]);
        let refresher = Refresher::new(source, store.clone());

        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Published(3));
        assert_eq!(store.current().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_refresh_keeps_previous_snapshot() {
        let store = Arc::new(SnapshotStore::new());
        let (source, _) = FakeSource::new(vec![
            Ok(races(2)),
            Ok(Vec::new()),
            Err(ScrapeError::Status { status: 503 }),
        ]);
        let refresher = Refresher::new(source, store.clone());

        refresher.refresh_once().await;
        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Empty);
        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Failed);

        assert_eq!(store.current().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_first_refresh_installs_empty_snapshot() {
        let store = Arc::new(SnapshotStore::new());
        let (source, _) = FakeSource::new(vec![Err(ScrapeError::Parse("boom".into()))]);
        let refresher = Refresher::new(source, store.clone());

        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Failed);
        assert!(store.current().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_runs_immediately_and_periodically() {
        let store = Arc::new(SnapshotStore::new());
        let (source, calls) = FakeSource::new(vec![Ok(races(1)), Ok(races(2)), Ok(races(3))]);
        let shutdown = CancellationToken::new();
        let interval = Duration::from_secs(24 * 3600);

        let handle = Refresher::new(source, store.clone()).spawn(interval, shutdown.clone());

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.current().unwrap().len(), 1);

        time::sleep(interval * 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.current().unwrap().len(), 3);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_stops_on_cancel() {
        let store = Arc::new(SnapshotStore::new());
        let (source, calls) = FakeSource::new(vec![Ok(races(1))]);
        let shutdown = CancellationToken::new();

        let handle =
            Refresher::new(source, store).spawn(Duration::from_secs(3600), shutdown.clone());
        time::sleep(Duration::from_secs(1)).await;

        shutdown.cancel();
        handle.await.unwrap();

        time::sleep(Duration::from_secs(10 * 3600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
