//! Realtime metrics aggregator.
//!
//! Seeds a [`MetricsSnapshot`] from one batch of read-only queries, then
//! folds streamed [`ChangeEvent`]s into it on a background task. The task
//! is owned by an [`AggregatorHandle`] and aborted when the handle drops,
//! so no fold runs after logical teardown.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use crate::domain::metrics::RECENT_ACTIVITY_LIMIT;
use crate::domain::{EventBus, MetricsSnapshot};
use crate::error::GatewayError;
use crate::persistence::Store;

/// Holds the live snapshot and applies the change-event fold.
///
/// All mutation goes through the single consumer task, so readers only
/// ever observe complete snapshots.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    snapshot: RwLock<MetricsSnapshot>,
}

impl MetricsAggregator {
    /// Creates an aggregator with a zero-value snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the snapshot from current storage totals.
    ///
    /// `active_window` is the trailing window for the active-session
    /// count. If any seed query fails, the snapshot keeps its zero-value
    /// defaults and the error is logged; there is no automatic retry.
    pub async fn seed<S: Store>(&self, store: &S, active_window: Duration) {
        match Self::load_seed(store, active_window).await {
            Ok(seeded) => {
                *self.snapshot.write().await = seeded;
            }
            Err(error) => {
                tracing::error!(%error, "metrics seed failed, keeping zero-value snapshot");
            }
        }
    }

    async fn load_seed<S: Store>(
        store: &S,
        active_window: Duration,
    ) -> Result<MetricsSnapshot, GatewayError> {
        let total_views = store.total_page_views().await?;
        let total_clicks = store.total_clicks().await?;
        let active_users = store.active_sessions_since(Utc::now() - active_window).await?;
        let recent_activities = store
            .recent_activities(RECENT_ACTIVITY_LIMIT as i64)
            .await?;

        Ok(MetricsSnapshot {
            total_views,
            total_clicks,
            active_users,
            recent_activities,
        })
    }

    /// Spawns the fold task consuming the change feed.
    ///
    /// The subscription is created before this returns, so events
    /// published from then on are never missed. Dropping the returned
    /// handle aborts the task and releases the subscription.
    #[must_use]
    pub fn spawn(aggregator: Arc<Self>, bus: &EventBus) -> AggregatorHandle {
        let mut rx = bus.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let mut snapshot = aggregator.snapshot.write().await;
                        *snapshot = snapshot.apply(&event);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "metrics aggregator lagged behind change feed");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("metrics aggregator stopped");
        });
        AggregatorHandle { task }
    }

    /// Returns a copy of the current snapshot.
    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot.read().await.clone()
    }
}

/// Owns the aggregator's consumer task; aborts it on drop.
#[derive(Debug)]
pub struct AggregatorHandle {
    task: JoinHandle<()>,
}

impl Drop for AggregatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ChangeEvent, SessionId};
    use crate::persistence::memory::MemoryStore;
    use std::time::Duration as StdDuration;

    async fn wait_for<F, Fut>(mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..100 {
            if check().await {
                return;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    fn view_event(page: &str) -> ChangeEvent {
        ChangeEvent::ViewRecorded {
            entry_id: uuid::Uuid::new_v4(),
            session_id: SessionId::new(),
            page: page.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn seed_loads_totals_from_store() {
        let store = MemoryStore::new();
        let session = SessionId::new();
        let _ = store
            .insert_page_view(session, "/", None, Utc::now())
            .await;
        let _ = store
            .insert_page_view(session, "/bonuses", None, Utc::now())
            .await;
        let _ = store.bump_click_counter("casino-royal", 5).await;

        let aggregator = MetricsAggregator::new();
        aggregator.seed(&store, Duration::minutes(5)).await;

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.total_views, 2);
        assert_eq!(snapshot.total_clicks, 5);
        assert_eq!(snapshot.active_users, 1);
    }

    #[tokio::test]
    async fn seed_failure_keeps_zero_value_snapshot() {
        let store = MemoryStore::with_failing_reads();

        let aggregator = MetricsAggregator::new();
        aggregator.seed(&store, Duration::minutes(5)).await;

        assert_eq!(aggregator.snapshot().await, MetricsSnapshot::default());
    }

    #[tokio::test]
    async fn lagged_receiver_keeps_folding() {
        // Capacity 2 and a current-thread runtime: the fold task cannot
        // run while we publish, so most of the burst is overwritten and
        // the receiver wakes up lagged.
        let bus = EventBus::new(2);
        let aggregator = Arc::new(MetricsAggregator::new());
        let _handle = MetricsAggregator::spawn(Arc::clone(&aggregator), &bus);

        for i in 0..64 {
            bus.publish(view_event(&format!("/burst-{i}")));
        }
        wait_for(|| async { aggregator.snapshot().await.total_views == 2 }).await;

        bus.publish(view_event("/after-lag"));
        wait_for(|| async { aggregator.snapshot().await.total_views == 3 }).await;

        let snapshot = aggregator.snapshot().await;
        assert_eq!(
            snapshot.recent_activities.first().map(|e| e.details.as_str()),
            Some("/after-lag")
        );
    }

    #[tokio::test]
    async fn streamed_events_advance_the_snapshot() {
        let bus = EventBus::new(100);
        let aggregator = Arc::new(MetricsAggregator::new());
        let _handle = MetricsAggregator::spawn(Arc::clone(&aggregator), &bus);

        bus.publish(view_event("/"));
        bus.publish(view_event("/reviews"));
        bus.publish(ChangeEvent::ClickCounterUpdated {
            entry_id: uuid::Uuid::new_v4(),
            target: "casino-royal".to_string(),
            old_value: 0,
            new_value: 4,
            timestamp: Utc::now(),
        });

        wait_for(|| async {
            let s = aggregator.snapshot().await;
            s.total_views == 2 && s.total_clicks == 4
        })
        .await;

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.recent_activities.len(), 3);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_fold() {
        let bus = EventBus::new(100);
        let aggregator = Arc::new(MetricsAggregator::new());
        let handle = MetricsAggregator::spawn(Arc::clone(&aggregator), &bus);

        bus.publish(view_event("/"));
        wait_for(|| async { aggregator.snapshot().await.total_views == 1 }).await;

        drop(handle);
        // Give the abort a moment to land, then verify no further folds.
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        bus.publish(view_event("/late"));
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert_eq!(aggregator.snapshot().await.total_views, 1);
    }
}
