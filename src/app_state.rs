//! Shared application state for HTTP and WebSocket handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::postgres::PostgresStore;
use crate::service::{MetricsAggregator, NotificationService, TrackingService};

/// State threaded through every axum handler.
///
/// Cheap to clone: everything inside is behind an `Arc` or is itself a
/// handle.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tracking ingest pipeline.
    pub tracking: Arc<TrackingService<PostgresStore>>,
    /// Notification catalog and targeting flow.
    pub notifications: Arc<NotificationService<PostgresStore>>,
    /// Live metrics snapshot.
    pub metrics: Arc<MetricsAggregator>,
    /// Change feed, subscribed to by WebSocket connections.
    pub event_bus: EventBus,
    /// Direct storage access for handlers that read settings.
    pub store: Arc<PostgresStore>,
}
