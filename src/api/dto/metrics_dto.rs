//! Response types for the metrics endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ActivityEntry, ActivityKind, MetricsSnapshot};

/// One activity feed entry as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityEntryDto {
    /// Entry identifier.
    pub id: Uuid,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Time the underlying signal was recorded.
    pub timestamp: DateTime<Utc>,
    /// Short human-readable description.
    pub details: String,
}

impl From<ActivityEntry> for ActivityEntryDto {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            timestamp: entry.timestamp,
            details: entry.details,
        }
    }
}

/// Response of `GET /api/v1/metrics/snapshot`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsSnapshotResponse {
    /// Total recorded page views.
    pub total_views: u64,
    /// Total recorded clicks across all counters.
    pub total_clicks: u64,
    /// Distinct sessions active within the trailing window at seed time.
    pub active_users: u64,
    /// Recent activity, newest first.
    pub recent_activities: Vec<ActivityEntryDto>,
}

impl From<MetricsSnapshot> for MetricsSnapshotResponse {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            total_views: snapshot.total_views,
            total_clicks: snapshot.total_clicks,
            active_users: snapshot.active_users,
            recent_activities: snapshot
                .recent_activities
                .into_iter()
                .map(ActivityEntryDto::from)
                .collect(),
        }
    }
}
