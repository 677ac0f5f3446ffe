//! Metrics handlers for the operator dashboard.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::MetricsSnapshotResponse;
use crate::app_state::AppState;

/// `GET /metrics/snapshot` — Current metrics snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/snapshot",
    tag = "Metrics",
    summary = "Current metrics snapshot",
    description = "Returns the live aggregate: total views, total clicks, active sessions, and the ten most recent activity entries.",
    responses(
        (status = 200, description = "Current snapshot", body = MetricsSnapshotResponse),
    )
)]
pub async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot().await;
    Json(MetricsSnapshotResponse::from(snapshot))
}

/// Metrics routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics/snapshot", get(metrics_snapshot))
}
