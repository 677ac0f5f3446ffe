//! Tracking ingest handlers: view, event, click, conversion.
//!
//! These endpoints always answer `202 Accepted`. A tracking call must
//! never break page rendering for the visitor, so persistence failures
//! are logged and swallowed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    TrackClickRequest, TrackConversionRequest, TrackEventRequest, TrackViewRequest,
};
use crate::app_state::AppState;
use crate::domain::SessionId;

/// `POST /track/view` — Record a page view.
#[utoipa::path(
    post,
    path = "/api/v1/track/view",
    tag = "Tracking",
    summary = "Record a page view",
    description = "Records one page view for a session. Always answers 202; failures are logged server-side.",
    request_body = TrackViewRequest,
    responses(
        (status = 202, description = "Signal accepted"),
    )
)]
pub async fn track_view(
    State(state): State<AppState>,
    Json(req): Json<TrackViewRequest>,
) -> impl IntoResponse {
    let session = SessionId::from_uuid(req.session_id);
    if let Err(error) = state
        .tracking
        .record_view(session, &req.page, req.referrer.as_deref())
        .await
    {
        tracing::warn!(%error, page = %req.page, "failed to record page view");
    }
    StatusCode::ACCEPTED
}

/// `POST /track/event` — Record a generic user event.
#[utoipa::path(
    post,
    path = "/api/v1/track/event",
    tag = "Tracking",
    summary = "Record a user event",
    description = "Records a named user event with optional details. Always answers 202.",
    request_body = TrackEventRequest,
    responses(
        (status = 202, description = "Signal accepted"),
    )
)]
pub async fn track_event(
    State(state): State<AppState>,
    Json(req): Json<TrackEventRequest>,
) -> impl IntoResponse {
    let session = SessionId::from_uuid(req.session_id);
    if let Err(error) = state
        .tracking
        .record_event(session, &req.name, &req.details)
        .await
    {
        tracing::warn!(%error, name = %req.name, "failed to record user event");
    }
    StatusCode::ACCEPTED
}

/// `POST /track/click` — Increment a click counter.
#[utoipa::path(
    post,
    path = "/api/v1/track/click",
    tag = "Tracking",
    summary = "Record a click",
    description = "Increments the click counter for a target by one. Always answers 202.",
    request_body = TrackClickRequest,
    responses(
        (status = 202, description = "Signal accepted"),
    )
)]
pub async fn track_click(
    State(state): State<AppState>,
    Json(req): Json<TrackClickRequest>,
) -> impl IntoResponse {
    if let Err(error) = state.tracking.record_click(&req.target).await {
        tracing::warn!(%error, target = %req.target, "failed to record click");
    }
    StatusCode::ACCEPTED
}

/// `POST /track/conversion` — Record a conversion.
#[utoipa::path(
    post,
    path = "/api/v1/track/conversion",
    tag = "Tracking",
    summary = "Record a conversion",
    description = "Records that a session completed a conversion goal. Always answers 202.",
    request_body = TrackConversionRequest,
    responses(
        (status = 202, description = "Signal accepted"),
    )
)]
pub async fn track_conversion(
    State(state): State<AppState>,
    Json(req): Json<TrackConversionRequest>,
) -> impl IntoResponse {
    let session = SessionId::from_uuid(req.session_id);
    if let Err(error) = state.tracking.record_conversion(session, &req.goal).await {
        tracing::warn!(%error, goal = %req.goal, "failed to record conversion");
    }
    StatusCode::ACCEPTED
}

/// Tracking ingest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/track/view", post(track_view))
        .route("/track/event", post(track_event))
        .route("/track/click", post(track_click))
        .route("/track/conversion", post(track_conversion))
}
