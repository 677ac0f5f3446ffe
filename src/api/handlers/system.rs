//! System endpoints: health check and the generated sitemap.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::jobs::sitemap::SITEMAP_SETTING_KEY;
use crate::persistence::Store;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /sitemap.xml` — Latest generated sitemap.
///
/// # Errors
///
/// Returns [`GatewayError::SettingNotFound`] if the sitemap job has not
/// produced a sitemap yet.
#[utoipa::path(
    get,
    path = "/sitemap.xml",
    tag = "System",
    summary = "Generated sitemap",
    description = "Returns the sitemap last produced by the background refresh job.",
    responses(
        (status = 200, description = "Sitemap XML", content_type = "application/xml"),
        (status = 404, description = "No sitemap generated yet", body = ErrorResponse),
    )
)]
pub async fn sitemap_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let xml = state
        .store
        .get_setting(SITEMAP_SETTING_KEY)
        .await?
        .ok_or_else(|| GatewayError::SettingNotFound(SITEMAP_SETTING_KEY.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sitemap.xml", get(sitemap_handler))
}
