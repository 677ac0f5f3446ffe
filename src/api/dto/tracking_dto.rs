//! Request bodies for the tracking ingest endpoints.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body of `POST /api/v1/track/view`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TrackViewRequest {
    /// Visitor session identifier.
    pub session_id: Uuid,
    /// Path of the viewed page.
    pub page: String,
    /// Optional referrer URL.
    pub referrer: Option<String>,
}

/// Body of `POST /api/v1/track/event`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TrackEventRequest {
    /// Visitor session identifier.
    pub session_id: Uuid,
    /// Event name, e.g. `signup_opened`.
    pub name: String,
    /// Optional free-form detail string.
    #[serde(default)]
    pub details: String,
}

/// Body of `POST /api/v1/track/click`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TrackClickRequest {
    /// Click counter target, e.g. a casino slug.
    pub target: String,
}

/// Body of `POST /api/v1/track/conversion`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TrackConversionRequest {
    /// Visitor session identifier.
    pub session_id: Uuid,
    /// Conversion goal name, e.g. `deposit`.
    pub goal: String,
}
