//! Request and response types for the notification endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    DisplayFrequency, DisplayPages, NotificationDefinition, NotificationDraft, NotificationKind,
};

use super::common_dto::PaginationMeta;

/// Body of `POST /api/v1/notifications` and
/// `PUT /api/v1/notifications/{id}`.
///
/// `display_pages` uses the wire convention where the entry `"all"` means
/// every page.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotificationPayload {
    /// Short headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Visual style.
    pub kind: NotificationKind,
    /// Re-presentation rule.
    pub display_frequency: DisplayFrequency,
    /// Pages the notification may appear on; `"all"` is a wildcard.
    pub display_pages: Vec<String>,
    /// Selection priority; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Optional start of the active window.
    pub starts_at: Option<DateTime<Utc>>,
    /// Optional end of the active window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Optional navigation target for clicks.
    pub link_url: Option<String>,
}

impl NotificationPayload {
    /// Converts the payload into a domain draft.
    #[must_use]
    pub fn into_draft(self) -> NotificationDraft {
        NotificationDraft {
            title: self.title,
            content: self.content,
            kind: self.kind,
            frequency: self.display_frequency,
            pages: DisplayPages::from_wildcard_list(self.display_pages),
            priority: self.priority,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            link_url: self.link_url,
        }
    }
}

/// Full notification representation returned by the admin endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationResponse {
    /// Notification identifier.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Visual style.
    pub kind: NotificationKind,
    /// Re-presentation rule.
    pub display_frequency: DisplayFrequency,
    /// Pages the notification may appear on; `"all"` is a wildcard.
    pub display_pages: Vec<String>,
    /// Selection priority.
    pub priority: i32,
    /// Optional start of the active window.
    pub starts_at: Option<DateTime<Utc>>,
    /// Optional end of the active window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Optional navigation target for clicks.
    pub link_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<NotificationDefinition> for NotificationResponse {
    fn from(definition: NotificationDefinition) -> Self {
        Self {
            id: *definition.id.as_uuid(),
            title: definition.title,
            content: definition.content,
            kind: definition.kind,
            display_frequency: definition.frequency,
            display_pages: definition.pages.to_wildcard_list(),
            priority: definition.priority,
            starts_at: definition.starts_at,
            ends_at: definition.ends_at,
            link_url: definition.link_url,
            created_at: definition.created_at,
        }
    }
}

/// Response of `GET /api/v1/notifications`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationListResponse {
    /// Notifications on this page, in catalog order.
    pub data: Vec<NotificationResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Body of `POST /api/v1/notifications/select`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SelectNotificationRequest {
    /// Visitor session identifier.
    pub session_id: Uuid,
    /// Path of the page being rendered.
    pub page: String,
}

/// The subset of a notification a visitor-facing client needs to render
/// it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresentedNotificationDto {
    /// Notification identifier.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Visual style.
    pub kind: NotificationKind,
    /// Optional navigation target for clicks.
    pub link_url: Option<String>,
}

impl From<NotificationDefinition> for PresentedNotificationDto {
    fn from(definition: NotificationDefinition) -> Self {
        Self {
            id: *definition.id.as_uuid(),
            title: definition.title,
            content: definition.content,
            kind: definition.kind,
            link_url: definition.link_url,
        }
    }
}

/// Response of `POST /api/v1/notifications/select`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SelectNotificationResponse {
    /// The selected notification, or `null` when nothing applies.
    pub notification: Option<PresentedNotificationDto>,
}

/// Body of the dismiss and click engagement endpoints.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EngagementRequest {
    /// Visitor session identifier.
    pub session_id: Uuid,
}

/// Response of `POST /api/v1/notifications/{id}/click`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClickNotificationResponse {
    /// Navigation target, if the notification has one.
    pub link_url: Option<String>,
}
