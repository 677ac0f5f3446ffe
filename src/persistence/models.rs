//! Typed database rows and their domain conversions.
//!
//! Enum-valued columns (`kind`, `display_frequency`) are stored as text
//! and parsed here; a row with an unknown value surfaces as a
//! [`GatewayError::PersistenceError`] instead of leaking a loose string
//! into the domain.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    DisplayFrequency, DisplayPages, NotificationDefinition, NotificationId, NotificationKind,
    SessionId, ViewRecord,
};
use crate::error::GatewayError;

/// A row from the `notifications` table.
#[derive(Debug, Clone)]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Kind discriminator (`banner` / `popup` / `modal`).
    pub kind: String,
    /// Frequency discriminator (`always` / `daily` / `session` / `once`).
    pub display_frequency: String,
    /// Page list; the entry `"all"` is the wildcard.
    pub display_pages: Vec<String>,
    /// Selection priority.
    pub priority: i32,
    /// Optional start of the active window.
    pub starts_at: Option<DateTime<Utc>>,
    /// Optional end of the active window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Optional click-through URL.
    pub link_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for NotificationDefinition {
    type Error = GatewayError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&row.kind).ok_or_else(|| {
            GatewayError::PersistenceError(format!(
                "notification {} has unknown kind {:?}",
                row.id, row.kind
            ))
        })?;
        let frequency = DisplayFrequency::parse(&row.display_frequency).ok_or_else(|| {
            GatewayError::PersistenceError(format!(
                "notification {} has unknown frequency {:?}",
                row.id, row.display_frequency
            ))
        })?;

        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            kind,
            frequency,
            pages: DisplayPages::from_wildcard_list(row.display_pages),
            priority: row.priority,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            link_url: row.link_url,
            created_at: row.created_at,
        })
    }
}

/// A row from the `notification_views` table.
#[derive(Debug, Clone)]
pub struct ViewRecordRow {
    /// Presented notification.
    pub notification_id: Uuid,
    /// Session it was presented to.
    pub session_id: Uuid,
    /// Presentation time.
    pub viewed_at: DateTime<Utc>,
    /// Whether the visitor dismissed it.
    pub dismissed: bool,
    /// Whether the visitor clicked it.
    pub clicked: bool,
}

impl From<ViewRecordRow> for ViewRecord {
    fn from(row: ViewRecordRow) -> Self {
        Self {
            notification_id: NotificationId::from_uuid(row.notification_id),
            session_id: SessionId::from_uuid(row.session_id),
            viewed_at: row.viewed_at,
            dismissed: row.dismissed,
            clicked: row.clicked,
        }
    }
}
