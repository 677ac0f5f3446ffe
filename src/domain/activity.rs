//! Activity feed entries shown on the operator dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ChangeEvent;

/// Kind of activity an entry represents.
///
/// Mirrors the four change-feed streams: page views, click-counter
/// updates, generic user events, and conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A page view was recorded.
    View,
    /// A click counter was incremented.
    Click,
    /// A generic user event was recorded.
    Event,
    /// A conversion was recorded.
    Conversion,
}

impl ActivityKind {
    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::Event => "event",
            Self::Conversion => "conversion",
        }
    }

    /// Parses a kind from its wire string. Returns `None` for unknown input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Self::View),
            "click" => Some(Self::Click),
            "event" => Some(Self::Event),
            "conversion" => Some(Self::Conversion),
            _ => None,
        }
    }
}

/// One entry in the bounded recent-activity list.
///
/// Immutable once created. Entries are built from change events (or read
/// back from the activity table when seeding) so that replaying the same
/// event sequence reproduces the same entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Entry identifier, shared with the change event that produced it.
    pub id: uuid::Uuid,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Time the underlying signal was recorded.
    pub timestamp: DateTime<Utc>,
    /// Short human-readable description.
    pub details: String,
}

impl ActivityEntry {
    /// Builds the entry corresponding to a change event.
    ///
    /// Deterministic: the id and timestamp come from the event itself,
    /// never from the clock at fold time.
    #[must_use]
    pub fn from_change(event: &ChangeEvent) -> Self {
        let details = match event {
            ChangeEvent::ViewRecorded { page, .. } => page.clone(),
            ChangeEvent::EventRecorded { name, details, .. } => {
                if details.is_empty() {
                    name.clone()
                } else {
                    format!("{name}: {details}")
                }
            }
            ChangeEvent::ClickCounterUpdated {
                target,
                old_value,
                new_value,
                ..
            } => format!("{target} +{}", new_value.saturating_sub(*old_value)),
            ChangeEvent::ConversionRecorded { goal, .. } => goal.clone(),
        };

        Self {
            id: event.entry_id(),
            kind: event.kind(),
            timestamp: event.timestamp(),
            details,
        }
    }
}
