//! Change-feed payloads reflecting tracking-table mutations.
//!
//! Every tracking write publishes a [`ChangeEvent`] through the
//! [`super::EventBus`]. Events are folded into the metrics snapshot and
//! broadcast to WebSocket subscribers. Delivery within one stream follows
//! publish order; no ordering is guaranteed across streams.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::activity::ActivityKind;
use super::ids::SessionId;

/// Change event emitted after every tracking write.
///
/// The `entry_id` doubles as the identifier of the activity entry derived
/// from the event, keeping the fold deterministic under replay.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Emitted when a page view row is inserted.
    ViewRecorded {
        /// Activity entry identifier.
        entry_id: uuid::Uuid,
        /// Session that produced the view.
        session_id: SessionId,
        /// Page path that was viewed.
        page: String,
        /// Time the view was recorded.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a generic user event row is inserted.
    EventRecorded {
        /// Activity entry identifier.
        entry_id: uuid::Uuid,
        /// Session that produced the event.
        session_id: SessionId,
        /// Event name (e.g. `"signup_opened"`).
        name: String,
        /// Free-form event details; may be empty.
        details: String,
        /// Time the event was recorded.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a click counter row is updated, carrying the before and
    /// after values of the counter.
    ClickCounterUpdated {
        /// Activity entry identifier.
        entry_id: uuid::Uuid,
        /// Counter target (e.g. a listing slug).
        target: String,
        /// Counter value before the update.
        old_value: i64,
        /// Counter value after the update.
        new_value: i64,
        /// Time the counter was updated.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a conversion row is inserted.
    ConversionRecorded {
        /// Activity entry identifier.
        entry_id: uuid::Uuid,
        /// Session that converted.
        session_id: SessionId,
        /// Conversion goal name.
        goal: String,
        /// Time the conversion was recorded.
        timestamp: DateTime<Utc>,
    },
}

impl ChangeEvent {
    /// Returns the activity entry identifier carried by this event.
    #[must_use]
    pub const fn entry_id(&self) -> uuid::Uuid {
        match self {
            Self::ViewRecorded { entry_id, .. }
            | Self::EventRecorded { entry_id, .. }
            | Self::ClickCounterUpdated { entry_id, .. }
            | Self::ConversionRecorded { entry_id, .. } => *entry_id,
        }
    }

    /// Returns the time the underlying signal was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ViewRecorded { timestamp, .. }
            | Self::EventRecorded { timestamp, .. }
            | Self::ClickCounterUpdated { timestamp, .. }
            | Self::ConversionRecorded { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the activity kind this event maps to.
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        match self {
            Self::ViewRecorded { .. } => ActivityKind::View,
            Self::EventRecorded { .. } => ActivityKind::Event,
            Self::ClickCounterUpdated { .. } => ActivityKind::Click,
            Self::ConversionRecorded { .. } => ActivityKind::Conversion,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ViewRecorded { .. } => "view_recorded",
            Self::EventRecorded { .. } => "event_recorded",
            Self::ClickCounterUpdated { .. } => "click_counter_updated",
            Self::ConversionRecorded { .. } => "conversion_recorded",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn view_event_kind_and_type() {
        let event = ChangeEvent::ViewRecorded {
            entry_id: uuid::Uuid::new_v4(),
            session_id: SessionId::new(),
            page: "/".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "view_recorded");
        assert_eq!(event.kind(), ActivityKind::View);
    }

    #[test]
    fn click_event_serializes() {
        let event = ChangeEvent::ClickCounterUpdated {
            entry_id: uuid::Uuid::new_v4(),
            target: "casino-royal".to_string(),
            old_value: 10,
            new_value: 12,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("click_counter_updated"));
        assert!(json_str.contains("casino-royal"));
    }

    #[test]
    fn entry_id_accessor() {
        let id = uuid::Uuid::new_v4();
        let event = ChangeEvent::ConversionRecorded {
            entry_id: id,
            session_id: SessionId::new(),
            goal: "deposit".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.entry_id(), id);
        assert_eq!(event.kind(), ActivityKind::Conversion);
    }
}
