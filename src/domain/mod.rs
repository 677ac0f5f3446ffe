//! Domain layer: core types, the change-event bus, metrics fold, and the
//! notification targeting engine.
//!
//! This module contains the server-side domain model: session and
//! notification identity, activity entries, the change feed payloads, the
//! broadcast bus, the pure metrics fold, and notification eligibility
//! evaluation.

pub mod activity;
pub mod catalog;
pub mod change_event;
pub mod event_bus;
pub mod ids;
pub mod metrics;
pub mod notification;

pub use activity::{ActivityEntry, ActivityKind};
pub use catalog::NotificationCatalog;
pub use change_event::ChangeEvent;
pub use event_bus::EventBus;
pub use ids::{NotificationId, SessionId};
pub use metrics::MetricsSnapshot;
pub use notification::{
    DisplayFrequency, DisplayPages, NotificationDefinition, NotificationDraft, NotificationKind,
    ViewRecord, select_notification,
};
