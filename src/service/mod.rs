//! Service layer: business logic orchestration.
//!
//! [`TrackingService`] persists tracking signals and publishes change
//! events; [`MetricsAggregator`] folds the change feed into the live
//! snapshot; [`NotificationService`] owns campaign CRUD and the
//! select/dismiss/click flow.

pub mod metrics_service;
pub mod notification_service;
pub mod tracking_service;

pub use metrics_service::{AggregatorHandle, MetricsAggregator};
pub use notification_service::NotificationService;
pub use tracking_service::TrackingService;
