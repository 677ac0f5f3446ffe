//! Request and response types for the REST API.

pub mod common_dto;
pub mod metrics_dto;
pub mod notification_dto;
pub mod tracking_dto;

pub use common_dto::{PaginationMeta, PaginationParams};
pub use metrics_dto::{ActivityEntryDto, MetricsSnapshotResponse};
pub use notification_dto::{
    ClickNotificationResponse, EngagementRequest, NotificationListResponse, NotificationPayload,
    NotificationResponse, PresentedNotificationDto, SelectNotificationRequest,
    SelectNotificationResponse,
};
pub use tracking_dto::{
    TrackClickRequest, TrackConversionRequest, TrackEventRequest, TrackViewRequest,
};
