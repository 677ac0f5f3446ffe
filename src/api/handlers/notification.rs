//! Notification handlers: admin CRUD plus the visitor-facing
//! select/dismiss/click flow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    ClickNotificationResponse, EngagementRequest, NotificationListResponse, NotificationPayload,
    NotificationResponse, PaginationMeta, PaginationParams, PresentedNotificationDto,
    SelectNotificationRequest, SelectNotificationResponse,
};
use crate::app_state::AppState;
use crate::domain::{NotificationId, SessionId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /notifications` — Create a notification.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] if the write fails.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "Create a notification",
    description = "Creates a notification campaign. In `display_pages` the entry `all` acts as a wildcard covering every page.",
    request_body = NotificationPayload,
    responses(
        (status = 201, description = "Notification created", body = NotificationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_notification(
    State(state): State<AppState>,
    Json(req): Json<NotificationPayload>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.title.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    let created = state.notifications.create(req.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(NotificationResponse::from(created))))
}

/// `GET /notifications` — List notifications with pagination.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "List notifications",
    description = "Returns a paginated list of all configured notifications in catalog order.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated notification list", body = NotificationListResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let (page, per_page) = params.clamped();
    let all = state.notifications.list().await;
    let total = all.len() as u64;

    let start = params.offset();
    let data: Vec<NotificationResponse> = all
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(NotificationResponse::from)
        .collect();

    Json(NotificationListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
        },
    })
}

/// `GET /notifications/:id` — Get one notification.
///
/// # Errors
///
/// Returns [`GatewayError::NotificationNotFound`] if the ID is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/{id}",
    tag = "Notifications",
    summary = "Get a notification",
    description = "Returns the full definition of a single notification.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    responses(
        (status = 200, description = "Notification details", body = NotificationResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let definition = state
        .notifications
        .get(NotificationId::from_uuid(id))
        .await?;
    Ok(Json(NotificationResponse::from(definition)))
}

/// `PUT /notifications/:id` — Update a notification.
///
/// # Errors
///
/// Returns [`GatewayError::NotificationNotFound`] if the ID is unknown.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}",
    tag = "Notifications",
    summary = "Update a notification",
    description = "Replaces all editable fields of a notification. Identity and creation time are preserved.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    request_body = NotificationPayload,
    responses(
        (status = 200, description = "Notification updated", body = NotificationResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn update_notification(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<NotificationPayload>,
) -> Result<impl IntoResponse, GatewayError> {
    let updated = state
        .notifications
        .update(NotificationId::from_uuid(id), req.into_draft())
        .await?;
    Ok(Json(NotificationResponse::from(updated)))
}

/// `DELETE /notifications/:id` — Delete a notification.
///
/// # Errors
///
/// Returns [`GatewayError::NotificationNotFound`] if the ID is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    tag = "Notifications",
    summary = "Delete a notification",
    description = "Removes a notification from the catalog. Existing view records are kept.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .notifications
        .delete(NotificationId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /notifications/select` — Pick a notification for a page.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/select",
    tag = "Notifications",
    summary = "Select a notification to display",
    description = "Evaluates frequency and page rules for the session and returns at most one notification. Selection is recorded as a view.",
    request_body = SelectNotificationRequest,
    responses(
        (status = 200, description = "Selection result, possibly empty", body = SelectNotificationResponse),
    )
)]
pub async fn select_notification(
    State(state): State<AppState>,
    Json(req): Json<SelectNotificationRequest>,
) -> impl IntoResponse {
    let session = SessionId::from_uuid(req.session_id);
    let chosen = state.notifications.select_for_page(session, &req.page).await;
    Json(SelectNotificationResponse {
        notification: chosen.map(PresentedNotificationDto::from),
    })
}

/// `POST /notifications/:id/dismiss` — Dismiss a presented notification.
///
/// # Errors
///
/// Returns [`GatewayError::ViewRecordNotFound`] if the session was never
/// shown this notification.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/dismiss",
    tag = "Notifications",
    summary = "Dismiss a notification",
    description = "Marks the session's latest presentation of this notification as dismissed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    request_body = EngagementRequest,
    responses(
        (status = 204, description = "Dismissal recorded"),
        (status = 404, description = "No presentation to dismiss", body = ErrorResponse),
    )
)]
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<EngagementRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let session = SessionId::from_uuid(req.session_id);
    state
        .notifications
        .dismiss(NotificationId::from_uuid(id), session)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /notifications/:id/click` — Record a click on a notification.
///
/// # Errors
///
/// Returns [`GatewayError::ViewRecordNotFound`] if the session was never
/// shown this notification.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/click",
    tag = "Notifications",
    summary = "Click a notification",
    description = "Marks the session's latest presentation as clicked and returns the notification's link URL.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    request_body = EngagementRequest,
    responses(
        (status = 200, description = "Click recorded", body = ClickNotificationResponse),
        (status = 404, description = "No presentation to click", body = ErrorResponse),
    )
)]
pub async fn click_notification(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<EngagementRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let session = SessionId::from_uuid(req.session_id);
    let link_url = state
        .notifications
        .click(NotificationId::from_uuid(id), session)
        .await?;
    Ok(Json(ClickNotificationResponse { link_url }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(create_notification).get(list_notifications),
        )
        .route("/notifications/select", post(select_notification))
        .route(
            "/notifications/{id}",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
        .route("/notifications/{id}/dismiss", post(dismiss_notification))
        .route("/notifications/{id}/click", post(click_notification))
}
