//! Notifications API

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::api::common::QueryParams;
use crate::api::middleware::Authenticated;
use crate::domain::{now, Notification};
use crate::error::PlatformError;
use crate::repository::NotificationRepository;
use crate::service::ensure_owner;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Only unread notifications when true
    #[serde(default)]
    pub unread: bool,
}

#[derive(Clone)]
pub struct NotificationsState {
    pub notification_repo: Arc<NotificationRepository>,
}

/// Own notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(NotificationQuery),
    responses((status = 200, description = "Notifications", body = Vec<Notification>)),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    QueryParams(query): QueryParams<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, PlatformError> {
    let notifications = state
        .notification_repo
        .find_by_account(&auth.0.subject_id, query.unread)
        .await?;
    Ok(Json(notifications))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 403, description = "Belongs to another account"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Notification>, PlatformError> {
    let mut notification = ensure_owner(&auth.0, state.notification_repo.find_by_id(&id).await?, &id)?;

    if notification.read_at.is_none() {
        let now = now();
        state.notification_repo.mark_read(&notification.id, now).await?;
        notification.read_at = Some(now);
    }
    Ok(Json(notification))
}

pub fn notifications_router(state: NotificationsState) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", put(mark_notification_read))
        .with_state(state)
}
