//! Club Calendar API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{optional, parse_timestamp, required, time_order, JsonBody, QueryParams};
use crate::api::middleware::Authenticated;
use crate::domain::{to_stored_precision, CalendarEvent};
use crate::error::PlatformError;
use crate::repository::CalendarEventRepository;
use crate::service::{ensure_owner, AuditService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: Option<String>,
}

/// RFC 3339 window; events intersecting it are returned.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Clone)]
pub struct CalendarState {
    pub calendar_repo: Arc<CalendarEventRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Add a calendar event
#[utoipa::path(
    post,
    path = "/api/club/calendar",
    tag = "club",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CalendarEvent),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<CalendarState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<CalendarEvent>), PlatformError> {
    let starts_at = to_stored_precision(req.starts_at);
    let ends_at = to_stored_precision(req.ends_at);
    time_order(starts_at, ends_at)?;

    let mut event = CalendarEvent::new(
        &auth.0.subject_id,
        required("title", &req.title)?,
        required("eventType", &req.event_type)?,
        starts_at,
        ends_at,
    );
    event.location = optional(req.location);

    state.calendar_repo.insert(&event).await?;
    state
        .audit_service
        .log_create(&auth.0, "CalendarEvent", &event.id, format!("Scheduled {}", event.title))
        .await;

    Ok((StatusCode::CREATED, Json(event)))
}

/// List own events, optionally within a window
#[utoipa::path(
    get,
    path = "/api/club/calendar",
    tag = "club",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Events", body = Vec<CalendarEvent>),
        (status = 400, description = "Malformed window")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_events(
    State(state): State<CalendarState>,
    auth: Authenticated,
    QueryParams(query): QueryParams<CalendarQuery>,
) -> Result<Json<Vec<CalendarEvent>>, PlatformError> {
    let from = optional(query.from).map(|v| parse_timestamp("from", &v)).transpose()?;
    let to = optional(query.to).map(|v| parse_timestamp("to", &v)).transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(PlatformError::validation("to must not be before from"));
        }
    }

    let events = state
        .calendar_repo
        .find_by_club(&auth.0.subject_id, from, to)
        .await?;
    Ok(Json(events))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/club/calendar/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<CalendarState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let event = ensure_owner(&auth.0, state.calendar_repo.find_by_id(&id).await?, &id)?;
    state.calendar_repo.delete(&event.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "CalendarEvent", &event.id, format!("Removed {}", event.title))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn calendar_router(state: CalendarState) -> Router {
    Router::new()
        .route("/", post(create_event).get(list_events))
        .route("/:id", delete(delete_event))
        .with_state(state)
}
