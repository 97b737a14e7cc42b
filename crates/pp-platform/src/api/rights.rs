//! Sponsorship Rights API
//!
//! Every create or update re-checks category exclusivity against the
//! club's other rights in the same category.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{date_order, optional, required, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{check_exclusivity, now, Right};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, RightRepository};
use crate::service::{ensure_owner, AuditService, AuthContext};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRightRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub exclusive: bool,
    pub sponsor_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A blank `sponsorId` releases the right.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRightRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub exclusive: Option<bool>,
    pub sponsor_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct RightsState {
    pub right_repo: Arc<RightRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
}

impl RightsState {
    async fn owned_right(&self, ctx: &AuthContext, id: &str) -> Result<Right, PlatformError> {
        ensure_owner(ctx, self.right_repo.find_by_id(id).await?, id)
    }

    async fn ensure_sponsor(&self, sponsor_id: Option<&str>) -> Result<(), PlatformError> {
        if let Some(id) = sponsor_id {
            if self.account_repo.find_sponsor(id).await?.is_none() {
                return Err(PlatformError::not_found("Sponsor", id));
            }
        }
        Ok(())
    }

    async fn ensure_exclusive(&self, candidate: &Right) -> Result<(), PlatformError> {
        let existing = self
            .right_repo
            .find_by_category(&candidate.club_id, &candidate.category)
            .await?;
        check_exclusivity(candidate, &existing)
    }
}

/// Create a right
#[utoipa::path(
    post,
    path = "/api/club/rights",
    tag = "club",
    request_body = CreateRightRequest,
    responses(
        (status = 201, description = "Right created", body = Right),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Sponsor not found"),
        (status = 409, description = "Exclusivity conflict")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_right(
    State(state): State<RightsState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateRightRequest>,
) -> Result<(StatusCode, Json<Right>), PlatformError> {
    date_order(req.start_date, req.end_date)?;

    let mut right = Right::new(
        &auth.0.subject_id,
        required("name", &req.name)?,
        required("category", &req.category)?,
        req.start_date,
        req.end_date,
    );
    right.exclusive = req.exclusive;
    right.sponsor_id = optional(req.sponsor_id);

    state.ensure_sponsor(right.sponsor_id.as_deref()).await?;
    state.ensure_exclusive(&right).await?;

    state.right_repo.insert(&right).await?;
    state
        .audit_service
        .log_create(&auth.0, "Right", &right.id, format!("Created right {}", right.name))
        .await;

    Ok((StatusCode::CREATED, Json(right)))
}

/// List own rights
#[utoipa::path(
    get,
    path = "/api/club/rights",
    tag = "club",
    responses((status = 200, description = "Rights", body = Vec<Right>)),
    security(("bearer_auth" = []))
)]
pub async fn list_rights(
    State(state): State<RightsState>,
    auth: Authenticated,
) -> Result<Json<Vec<Right>>, PlatformError> {
    Ok(Json(state.right_repo.find_by_club(&auth.0.subject_id).await?))
}

/// Get a right
#[utoipa::path(
    get,
    path = "/api/club/rights/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Right ID")),
    responses(
        (status = 200, description = "Right", body = Right),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Right not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_right(
    State(state): State<RightsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Right>, PlatformError> {
    Ok(Json(state.owned_right(&auth.0, &id).await?))
}

/// Update a right
#[utoipa::path(
    put,
    path = "/api/club/rights/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Right ID")),
    request_body = UpdateRightRequest,
    responses(
        (status = 200, description = "Right updated", body = Right),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Right or sponsor not found"),
        (status = 409, description = "Exclusivity conflict")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_right(
    State(state): State<RightsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateRightRequest>,
) -> Result<Json<Right>, PlatformError> {
    let mut right = state.owned_right(&auth.0, &id).await?;

    if let Some(name) = req.name {
        right.name = required("name", &name)?;
    }
    if let Some(category) = req.category {
        right.category = required("category", &category)?;
    }
    if let Some(exclusive) = req.exclusive {
        right.exclusive = exclusive;
    }
    if req.sponsor_id.is_some() {
        right.sponsor_id = optional(req.sponsor_id);
    }
    if let Some(start) = req.start_date {
        right.start_date = start;
    }
    if let Some(end) = req.end_date {
        right.end_date = end;
    }
    date_order(right.start_date, right.end_date)?;
    right.updated_at = now();

    state.ensure_sponsor(right.sponsor_id.as_deref()).await?;
    state.ensure_exclusive(&right).await?;

    state.right_repo.update(&right).await?;
    state
        .audit_service
        .log_update(&auth.0, "Right", &right.id, format!("Updated right {}", right.name))
        .await;

    Ok(Json(right))
}

/// Delete a right
#[utoipa::path(
    delete,
    path = "/api/club/rights/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Right ID")),
    responses(
        (status = 204, description = "Right deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Right not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_right(
    State(state): State<RightsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let right = state.owned_right(&auth.0, &id).await?;
    state.right_repo.delete(&right.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "Right", &right.id, format!("Deleted right {}", right.name))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn rights_router(state: RightsState) -> Router {
    Router::new()
        .route("/", post(create_right).get(list_rights))
        .route("/:id", get(get_right).put(update_right).delete(delete_right))
        .with_state(state)
}
