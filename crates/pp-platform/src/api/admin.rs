//! Admin API
//!
//! Party directory, account activation and admin provisioning.
//! Mounted under `/api/admin` behind the admin role gate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::api::auth::new_account;
use crate::api::common::{AccountResponse, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{Club, PartyRole, Sponsor};
use crate::error::PlatformError;
use crate::repository::AccountRepository;
use crate::service::{AuditService, PasswordService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
}

/// Club profile with its account flags
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    pub username: String,
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDetail {
    #[serde(flatten)]
    pub sponsor: Sponsor,
    pub username: String,
    pub active: bool,
}

#[derive(Clone)]
pub struct AdminState {
    pub account_repo: Arc<AccountRepository>,
    pub password_service: Arc<PasswordService>,
    pub audit_service: Arc<AuditService>,
}

/// List all clubs
#[utoipa::path(
    get,
    path = "/api/admin/clubs",
    tag = "admin",
    responses((status = 200, description = "Clubs", body = Vec<Club>)),
    security(("bearer_auth" = []))
)]
pub async fn list_clubs(
    State(state): State<AdminState>,
    _auth: Authenticated,
) -> Result<Json<Vec<Club>>, PlatformError> {
    Ok(Json(state.account_repo.list_clubs().await?))
}

/// Get a club with its account status
#[utoipa::path(
    get,
    path = "/api/admin/clubs/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club", body = ClubDetail),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_club(
    State(state): State<AdminState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ClubDetail>, PlatformError> {
    let club = state
        .account_repo
        .find_club(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Club", &id))?;
    let account = state
        .account_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Account", &id))?;

    Ok(Json(ClubDetail {
        club,
        username: account.username,
        active: account.active,
    }))
}

/// List all sponsors
#[utoipa::path(
    get,
    path = "/api/admin/sponsors",
    tag = "admin",
    responses((status = 200, description = "Sponsors", body = Vec<Sponsor>)),
    security(("bearer_auth" = []))
)]
pub async fn list_sponsors(
    State(state): State<AdminState>,
    _auth: Authenticated,
) -> Result<Json<Vec<Sponsor>>, PlatformError> {
    Ok(Json(state.account_repo.list_sponsors().await?))
}

/// Get a sponsor with its account status
#[utoipa::path(
    get,
    path = "/api/admin/sponsors/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Sponsor ID")),
    responses(
        (status = 200, description = "Sponsor", body = SponsorDetail),
        (status = 404, description = "Sponsor not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sponsor(
    State(state): State<AdminState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SponsorDetail>, PlatformError> {
    let sponsor = state
        .account_repo
        .find_sponsor(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Sponsor", &id))?;
    let account = state
        .account_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Account", &id))?;

    Ok(Json(SponsorDetail {
        sponsor,
        username: account.username,
        active: account.active,
    }))
}

/// Activate or deactivate an account
#[utoipa::path(
    put,
    path = "/api/admin/accounts/{id}/status",
    tag = "admin",
    params(("id" = String, Path, description = "Account ID")),
    request_body = AccountStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = AccountResponse),
        (status = 400, description = "Own account"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_account_status(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AccountStatusRequest>,
) -> Result<Json<AccountResponse>, PlatformError> {
    if id == auth.0.subject_id && !req.active {
        return Err(PlatformError::validation("Admins cannot deactivate their own account"));
    }

    let mut account = state
        .account_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Account", &id))?;

    if req.active {
        account.activate();
    } else {
        account.deactivate();
    }
    state.account_repo.set_active(&account.id, account.active).await?;
    state.audit_service.log_account_status(&auth.0, &account.id, account.active).await;
    info!(account_id = %account.id, active = account.active, "Account status changed");

    Ok(Json(account.into()))
}

/// Create another admin account
#[utoipa::path(
    post,
    path = "/api/admin/admins",
    tag = "admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_admin(
    State(state): State<AdminState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), PlatformError> {
    let account = new_account(
        &state.account_repo,
        &state.password_service,
        &req.username,
        &req.password,
        PartyRole::Admin,
    )
    .await?;

    state.account_repo.insert(&account).await?;
    state
        .audit_service
        .log_create(&auth.0, "Account", &account.id, format!("Admin {} created", account.username))
        .await;

    Ok((StatusCode::CREATED, Json(account.into())))
}

pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/clubs", get(list_clubs))
        .route("/clubs/:id", get(get_club))
        .route("/sponsors", get(list_sponsors))
        .route("/sponsors/:id", get(get_sponsor))
        .route("/accounts/:id/status", put(set_account_status))
        .route("/admins", post(create_admin))
        .with_state(state)
}
