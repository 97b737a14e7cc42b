//! Own-profile endpoints for clubs and sponsors

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{optional, required, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{now, Club, Sponsor};
use crate::error::PlatformError;
use crate::repository::AccountRepository;
use crate::service::AuditService;

/// Absent fields are left unchanged; blank optional fields are cleared.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubProfileRequest {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSponsorProfileRequest {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Clone)]
pub struct ProfilesState {
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Own club profile
#[utoipa::path(
    get,
    path = "/api/club/profile",
    tag = "club",
    responses(
        (status = 200, description = "Club profile", body = Club),
        (status = 404, description = "Profile missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_club_profile(
    State(state): State<ProfilesState>,
    auth: Authenticated,
) -> Result<Json<Club>, PlatformError> {
    let id = &auth.0.subject_id;
    let club = state
        .account_repo
        .find_club(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Club", id))?;
    Ok(Json(club))
}

/// Update own club profile
#[utoipa::path(
    put,
    path = "/api/club/profile",
    tag = "club",
    request_body = UpdateClubProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Club),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_club_profile(
    State(state): State<ProfilesState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<UpdateClubProfileRequest>,
) -> Result<Json<Club>, PlatformError> {
    let id = &auth.0.subject_id;
    let mut club = state
        .account_repo
        .find_club(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Club", id))?;

    if let Some(name) = req.name {
        club.name = required("name", &name)?;
    }
    if let Some(sport) = req.sport {
        club.sport = required("sport", &sport)?;
    }
    if req.city.is_some() {
        club.city = optional(req.city);
    }
    if req.description.is_some() {
        club.description = optional(req.description);
    }
    if req.contact_email.is_some() {
        club.contact_email = optional(req.contact_email);
    }
    club.updated_at = now();

    state.account_repo.update_club(&club).await?;
    state.audit_service.log_update(&auth.0, "Club", &club.id, "Club profile updated").await;

    Ok(Json(club))
}

/// Own sponsor profile
#[utoipa::path(
    get,
    path = "/api/sponsor/profile",
    tag = "sponsor",
    responses(
        (status = 200, description = "Sponsor profile", body = Sponsor),
        (status = 404, description = "Profile missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sponsor_profile(
    State(state): State<ProfilesState>,
    auth: Authenticated,
) -> Result<Json<Sponsor>, PlatformError> {
    let id = &auth.0.subject_id;
    let sponsor = state
        .account_repo
        .find_sponsor(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Sponsor", id))?;
    Ok(Json(sponsor))
}

/// Update own sponsor profile
#[utoipa::path(
    put,
    path = "/api/sponsor/profile",
    tag = "sponsor",
    request_body = UpdateSponsorProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Sponsor),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_sponsor_profile(
    State(state): State<ProfilesState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<UpdateSponsorProfileRequest>,
) -> Result<Json<Sponsor>, PlatformError> {
    let id = &auth.0.subject_id;
    let mut sponsor = state
        .account_repo
        .find_sponsor(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Sponsor", id))?;

    if let Some(company_name) = req.company_name {
        sponsor.company_name = required("companyName", &company_name)?;
    }
    if req.industry.is_some() {
        sponsor.industry = optional(req.industry);
    }
    if req.website.is_some() {
        sponsor.website = optional(req.website);
    }
    if req.contact_email.is_some() {
        sponsor.contact_email = optional(req.contact_email);
    }
    sponsor.updated_at = now();

    state.account_repo.update_sponsor(&sponsor).await?;
    state
        .audit_service
        .log_update(&auth.0, "Sponsor", &sponsor.id, "Sponsor profile updated")
        .await;

    Ok(Json(sponsor))
}

pub fn club_profile_router(state: ProfilesState) -> Router {
    Router::new()
        .route("/", get(get_club_profile).put(update_club_profile))
        .with_state(state)
}

pub fn sponsor_profile_router(state: ProfilesState) -> Router {
    Router::new()
        .route("/", get(get_sponsor_profile).put(update_sponsor_profile))
        .with_state(state)
}
