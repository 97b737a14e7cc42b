//! Auth API Endpoints
//!
//! - POST /api/auth/login - Password login, returns a bearer token
//! - POST /api/auth/register/club - Self-service club sign-up
//! - POST /api/auth/register/sponsor - Self-service sponsor sign-up
//! - GET /api/auth/me - Current account and profile

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::api::common::{optional, required, AccountResponse, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{Account, Club, PartyRole, Sponsor};
use crate::error::PlatformError;
use crate::repository::AccountRepository;
use crate::service::{AuditService, AuthService, PasswordService};

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Seconds until the token expires
    pub expires_in: i64,

    pub role: PartyRole,

    /// Account id, also the club or sponsor profile id
    pub subject_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClubRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub sport: String,
    pub city: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSponsorRequest {
    pub username: String,
    pub password: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubRegistrationResponse {
    pub account: AccountResponse,
    pub club: Club,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SponsorRegistrationResponse {
    pub account: AccountResponse,
    pub sponsor: Sponsor,
}

/// Current account info
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub account: AccountResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<Club>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<Sponsor>,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid credentials or deactivated account")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    let username = required("username", &req.username)?;

    let account = match state.account_repo.find_by_username(&username).await? {
        Some(account) if state.password_service.verify(&req.password, &account.password_hash)? => account,
        _ => {
            warn!(username = %username, "Failed login attempt");
            state.audit_service.log_login(&username, None).await;
            return Err(PlatformError::InvalidCredentials);
        }
    };

    if !account.active {
        warn!(account_id = %account.id, "Login attempt on deactivated account");
        return Err(PlatformError::unauthorized("Account is deactivated"));
    }

    let issued = state.auth_service.issue_token(&account)?;
    state
        .audit_service
        .log_login(&username, Some((&account.id, account.role)))
        .await;
    info!(account_id = %account.id, role = %account.role, "Login successful");

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        role: account.role,
        subject_id: account.id,
    }))
}

/// Register a club account
#[utoipa::path(
    post,
    path = "/api/auth/register/club",
    tag = "auth",
    request_body = RegisterClubRequest,
    responses(
        (status = 201, description = "Club registered", body = ClubRegistrationResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register_club(
    State(state): State<AuthApiState>,
    JsonBody(req): JsonBody<RegisterClubRequest>,
) -> Result<(StatusCode, Json<ClubRegistrationResponse>), PlatformError> {
    let account = new_account(
        &state.account_repo,
        &state.password_service,
        &req.username,
        &req.password,
        PartyRole::Club,
    )
    .await?;

    let mut club = Club::new(&account.id, required("name", &req.name)?, required("sport", &req.sport)?);
    club.city = optional(req.city);
    club.description = optional(req.description);
    club.contact_email = optional(req.contact_email);

    state.account_repo.insert_club_account(&account, &club).await?;
    info!(account_id = %account.id, club = %club.name, "Club registered");

    Ok((
        StatusCode::CREATED,
        Json(ClubRegistrationResponse {
            account: account.into(),
            club,
        }),
    ))
}

/// Register a sponsor account
#[utoipa::path(
    post,
    path = "/api/auth/register/sponsor",
    tag = "auth",
    request_body = RegisterSponsorRequest,
    responses(
        (status = 201, description = "Sponsor registered", body = SponsorRegistrationResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register_sponsor(
    State(state): State<AuthApiState>,
    JsonBody(req): JsonBody<RegisterSponsorRequest>,
) -> Result<(StatusCode, Json<SponsorRegistrationResponse>), PlatformError> {
    let account = new_account(
        &state.account_repo,
        &state.password_service,
        &req.username,
        &req.password,
        PartyRole::Sponsor,
    )
    .await?;

    let mut sponsor = Sponsor::new(&account.id, required("companyName", &req.company_name)?);
    sponsor.industry = optional(req.industry);
    sponsor.website = optional(req.website);
    sponsor.contact_email = optional(req.contact_email);

    state.account_repo.insert_sponsor_account(&account, &sponsor).await?;
    info!(account_id = %account.id, company = %sponsor.company_name, "Sponsor registered");

    Ok((
        StatusCode::CREATED,
        Json(SponsorRegistrationResponse {
            account: account.into(),
            sponsor,
        }),
    ))
}

/// Current account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AuthApiState>,
    auth: Authenticated,
) -> Result<Json<MeResponse>, PlatformError> {
    let ctx = auth.0;
    let account = state
        .account_repo
        .find_by_id(&ctx.subject_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Account", &ctx.subject_id))?;

    let (club, sponsor) = match account.role {
        PartyRole::Club => (state.account_repo.find_club(&account.id).await?, None),
        PartyRole::Sponsor => (None, state.account_repo.find_sponsor(&account.id).await?),
        PartyRole::Admin => (None, None),
    };

    Ok(Json(MeResponse {
        account: account.into(),
        club,
        sponsor,
    }))
}

/// Validate credentials and build an unsaved account.
pub(crate) async fn new_account(
    account_repo: &AccountRepository,
    password_service: &PasswordService,
    username: &str,
    password: &str,
    role: PartyRole,
) -> Result<Account, PlatformError> {
    let username = required("username", username)?;
    if account_repo.exists_by_username(&username).await? {
        return Err(PlatformError::duplicate("Account", "username", &username));
    }
    let password_hash = password_service.hash_new(password)?;
    Ok(Account::new(username, password_hash, role))
}

pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register/club", post(register_club))
        .route("/register/sponsor", post(register_sponsor))
        .route("/me", get(me))
        .with_state(state)
}
