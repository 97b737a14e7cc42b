//! Marketplace API
//!
//! Clubs list sponsorship opportunities and decide on applications.
//! Sponsors browse open opportunities and apply once per opportunity.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{date_order, non_negative, optional, required, JsonBody, QueryParams};
use crate::api::middleware::Authenticated;
use crate::domain::{now, Application, ApplicationStatus, Opportunity, OpportunityStatus};
use crate::error::PlatformError;
use crate::repository::{ApplicationRepository, OpportunityRepository};
use crate::service::{ensure_owner, AuditService, AuthContext, NotificationService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price_cents: i64,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub status: Option<OpportunityStatus>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideApplicationRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MarketplaceQuery {
    /// Case-insensitive category filter
    pub category: Option<String>,
}

#[derive(Clone)]
pub struct MarketplaceState {
    pub opportunity_repo: Arc<OpportunityRepository>,
    pub application_repo: Arc<ApplicationRepository>,
    pub audit_service: Arc<AuditService>,
    pub notification_service: Arc<NotificationService>,
}

impl MarketplaceState {
    async fn owned_opportunity(&self, ctx: &AuthContext, id: &str) -> Result<Opportunity, PlatformError> {
        ensure_owner(ctx, self.opportunity_repo.find_by_id(id).await?, id)
    }

    async fn open_opportunity(&self, id: &str) -> Result<Opportunity, PlatformError> {
        self.opportunity_repo
            .find_by_id(id)
            .await?
            .filter(Opportunity::is_open)
            .ok_or_else(|| PlatformError::not_found("Opportunity", id))
    }
}

fn availability_order(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<(), PlatformError> {
    match (from, until) {
        (Some(from), Some(until)) => date_order(from, until),
        _ => Ok(()),
    }
}

// Club endpoints

/// List a sponsorship opportunity
#[utoipa::path(
    post,
    path = "/api/club/opportunities",
    tag = "club",
    request_body = CreateOpportunityRequest,
    responses(
        (status = 201, description = "Opportunity listed", body = Opportunity),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_opportunity(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateOpportunityRequest>,
) -> Result<(StatusCode, Json<Opportunity>), PlatformError> {
    availability_order(req.available_from, req.available_until)?;

    let mut opportunity = Opportunity::new(
        &auth.0.subject_id,
        required("title", &req.title)?,
        required("category", &req.category)?,
        non_negative("priceCents", req.price_cents)?,
    );
    opportunity.description = optional(req.description);
    opportunity.available_from = req.available_from;
    opportunity.available_until = req.available_until;

    state.opportunity_repo.insert(&opportunity).await?;
    state
        .audit_service
        .log_create(&auth.0, "Opportunity", &opportunity.id, format!("Listed {}", opportunity.title))
        .await;

    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// List own opportunities, open and closed
#[utoipa::path(
    get,
    path = "/api/club/opportunities",
    tag = "club",
    responses((status = 200, description = "Opportunities", body = Vec<Opportunity>)),
    security(("bearer_auth" = []))
)]
pub async fn list_club_opportunities(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
) -> Result<Json<Vec<Opportunity>>, PlatformError> {
    Ok(Json(state.opportunity_repo.find_by_club(&auth.0.subject_id).await?))
}

/// Get an own opportunity
#[utoipa::path(
    get,
    path = "/api/club/opportunities/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity", body = Opportunity),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Opportunity not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_club_opportunity(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Opportunity>, PlatformError> {
    Ok(Json(state.owned_opportunity(&auth.0, &id).await?))
}

/// Update an opportunity, including opening or closing it
#[utoipa::path(
    put,
    path = "/api/club/opportunities/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Opportunity ID")),
    request_body = UpdateOpportunityRequest,
    responses(
        (status = 200, description = "Opportunity updated", body = Opportunity),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Opportunity not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_opportunity(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateOpportunityRequest>,
) -> Result<Json<Opportunity>, PlatformError> {
    let mut opportunity = state.owned_opportunity(&auth.0, &id).await?;

    if let Some(title) = req.title {
        opportunity.title = required("title", &title)?;
    }
    if req.description.is_some() {
        opportunity.description = optional(req.description);
    }
    if let Some(category) = req.category {
        opportunity.category = required("category", &category)?;
    }
    if let Some(price) = req.price_cents {
        opportunity.price_cents = non_negative("priceCents", price)?;
    }
    if let Some(status) = req.status {
        opportunity.status = status;
    }
    if req.available_from.is_some() {
        opportunity.available_from = req.available_from;
    }
    if req.available_until.is_some() {
        opportunity.available_until = req.available_until;
    }
    availability_order(opportunity.available_from, opportunity.available_until)?;
    opportunity.updated_at = now();

    state.opportunity_repo.update(&opportunity).await?;
    state
        .audit_service
        .log_update(&auth.0, "Opportunity", &opportunity.id, format!("Updated {}", opportunity.title))
        .await;

    Ok(Json(opportunity))
}

/// Delete an opportunity and its applications
#[utoipa::path(
    delete,
    path = "/api/club/opportunities/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Opportunity ID")),
    responses(
        (status = 204, description = "Opportunity deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Opportunity not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_opportunity(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let opportunity = state.owned_opportunity(&auth.0, &id).await?;
    state.opportunity_repo.delete(&opportunity.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "Opportunity", &opportunity.id, format!("Deleted {}", opportunity.title))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Applications received for an own opportunity
#[utoipa::path(
    get,
    path = "/api/club/opportunities/{id}/applications",
    tag = "club",
    params(("id" = String, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Applications", body = Vec<Application>),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Opportunity not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_opportunity_applications(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<Application>>, PlatformError> {
    let opportunity = state.owned_opportunity(&auth.0, &id).await?;
    Ok(Json(state.application_repo.find_by_opportunity(&opportunity.id).await?))
}

/// Accept or reject a pending application
#[utoipa::path(
    put,
    path = "/api/club/opportunities/applications/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Application ID")),
    request_body = DecideApplicationRequest,
    responses(
        (status = 200, description = "Application decided", body = Application),
        (status = 400, description = "Not a decision"),
        (status = 403, description = "Opportunity owned by another club"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Already decided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn decide_application(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<DecideApplicationRequest>,
) -> Result<Json<Application>, PlatformError> {
    let mut application = state
        .application_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Application", &id))?;
    let opportunity = state.owned_opportunity(&auth.0, &application.opportunity_id).await?;

    application.decide(req.status)?;
    state.application_repo.update_status(&application).await?;
    state
        .audit_service
        .log_status_changed(&auth.0, "Application", &application.id, application.status.as_str())
        .await;
    state
        .notification_service
        .application_decided(&opportunity, &application)
        .await;

    Ok(Json(application))
}

// Sponsor endpoints

/// Browse open opportunities
#[utoipa::path(
    get,
    path = "/api/sponsor/marketplace",
    tag = "sponsor",
    params(MarketplaceQuery),
    responses((status = 200, description = "Open opportunities", body = Vec<Opportunity>)),
    security(("bearer_auth" = []))
)]
pub async fn browse_marketplace(
    State(state): State<MarketplaceState>,
    _auth: Authenticated,
    QueryParams(query): QueryParams<MarketplaceQuery>,
) -> Result<Json<Vec<Opportunity>>, PlatformError> {
    let category = optional(query.category);
    Ok(Json(state.opportunity_repo.find_open(category.as_deref()).await?))
}

/// Get an open opportunity
#[utoipa::path(
    get,
    path = "/api/sponsor/marketplace/{id}",
    tag = "sponsor",
    params(("id" = String, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity", body = Opportunity),
        (status = 404, description = "Not found or closed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_marketplace_opportunity(
    State(state): State<MarketplaceState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Opportunity>, PlatformError> {
    Ok(Json(state.open_opportunity(&id).await?))
}

/// Apply to an opportunity
#[utoipa::path(
    post,
    path = "/api/sponsor/marketplace/{id}/apply",
    tag = "sponsor",
    params(("id" = String, Path, description = "Opportunity ID")),
    request_body(content = Option<ApplyRequest>, description = "Optional cover message"),
    responses(
        (status = 201, description = "Application submitted", body = Application),
        (status = 404, description = "Opportunity not found"),
        (status = 409, description = "Closed or already applied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
    Path(id): Path<String>,
    body: Option<JsonBody<ApplyRequest>>,
) -> Result<(StatusCode, Json<Application>), PlatformError> {
    let req = body.map(|JsonBody(req)| req).unwrap_or_default();
    let opportunity = state
        .opportunity_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Opportunity", &id))?;
    if !opportunity.is_open() {
        return Err(PlatformError::conflict(format!(
            "Opportunity {} is closed",
            opportunity.title
        )));
    }

    let sponsor_id = &auth.0.subject_id;
    if state.application_repo.exists(&opportunity.id, sponsor_id).await? {
        return Err(PlatformError::duplicate("Application", "opportunityId", &opportunity.id));
    }

    let mut application = Application::new(&opportunity.id, sponsor_id);
    application.message = optional(req.message);

    state.application_repo.insert(&application).await?;
    state
        .audit_service
        .log_create(&auth.0, "Application", &application.id, format!("Applied to {}", opportunity.title))
        .await;
    state
        .notification_service
        .application_received(&opportunity, &application)
        .await;
    info!(application_id = %application.id, opportunity_id = %opportunity.id, "Application submitted");

    Ok((StatusCode::CREATED, Json(application)))
}

/// Own applications
#[utoipa::path(
    get,
    path = "/api/sponsor/applications",
    tag = "sponsor",
    responses((status = 200, description = "Applications", body = Vec<Application>)),
    security(("bearer_auth" = []))
)]
pub async fn list_sponsor_applications(
    State(state): State<MarketplaceState>,
    auth: Authenticated,
) -> Result<Json<Vec<Application>>, PlatformError> {
    Ok(Json(state.application_repo.find_by_sponsor(&auth.0.subject_id).await?))
}

pub fn club_opportunities_router(state: MarketplaceState) -> Router {
    Router::new()
        .route("/", post(create_opportunity).get(list_club_opportunities))
        .route(
            "/:id",
            get(get_club_opportunity)
                .put(update_opportunity)
                .delete(delete_opportunity),
        )
        .route("/:id/applications", get(list_opportunity_applications))
        .route("/applications/:id", put(decide_application))
        .with_state(state)
}

pub fn sponsor_marketplace_router(state: MarketplaceState) -> Router {
    Router::new()
        .route("/", get(browse_marketplace))
        .route("/:id", get(get_marketplace_opportunity))
        .route("/:id/apply", post(apply))
        .with_state(state)
}

pub fn sponsor_applications_router(state: MarketplaceState) -> Router {
    Router::new()
        .route("/", get(list_sponsor_applications))
        .with_state(state)
}
