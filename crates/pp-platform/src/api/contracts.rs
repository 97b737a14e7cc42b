//! Contracts API
//!
//! Club side: draft, edit, list and send contracts.
//! Sponsor side: read contracts addressed to them.
//! Public side: view and sign through the sign token, no bearer token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::api::common::{date_order, non_negative, optional, required, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{now, Contract, ContractStatus};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, ContractRepository};
use crate::service::{ensure_owner, AuditService, AuthContext, NotificationService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    pub sponsor_id: String,
    pub title: String,
    pub terms: Option<String>,
    pub value_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractRequest {
    pub title: Option<String>,
    pub terms: Option<String>,
    pub value_cents: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignContractRequest {
    pub signer_name: String,
}

/// What a sign-link holder may see; never carries the token itself.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicContractView {
    pub id: String,
    pub club_name: Option<String>,
    pub sponsor_name: Option<String>,
    pub title: String,
    pub terms: Option<String>,
    pub value_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    pub signed_by: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ContractsState {
    pub contract_repo: Arc<ContractRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
    pub notification_service: Arc<NotificationService>,
}

impl ContractsState {
    async fn owned_contract(&self, ctx: &AuthContext, id: &str) -> Result<Contract, PlatformError> {
        ensure_owner(ctx, self.contract_repo.find_by_id(id).await?, id)
    }

    async fn by_token(&self, token: &str) -> Result<Contract, PlatformError> {
        self.contract_repo
            .find_by_sign_token(token)
            .await?
            .ok_or_else(|| PlatformError::not_found("Contract", "sign token"))
    }

    async fn public_view(&self, contract: Contract) -> Result<PublicContractView, PlatformError> {
        let club_name = self.account_repo.find_club(&contract.club_id).await?.map(|c| c.name);
        let sponsor_name = self
            .account_repo
            .find_sponsor(&contract.sponsor_id)
            .await?
            .map(|s| s.company_name);

        Ok(PublicContractView {
            id: contract.id,
            club_name,
            sponsor_name,
            title: contract.title,
            terms: contract.terms,
            value_cents: contract.value_cents,
            start_date: contract.start_date,
            end_date: contract.end_date,
            status: contract.status,
            signed_by: contract.signed_by,
            signed_at: contract.signed_at,
        })
    }
}

// Club endpoints

/// Draft a contract for a sponsor
#[utoipa::path(
    post,
    path = "/api/club/contracts",
    tag = "club",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract drafted", body = Contract),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Sponsor not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_contract(
    State(state): State<ContractsState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateContractRequest>,
) -> Result<(StatusCode, Json<Contract>), PlatformError> {
    let sponsor_id = required("sponsorId", &req.sponsor_id)?;
    let title = required("title", &req.title)?;
    let value_cents = non_negative("valueCents", req.value_cents)?;
    date_order(req.start_date, req.end_date)?;

    if state.account_repo.find_sponsor(&sponsor_id).await?.is_none() {
        return Err(PlatformError::not_found("Sponsor", &sponsor_id));
    }

    let mut contract = Contract::new(
        &auth.0.subject_id,
        sponsor_id,
        title,
        value_cents,
        req.start_date,
        req.end_date,
    );
    if let Some(terms) = optional(req.terms) {
        contract = contract.with_terms(terms);
    }

    state.contract_repo.insert(&contract).await?;
    state
        .audit_service
        .log_create(&auth.0, "Contract", &contract.id, format!("Drafted contract {}", contract.title))
        .await;

    Ok((StatusCode::CREATED, Json(contract)))
}

/// List own contracts
#[utoipa::path(
    get,
    path = "/api/club/contracts",
    tag = "club",
    responses((status = 200, description = "Contracts", body = Vec<Contract>)),
    security(("bearer_auth" = []))
)]
pub async fn list_club_contracts(
    State(state): State<ContractsState>,
    auth: Authenticated,
) -> Result<Json<Vec<Contract>>, PlatformError> {
    Ok(Json(state.contract_repo.find_by_club(&auth.0.subject_id).await?))
}

/// Get an own contract
#[utoipa::path(
    get,
    path = "/api/club/contracts/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract", body = Contract),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Contract not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_club_contract(
    State(state): State<ContractsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Contract>, PlatformError> {
    Ok(Json(state.owned_contract(&auth.0, &id).await?))
}

/// Edit a draft contract
#[utoipa::path(
    put,
    path = "/api/club/contracts/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Contract ID")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = Contract),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is no longer a draft")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_contract(
    State(state): State<ContractsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateContractRequest>,
) -> Result<Json<Contract>, PlatformError> {
    let mut contract = state.owned_contract(&auth.0, &id).await?;
    if !contract.is_editable() {
        return Err(PlatformError::conflict(format!(
            "Contract is {} and can no longer be edited",
            contract.status
        )));
    }

    if let Some(title) = req.title {
        contract.title = required("title", &title)?;
    }
    if req.terms.is_some() {
        contract.terms = optional(req.terms);
    }
    if let Some(value) = req.value_cents {
        contract.value_cents = non_negative("valueCents", value)?;
    }
    if let Some(start) = req.start_date {
        contract.start_date = start;
    }
    if let Some(end) = req.end_date {
        contract.end_date = end;
    }
    date_order(contract.start_date, contract.end_date)?;
    contract.updated_at = now();

    state.contract_repo.update(&contract).await?;
    state
        .audit_service
        .log_update(&auth.0, "Contract", &contract.id, format!("Updated contract {}", contract.title))
        .await;

    Ok(Json(contract))
}

/// Send a draft to the sponsor for signature
#[utoipa::path(
    post,
    path = "/api/club/contracts/{id}/send",
    tag = "club",
    params(("id" = String, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract sent", body = Contract),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract is not a draft")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_contract(
    State(state): State<ContractsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Contract>, PlatformError> {
    let mut contract = state.owned_contract(&auth.0, &id).await?;
    contract.send()?;

    state.contract_repo.update(&contract).await?;
    state
        .audit_service
        .log_status_changed(&auth.0, "Contract", &contract.id, contract.status.as_str())
        .await;
    state.notification_service.contract_sent(&contract).await;
    info!(contract_id = %contract.id, sponsor_id = %contract.sponsor_id, "Contract sent for signature");

    Ok(Json(contract))
}

// Sponsor endpoints

/// Contracts addressed to the calling sponsor
#[utoipa::path(
    get,
    path = "/api/sponsor/contracts",
    tag = "sponsor",
    responses((status = 200, description = "Contracts", body = Vec<Contract>)),
    security(("bearer_auth" = []))
)]
pub async fn list_sponsor_contracts(
    State(state): State<ContractsState>,
    auth: Authenticated,
) -> Result<Json<Vec<Contract>>, PlatformError> {
    Ok(Json(state.contract_repo.find_visible_to_sponsor(&auth.0.subject_id).await?))
}

/// Get a contract addressed to the calling sponsor
#[utoipa::path(
    get,
    path = "/api/sponsor/contracts/{id}",
    tag = "sponsor",
    params(("id" = String, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract", body = Contract),
        (status = 403, description = "Addressed to another sponsor"),
        (status = 404, description = "Contract not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sponsor_contract(
    State(state): State<ContractsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Contract>, PlatformError> {
    let contract = state
        .contract_repo
        .find_by_id(&id)
        .await?
        .filter(|c| c.status != ContractStatus::Draft)
        .ok_or_else(|| PlatformError::not_found("Contract", &id))?;

    if contract.sponsor_id != auth.0.subject_id {
        return Err(PlatformError::forbidden(format!(
            "Contract {} is addressed to another sponsor",
            contract.id
        )));
    }
    Ok(Json(contract))
}

// Public sign-link endpoints

/// View a contract through its sign link
#[utoipa::path(
    get,
    path = "/api/contracts/sign/{token}",
    tag = "contracts",
    params(("token" = String, Path, description = "Sign token")),
    responses(
        (status = 200, description = "Contract", body = PublicContractView),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn view_by_token(
    State(state): State<ContractsState>,
    Path(token): Path<String>,
) -> Result<Json<PublicContractView>, PlatformError> {
    let mut contract = state.by_token(&token).await?;

    if contract.mark_viewed() {
        state.contract_repo.update(&contract).await?;
        state
            .audit_service
            .log_public_status_changed("Contract", &contract.id, "Contract viewed through sign link")
            .await;
    }

    Ok(Json(state.public_view(contract).await?))
}

/// Sign a contract through its sign link
#[utoipa::path(
    post,
    path = "/api/contracts/sign/{token}",
    tag = "contracts",
    params(("token" = String, Path, description = "Sign token")),
    request_body = SignContractRequest,
    responses(
        (status = 200, description = "Contract signed", body = PublicContractView),
        (status = 400, description = "Signer name missing"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Not awaiting signature")
    )
)]
pub async fn sign_by_token(
    State(state): State<ContractsState>,
    Path(token): Path<String>,
    JsonBody(req): JsonBody<SignContractRequest>,
) -> Result<Json<PublicContractView>, PlatformError> {
    let signer_name = required("signerName", &req.signer_name)?;
    let mut contract = state.by_token(&token).await?;
    contract.sign(signer_name)?;

    state.contract_repo.update(&contract).await?;
    state
        .audit_service
        .log_public_status_changed(
            "Contract",
            &contract.id,
            format!("Contract signed by {}", contract.signed_by.as_deref().unwrap_or_default()),
        )
        .await;
    state.notification_service.contract_signed(&contract).await;
    info!(contract_id = %contract.id, "Contract signed");

    Ok(Json(state.public_view(contract).await?))
}

pub fn club_contracts_router(state: ContractsState) -> Router {
    Router::new()
        .route("/", post(create_contract).get(list_club_contracts))
        .route("/:id", get(get_club_contract).put(update_contract))
        .route("/:id/send", post(send_contract))
        .with_state(state)
}

pub fn sponsor_contracts_router(state: ContractsState) -> Router {
    Router::new()
        .route("/", get(list_sponsor_contracts))
        .route("/:id", get(get_sponsor_contract))
        .with_state(state)
}

pub fn contract_sign_router(state: ContractsState) -> Router {
    Router::new()
        .route("/:token", get(view_by_token).post(sign_by_token))
        .with_state(state)
}
