//! Invoices API
//!
//! Clubs issue invoices to sponsors. Numbers are assigned on creation as
//! `PP-{YYYY}-{NNNN}`, counting per year of the issue date.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::api::common::{non_negative, optional, required, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{next_invoice_number, now, Invoice, InvoiceStatus};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, ContractRepository, InvoiceRepository};
use crate::service::{ensure_owner, AuditService, AuthContext, NotificationService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub sponsor_id: String,
    pub contract_id: Option<String>,
    pub amount_cents: i64,
    /// Defaults to today
    pub issue_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Clone)]
pub struct InvoicesState {
    pub invoice_repo: Arc<InvoiceRepository>,
    pub contract_repo: Arc<ContractRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
    pub notification_service: Arc<NotificationService>,
}

impl InvoicesState {
    async fn owned_invoice(&self, ctx: &AuthContext, id: &str) -> Result<Invoice, PlatformError> {
        ensure_owner(ctx, self.invoice_repo.find_by_id(id).await?, id)
    }
}

/// Issue an invoice
#[utoipa::path(
    post,
    path = "/api/club/invoices",
    tag = "club",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created as draft", body = Invoice),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Sponsor or contract not found"),
        (status = 409, description = "Invoice number taken concurrently")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_invoice(
    State(state): State<InvoicesState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), PlatformError> {
    let sponsor_id = required("sponsorId", &req.sponsor_id)?;
    let amount_cents = non_negative("amountCents", req.amount_cents)?;
    let issue_date = req.issue_date.unwrap_or_else(|| Utc::now().date_naive());
    if req.due_date < issue_date {
        return Err(PlatformError::validation("dueDate must not be before issueDate"));
    }

    if state.account_repo.find_sponsor(&sponsor_id).await?.is_none() {
        return Err(PlatformError::not_found("Sponsor", &sponsor_id));
    }

    let contract_id = optional(req.contract_id);
    if let Some(contract_id) = &contract_id {
        let contract = ensure_owner(&auth.0, state.contract_repo.find_by_id(contract_id).await?, contract_id)?;
        if contract.sponsor_id != sponsor_id {
            return Err(PlatformError::validation("Contract belongs to a different sponsor"));
        }
    }

    let year = issue_date.year();
    let existing = state.invoice_repo.numbers_for_year(year).await?;
    let number = next_invoice_number(year, existing.iter().map(String::as_str));

    let mut invoice = Invoice::new(
        &auth.0.subject_id,
        sponsor_id,
        number,
        amount_cents,
        issue_date,
        req.due_date,
    );
    invoice.contract_id = contract_id;
    invoice.notes = optional(req.notes);

    state.invoice_repo.insert(&invoice).await?;
    state
        .audit_service
        .log_create(&auth.0, "Invoice", &invoice.id, format!("Issued invoice {}", invoice.invoice_number))
        .await;
    info!(invoice_id = %invoice.id, number = %invoice.invoice_number, "Invoice created");

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// List own invoices
#[utoipa::path(
    get,
    path = "/api/club/invoices",
    tag = "club",
    responses((status = 200, description = "Invoices", body = Vec<Invoice>)),
    security(("bearer_auth" = []))
)]
pub async fn list_club_invoices(
    State(state): State<InvoicesState>,
    auth: Authenticated,
) -> Result<Json<Vec<Invoice>>, PlatformError> {
    Ok(Json(state.invoice_repo.find_by_club(&auth.0.subject_id).await?))
}

/// Get an own invoice
#[utoipa::path(
    get,
    path = "/api/club/invoices/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_club_invoice(
    State(state): State<InvoicesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, PlatformError> {
    Ok(Json(state.owned_invoice(&auth.0, &id).await?))
}

/// Move an invoice along its status lifecycle
#[utoipa::path(
    put,
    path = "/api/club/invoices/{id}/status",
    tag = "club",
    params(("id" = String, Path, description = "Invoice ID")),
    request_body = InvoiceStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Invoice),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_invoice_status(
    State(state): State<InvoicesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<InvoiceStatusRequest>,
) -> Result<Json<Invoice>, PlatformError> {
    let mut invoice = state.owned_invoice(&auth.0, &id).await?;
    if !invoice.status.can_transition_to(req.status) {
        return Err(PlatformError::conflict(format!(
            "Invoice cannot move from {} to {}",
            invoice.status, req.status
        )));
    }

    invoice.status = req.status;
    invoice.updated_at = now();
    state.invoice_repo.update_status(&invoice).await?;
    state
        .audit_service
        .log_status_changed(&auth.0, "Invoice", &invoice.id, invoice.status.as_str())
        .await;

    if invoice.status == InvoiceStatus::Sent {
        state.notification_service.invoice_sent(&invoice).await;
    }

    Ok(Json(invoice))
}

/// Invoices addressed to the calling sponsor
#[utoipa::path(
    get,
    path = "/api/sponsor/invoices",
    tag = "sponsor",
    responses((status = 200, description = "Invoices", body = Vec<Invoice>)),
    security(("bearer_auth" = []))
)]
pub async fn list_sponsor_invoices(
    State(state): State<InvoicesState>,
    auth: Authenticated,
) -> Result<Json<Vec<Invoice>>, PlatformError> {
    Ok(Json(state.invoice_repo.find_visible_to_sponsor(&auth.0.subject_id).await?))
}

/// Get an invoice addressed to the calling sponsor
#[utoipa::path(
    get,
    path = "/api/sponsor/invoices/{id}",
    tag = "sponsor",
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 403, description = "Addressed to another sponsor"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sponsor_invoice(
    State(state): State<InvoicesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, PlatformError> {
    let invoice = state
        .invoice_repo
        .find_by_id(&id)
        .await?
        .filter(|i| i.status != InvoiceStatus::Draft)
        .ok_or_else(|| PlatformError::not_found("Invoice", &id))?;

    if invoice.sponsor_id != auth.0.subject_id {
        return Err(PlatformError::forbidden(format!(
            "Invoice {} is addressed to another sponsor",
            invoice.id
        )));
    }
    Ok(Json(invoice))
}

pub fn club_invoices_router(state: InvoicesState) -> Router {
    Router::new()
        .route("/", post(create_invoice).get(list_club_invoices))
        .route("/:id", get(get_club_invoice))
        .route("/:id/status", put(update_invoice_status))
        .with_state(state)
}

pub fn sponsor_invoices_router(state: InvoicesState) -> Router {
    Router::new()
        .route("/", get(list_sponsor_invoices))
        .route("/:id", get(get_sponsor_invoice))
        .with_state(state)
}
