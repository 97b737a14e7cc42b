//! Club Budgets API
//!
//! Budgets with their expenses. Responses carry the spent and remaining
//! amounts computed from the expenses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{non_negative, optional, required, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{now, Budget, Expense};
use crate::error::PlatformError;
use crate::repository::BudgetRepository;
use crate::service::{ensure_owner, AuditService, AuthContext};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub name: String,
    /// Free-form season label, e.g. "2024/25"
    pub season: String,
    pub total_cents: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub name: Option<String>,
    pub season: Option<String>,
    pub total_cents: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount_cents: i64,
    pub spent_on: NaiveDate,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent_cents: i64,
    pub remaining_cents: i64,
}

impl BudgetResponse {
    fn new(budget: Budget, spent_cents: i64) -> Self {
        Self {
            remaining_cents: budget.remaining_cents(spent_cents),
            spent_cents,
            budget,
        }
    }
}

#[derive(Clone)]
pub struct BudgetsState {
    pub budget_repo: Arc<BudgetRepository>,
    pub audit_service: Arc<AuditService>,
}

impl BudgetsState {
    async fn owned_budget(&self, ctx: &AuthContext, id: &str) -> Result<Budget, PlatformError> {
        ensure_owner(ctx, self.budget_repo.find_by_id(id).await?, id)
    }

    async fn respond(&self, budget: Budget) -> Result<BudgetResponse, PlatformError> {
        let spent = self.budget_repo.spent_cents(&budget.id).await?;
        Ok(BudgetResponse::new(budget, spent))
    }
}

/// Create a budget
#[utoipa::path(
    post,
    path = "/api/club/budgets",
    tag = "club",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_budget(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<BudgetResponse>), PlatformError> {
    let budget = Budget::new(
        &auth.0.subject_id,
        required("name", &req.name)?,
        required("season", &req.season)?,
        non_negative("totalCents", req.total_cents)?,
    );
    state.budget_repo.insert(&budget).await?;
    state
        .audit_service
        .log_create(&auth.0, "Budget", &budget.id, format!("Created budget {}", budget.name))
        .await;

    Ok((StatusCode::CREATED, Json(BudgetResponse::new(budget, 0))))
}

/// List own budgets
#[utoipa::path(
    get,
    path = "/api/club/budgets",
    tag = "club",
    responses((status = 200, description = "Budgets", body = Vec<BudgetResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_budgets(
    State(state): State<BudgetsState>,
    auth: Authenticated,
) -> Result<Json<Vec<BudgetResponse>>, PlatformError> {
    let budgets = state.budget_repo.find_by_club(&auth.0.subject_id).await?;
    let mut response = Vec::with_capacity(budgets.len());
    for budget in budgets {
        response.push(state.respond(budget).await?);
    }
    Ok(Json(response))
}

/// Get a budget
#[utoipa::path(
    get,
    path = "/api/club/budgets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget", body = BudgetResponse),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_budget(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BudgetResponse>, PlatformError> {
    let budget = state.owned_budget(&auth.0, &id).await?;
    Ok(Json(state.respond(budget).await?))
}

/// Update a budget
#[utoipa::path(
    put,
    path = "/api/club/budgets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Budget ID")),
    request_body = UpdateBudgetRequest,
    responses(
        (status = 200, description = "Budget updated", body = BudgetResponse),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_budget(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateBudgetRequest>,
) -> Result<Json<BudgetResponse>, PlatformError> {
    let mut budget = state.owned_budget(&auth.0, &id).await?;

    if let Some(name) = req.name {
        budget.name = required("name", &name)?;
    }
    if let Some(season) = req.season {
        budget.season = required("season", &season)?;
    }
    if let Some(total) = req.total_cents {
        budget.total_cents = non_negative("totalCents", total)?;
    }
    budget.updated_at = now();

    state.budget_repo.update(&budget).await?;
    state
        .audit_service
        .log_update(&auth.0, "Budget", &budget.id, format!("Updated budget {}", budget.name))
        .await;

    Ok(Json(state.respond(budget).await?))
}

/// Delete a budget and its expenses
#[utoipa::path(
    delete,
    path = "/api/club/budgets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Budget ID")),
    responses(
        (status = 204, description = "Budget deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_budget(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let budget = state.owned_budget(&auth.0, &id).await?;
    state.budget_repo.delete(&budget.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "Budget", &budget.id, format!("Deleted budget {}", budget.name))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Record an expense against a budget
#[utoipa::path(
    post,
    path = "/api/club/budgets/{id}/expenses",
    tag = "club",
    params(("id" = String, Path, description = "Budget ID")),
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_expense(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), PlatformError> {
    let budget = state.owned_budget(&auth.0, &id).await?;

    let mut expense = Expense::new(
        &budget.id,
        required("description", &req.description)?,
        non_negative("amountCents", req.amount_cents)?,
        req.spent_on,
    );
    if let Some(category) = optional(req.category) {
        expense = expense.with_category(category);
    }

    state.budget_repo.insert_expense(&expense).await?;
    state
        .audit_service
        .log_create(&auth.0, "Expense", &expense.id, format!("Expense recorded on budget {}", budget.name))
        .await;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// List the expenses of a budget
#[utoipa::path(
    get,
    path = "/api/club/budgets/{id}/expenses",
    tag = "club",
    params(("id" = String, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Expenses", body = Vec<Expense>),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_expenses(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<Expense>>, PlatformError> {
    let budget = state.owned_budget(&auth.0, &id).await?;
    Ok(Json(state.budget_repo.find_expenses(&budget.id).await?))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/club/budgets/{id}/expenses/{expense_id}",
    tag = "club",
    params(
        ("id" = String, Path, description = "Budget ID"),
        ("expense_id" = String, Path, description = "Expense ID")
    ),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Budget or expense not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_expense(
    State(state): State<BudgetsState>,
    auth: Authenticated,
    Path((id, expense_id)): Path<(String, String)>,
) -> Result<StatusCode, PlatformError> {
    let budget = state.owned_budget(&auth.0, &id).await?;
    let expense = state
        .budget_repo
        .find_expense(&expense_id)
        .await?
        .filter(|e| e.budget_id == budget.id)
        .ok_or_else(|| PlatformError::not_found("Expense", &expense_id))?;

    state.budget_repo.delete_expense(&expense.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "Expense", &expense.id, format!("Expense removed from budget {}", budget.name))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn budgets_router(state: BudgetsState) -> Router {
    Router::new()
        .route("/", post(create_budget).get(list_budgets))
        .route("/:id", get(get_budget).put(update_budget).delete(delete_budget))
        .route("/:id/expenses", post(create_expense).get(list_expenses))
        .route("/:id/expenses/:expense_id", delete(delete_expense))
        .with_state(state)
}
