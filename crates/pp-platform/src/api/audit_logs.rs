//! Audit Logs API
//!
//! Read-only, filterable view of the audit trail for admins.

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{optional, PaginationParams, QueryParams};
use crate::api::middleware::Authenticated;
use crate::domain::{AuditAction, AuditLog};
use crate::error::PlatformError;
use crate::repository::{AuditLogFilter, AuditLogRepository};

/// Query parameters for the audit trail
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    /// Filter by entity type
    pub entity_type: Option<String>,

    /// Filter by entity ID
    pub entity_id: Option<String>,

    /// Filter by acting account
    pub principal_id: Option<String>,

    /// Filter by action, e.g. `status_changed`
    pub action: Option<String>,

    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub items: Vec<AuditLog>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone)]
pub struct AuditLogsState {
    pub audit_repo: Arc<AuditLogRepository>,
}

/// Search the audit trail, newest first
#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    tag = "admin",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit log page", body = AuditLogPage),
        (status = 400, description = "Unknown action")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AuditLogsState>,
    _auth: Authenticated,
    QueryParams(query): QueryParams<AuditLogQuery>,
) -> Result<Json<AuditLogPage>, PlatformError> {
    let action = optional(query.action)
        .map(|a| a.parse::<AuditAction>())
        .transpose()?;

    let filter = AuditLogFilter {
        entity_type: optional(query.entity_type),
        entity_id: optional(query.entity_id),
        principal_id: optional(query.principal_id),
        action,
    };
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };

    let items = state
        .audit_repo
        .search(&filter, pagination.limit() as i64, pagination.offset() as i64)
        .await?;

    Ok(Json(AuditLogPage {
        items,
        page: pagination.page.max(1),
        limit: pagination.limit(),
    }))
}

pub fn audit_logs_router(state: AuditLogsState) -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .with_state(state)
}
