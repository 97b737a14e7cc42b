//! Router Assembly
//!
//! Wires repositories and services into every resource router and mounts
//! them under their role-gated prefixes.

use axum::{middleware::from_fn_with_state, Extension, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::api::admin::{admin_router, AdminState};
use crate::api::audit_logs::{audit_logs_router, AuditLogsState};
use crate::api::auth::{auth_router, AuthApiState};
use crate::api::budgets::{budgets_router, BudgetsState};
use crate::api::calendar::{calendar_router, CalendarState};
use crate::api::contracts::{
    club_contracts_router, contract_sign_router, sponsor_contracts_router, ContractsState,
};
use crate::api::crm::{notes_router, tags_router, CrmState};
use crate::api::health::health_router;
use crate::api::inventory::{assets_router, bookings_router, InventoryState};
use crate::api::invoices::{club_invoices_router, sponsor_invoices_router, InvoicesState};
use crate::api::marketplace::{
    club_opportunities_router, sponsor_applications_router, sponsor_marketplace_router, MarketplaceState,
};
use crate::api::messages::{messages_router, MessagesState};
use crate::api::middleware::{require_role, AppState};
use crate::api::notifications::{notifications_router, NotificationsState};
use crate::api::openapi::openapi_router;
use crate::api::profiles::{club_profile_router, sponsor_profile_router, ProfilesState};
use crate::api::rights::{rights_router, RightsState};
use crate::domain::{Account, PartyRole};
use crate::error::Result;
use crate::repository::Repositories;
use crate::service::{AuditService, AuthConfig, AuthService, NotificationService, PasswordService};

/// Everything the routers share, built once per process
#[derive(Clone)]
pub struct PlatformServices {
    pub repos: Repositories,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub audit_service: Arc<AuditService>,
    pub notification_service: Arc<NotificationService>,
}

impl PlatformServices {
    pub fn new(pool: &SqlitePool, auth_config: AuthConfig, password_service: PasswordService) -> Self {
        let repos = Repositories::new(pool);
        let audit_service = Arc::new(AuditService::new(repos.audit_logs.clone()));
        let notification_service = Arc::new(NotificationService::new(repos.notifications.clone()));

        Self {
            auth_service: Arc::new(AuthService::new(auth_config)),
            password_service: Arc::new(password_service),
            audit_service,
            notification_service,
            repos,
        }
    }

    /// Create the configured admin account unless one with that username exists.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> Result<bool> {
        if self.repos.accounts.exists_by_username(username).await? {
            return Ok(false);
        }
        let hash = self.password_service.hash_new(password)?;
        let account = Account::new(username, hash, PartyRole::Admin);
        self.repos.accounts.insert(&account).await?;
        info!(account_id = %account.id, username = %account.username, "Bootstrap admin created");
        Ok(true)
    }
}

fn gated(router: Router, role: PartyRole) -> Router {
    router.route_layer(from_fn_with_state(role, require_role))
}

/// Full API router. Callers add transport layers (trace, CORS).
pub fn build_router(services: &PlatformServices) -> Router {
    let repos = &services.repos;
    let audit = services.audit_service.clone();
    let notify = services.notification_service.clone();

    let auth_state = AuthApiState {
        auth_service: services.auth_service.clone(),
        password_service: services.password_service.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
    };
    let admin_state = AdminState {
        account_repo: repos.accounts.clone(),
        password_service: services.password_service.clone(),
        audit_service: audit.clone(),
    };
    let crm_state = CrmState {
        note_repo: repos.notes.clone(),
        tag_repo: repos.tags.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
    };
    let audit_logs_state = AuditLogsState {
        audit_repo: repos.audit_logs.clone(),
    };
    let profiles_state = ProfilesState {
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
    };
    let budgets_state = BudgetsState {
        budget_repo: repos.budgets.clone(),
        audit_service: audit.clone(),
    };
    let contracts_state = ContractsState {
        contract_repo: repos.contracts.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
        notification_service: notify.clone(),
    };
    let invoices_state = InvoicesState {
        invoice_repo: repos.invoices.clone(),
        contract_repo: repos.contracts.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
        notification_service: notify.clone(),
    };
    let marketplace_state = MarketplaceState {
        opportunity_repo: repos.opportunities.clone(),
        application_repo: repos.applications.clone(),
        audit_service: audit.clone(),
        notification_service: notify.clone(),
    };
    let inventory_state = InventoryState {
        asset_repo: repos.assets.clone(),
        booking_repo: repos.bookings.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
    };
    let rights_state = RightsState {
        right_repo: repos.rights.clone(),
        account_repo: repos.accounts.clone(),
        audit_service: audit.clone(),
    };
    let calendar_state = CalendarState {
        calendar_repo: repos.calendar.clone(),
        audit_service: audit,
    };
    let messages_state = MessagesState {
        message_repo: repos.messages.clone(),
        account_repo: repos.accounts.clone(),
        notification_service: notify,
    };
    let notifications_state = NotificationsState {
        notification_repo: repos.notifications.clone(),
    };

    let admin = Router::new()
        .merge(admin_router(admin_state))
        .nest("/notes", notes_router(crm_state.clone()))
        .nest("/tags", tags_router(crm_state))
        .nest("/audit-logs", audit_logs_router(audit_logs_state));

    let club = Router::new()
        .nest("/profile", club_profile_router(profiles_state.clone()))
        .nest("/budgets", budgets_router(budgets_state))
        .nest("/contracts", club_contracts_router(contracts_state.clone()))
        .nest("/invoices", club_invoices_router(invoices_state.clone()))
        .nest("/opportunities", club_opportunities_router(marketplace_state.clone()))
        .nest("/assets", assets_router(inventory_state.clone()))
        .nest("/bookings", bookings_router(inventory_state))
        .nest("/rights", rights_router(rights_state))
        .nest("/calendar", calendar_router(calendar_state));

    let sponsor = Router::new()
        .nest("/profile", sponsor_profile_router(profiles_state))
        .nest("/marketplace", sponsor_marketplace_router(marketplace_state.clone()))
        .nest("/applications", sponsor_applications_router(marketplace_state))
        .nest("/contracts", sponsor_contracts_router(contracts_state.clone()))
        .nest("/invoices", sponsor_invoices_router(invoices_state));

    let app_state = AppState {
        auth_service: services.auth_service.clone(),
    };

    Router::new()
        .nest("/api/health", health_router())
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/contracts/sign", contract_sign_router(contracts_state))
        .nest("/api/messages", messages_router(messages_state))
        .nest("/api/notifications", notifications_router(notifications_state))
        .nest("/api/admin", gated(admin, PartyRole::Admin))
        .nest("/api/club", gated(club, PartyRole::Club))
        .nest("/api/sponsor", gated(sponsor, PartyRole::Sponsor))
        .merge(openapi_router())
        .layer(Extension(app_state))
}
