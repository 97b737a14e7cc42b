//! Audit Service
//!
//! Records state-changing actions. Insert failures are logged and never
//! fail the calling request.

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{AuditAction, AuditLog, PartyRole};
use crate::repository::AuditLogRepository;
use crate::service::authorization::AuthContext;

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditLogRepository>) -> Self {
        Self { repo }
    }

    pub async fn log_create(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) {
        let log = build_log(auth, AuditAction::Create, entity_type, Some(entity_id), description);
        self.insert(log).await
    }

    pub async fn log_update(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) {
        let log = build_log(auth, AuditAction::Update, entity_type, Some(entity_id), description);
        self.insert(log).await
    }

    pub async fn log_delete(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        description: impl Into<String>,
    ) {
        let log = build_log(auth, AuditAction::Delete, entity_type, Some(entity_id), description);
        self.insert(log).await
    }

    pub async fn log_status_changed(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        status: &str,
    ) {
        let desc = format!("{} status changed to {}", entity_type, status);
        let log = build_log(auth, AuditAction::StatusChanged, entity_type, Some(entity_id), desc);
        self.insert(log).await
    }

    /// Status changes made through a public sign link have no principal.
    pub async fn log_public_status_changed(&self, entity_type: &str, entity_id: &str, description: impl Into<String>) {
        let log = AuditLog::for_entity(AuditAction::StatusChanged, entity_type, entity_id, description);
        self.insert(log).await
    }

    pub async fn log_account_status(&self, auth: &AuthContext, account_id: &str, active: bool) {
        let desc = if active {
            "Account activated"
        } else {
            "Account deactivated"
        };
        let log = build_log(auth, AuditAction::AccountStatusChanged, "Account", Some(account_id), desc);
        self.insert(log).await
    }

    pub async fn log_login(&self, username: &str, account: Option<(&str, PartyRole)>) {
        let log = match account {
            Some((id, role)) => AuditLog::for_entity(
                AuditAction::Login,
                "Session",
                id,
                format!("Successful login for {}", username),
            )
            .with_principal(id, role),
            None => AuditLog::new(
                AuditAction::LoginFailed,
                "Session",
                format!("Failed login attempt for {}", username),
            ),
        };
        self.insert(log).await
    }

    async fn insert(&self, log: AuditLog) {
        info!(
            action = %log.action,
            entity_type = %log.entity_type,
            entity_id = ?log.entity_id,
            principal_id = ?log.principal_id,
            "Audit log recorded"
        );

        if let Err(e) = self.repo.insert(&log).await {
            error!(error = %e, "Failed to insert audit log");
        }
    }
}

fn build_log(
    auth: &AuthContext,
    action: AuditAction,
    entity_type: &str,
    entity_id: Option<&str>,
    description: impl Into<String>,
) -> AuditLog {
    let log = match entity_id {
        Some(id) => AuditLog::for_entity(action, entity_type, id, description),
        None => AuditLog::new(action, entity_type, description),
    };
    log.with_principal(&auth.subject_id, auth.role)
}
