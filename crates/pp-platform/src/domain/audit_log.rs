//! Audit Log Entity
//!
//! Records state-changing actions for compliance and debugging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PartyRole;

/// Audit action type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Entity created
    Create,
    /// Entity updated
    Update,
    /// Entity deleted
    Delete,
    /// Document or application status changed
    StatusChanged,
    /// Successful login
    Login,
    /// Failed login attempt
    LoginFailed,
    /// Account activated or deactivated
    AccountStatusChanged,
}

text_enum!(AuditAction {
    Create => "create",
    Update => "update",
    Delete => "delete",
    StatusChanged => "status_changed",
    Login => "login",
    LoginFailed => "login_failed",
    AccountStatusChanged => "account_status_changed",
});

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,

    /// Action performed
    pub action: AuditAction,

    /// Entity type affected (e.g., "Contract", "Budget")
    pub entity_type: String,

    /// Entity ID affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    pub description: String,

    /// Account that performed the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_role: Option<PartyRole>,

    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        action: AuditAction,
        entity_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            description: description.into(),
            principal_id: None,
            principal_role: None,
            created_at: super::now(),
        }
    }

    pub fn for_entity(
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut log = Self::new(action, entity_type, description);
        log.entity_id = Some(entity_id.into());
        log
    }

    pub fn with_principal(mut self, principal_id: impl Into<String>, role: PartyRole) -> Self {
        self.principal_id = Some(principal_id.into());
        self.principal_role = Some(role);
        self
    }
}
