//! Authorization
//!
//! Role checks and the resource ownership guard. Both are pure functions
//! over the verified request context.

use crate::domain::{Owned, PartyRole};
use crate::error::{PlatformError, Result};
use crate::service::auth::AccessTokenClaims;

/// Verified caller identity for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Account id (`sub` claim). For clubs and sponsors this is also the profile id.
    pub subject_id: String,
    pub role: PartyRole,
    pub username: String,
}

impl AuthContext {
    pub fn from_claims(claims: &AccessTokenClaims) -> Result<Self> {
        Ok(Self {
            subject_id: claims.sub.clone(),
            role: claims.party_role()?,
            username: claims.username.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == PartyRole::Admin
    }

    pub fn has_role(&self, role: PartyRole) -> bool {
        self.role == role
    }
}

/// Fetched-resource guard: absent is NotFound, another owner's is Forbidden.
/// Admins pass for any existing resource.
pub fn ensure_owner<T: Owned>(ctx: &AuthContext, resource: Option<T>, id: &str) -> Result<T> {
    let resource = resource.ok_or_else(|| PlatformError::not_found(T::ENTITY, id))?;
    if ctx.is_admin() || resource.owner_id() == ctx.subject_id {
        Ok(resource)
    } else {
        Err(PlatformError::forbidden(format!(
            "{} {} belongs to another account",
            T::ENTITY,
            resource.id()
        )))
    }
}

/// Role checks for handlers
pub mod checks {
    use super::*;

    pub fn require_role(ctx: &AuthContext, role: PartyRole) -> Result<()> {
        if ctx.has_role(role) {
            Ok(())
        } else {
            Err(PlatformError::forbidden(format!("{} role required", role)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Budget;

    fn ctx(id: &str, role: PartyRole) -> AuthContext {
        AuthContext {
            subject_id: id.to_string(),
            role,
            username: id.to_string(),
        }
    }

    #[test]
    fn test_owner_passes() {
        let budget = Budget::new("club-1", "Kit", "2024", 100);
        let id = budget.id.clone();
        let got = ensure_owner(&ctx("club-1", PartyRole::Club), Some(budget), &id).unwrap();
        assert_eq!(got.id, id);
    }

    #[test]
    fn test_other_owner_forbidden() {
        let budget = Budget::new("club-1", "Kit", "2024", 100);
        let id = budget.id.clone();
        let err = ensure_owner(&ctx("club-2", PartyRole::Club), Some(budget), &id).unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { .. }));
    }

    #[test]
    fn test_absent_is_not_found() {
        let err = ensure_owner::<Budget>(&ctx("club-1", PartyRole::Club), None, "missing").unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[test]
    fn test_admin_bypasses_owner() {
        let budget = Budget::new("club-1", "Kit", "2024", 100);
        let id = budget.id.clone();
        assert!(ensure_owner(&ctx("admin-1", PartyRole::Admin), Some(budget), &id).is_ok());
    }

    #[test]
    fn test_role_checks() {
        let club = ctx("club-1", PartyRole::Club);
        assert!(checks::require_role(&club, PartyRole::Club).is_ok());
        assert!(matches!(
            checks::require_role(&club, PartyRole::Admin),
            Err(PlatformError::Forbidden { .. })
        ));
        assert!(checks::require_role(&club, PartyRole::Sponsor).is_err());
    }
}
