//! Service Layer
//!
//! Authentication, authorization, passwords and the audit/notification
//! side-effects shared by the API handlers.

pub mod audit;
pub mod auth;
pub mod authorization;
pub mod notification;
pub mod password;

pub use audit::AuditService;
pub use auth::{extract_bearer_token, AccessTokenClaims, AuthConfig, AuthService, IssuedToken};
pub use authorization::{checks, ensure_owner, AuthContext};
pub use notification::NotificationService;
pub use password::{Argon2Config, PasswordService};
