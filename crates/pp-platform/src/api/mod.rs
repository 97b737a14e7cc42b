//! API Layer
//!
//! REST endpoints grouped by caller:
//! - public: health, login/registration, contract sign links
//! - any authenticated account: messages, notifications
//! - role-gated: `/api/admin`, `/api/club`, `/api/sponsor`

pub mod common;
pub mod middleware;
pub mod openapi;
pub mod router;

// Public and shared APIs
pub mod health;
pub mod auth;
pub mod messages;
pub mod notifications;

// Admin APIs
pub mod admin;
pub mod crm;
pub mod audit_logs;

// Club and sponsor APIs
pub mod profiles;
pub mod budgets;
pub mod contracts;
pub mod invoices;
pub mod marketplace;
pub mod inventory;
pub mod rights;
pub mod calendar;

pub use common::*;
pub use middleware::{AppState, Authenticated};
pub use openapi::PlatformApiDoc;
pub use router::{build_router, PlatformServices};
