//! Pitch Partner Platform
//!
//! Backend for the club/sponsor sponsorship marketplace:
//! - Accounts with admin, club and sponsor roles behind HS256 bearer tokens
//! - Budgets, contracts with public sign links, numbered invoices
//! - Marketplace listings and sponsor applications
//! - Inventory bookings and category-exclusive sponsorship rights
//! - Calendar, messaging, notifications and an admin CRM with audit trail

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod error;

pub use api::{build_router, PlatformServices};
pub use error::{PlatformError, Result};
