//! OpenAPI Documentation
//!
//! Central OpenAPI specification for all platform APIs, served as JSON
//! at `/q/openapi`.

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Pitch Partner API OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pitch Partner API",
        version = "1.0.0",
        description = "REST APIs connecting sports clubs and sponsors"
    ),
    modifiers(&BearerAuthAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Login, registration and current account"),
        (name = "contracts", description = "Public contract signing"),
        (name = "messages", description = "Direct messages"),
        (name = "notifications", description = "In-app notifications"),
        (name = "admin", description = "Platform administration and CRM"),
        (name = "club", description = "Club workspace"),
        (name = "sponsor", description = "Sponsor workspace")
    ),
    paths(
        super::health::health,
        // Auth API
        super::auth::login,
        super::auth::register_club,
        super::auth::register_sponsor,
        super::auth::me,
        // Admin API
        super::admin::list_clubs,
        super::admin::get_club,
        super::admin::list_sponsors,
        super::admin::get_sponsor,
        super::admin::set_account_status,
        super::admin::create_admin,
        super::crm::create_note,
        super::crm::list_notes,
        super::crm::delete_note,
        super::crm::create_tag,
        super::crm::list_tags,
        super::crm::delete_tag,
        super::crm::assign_tag,
        super::crm::list_assignments,
        super::crm::unassign_tag,
        super::audit_logs::list_audit_logs,
        // Profiles
        super::profiles::get_club_profile,
        super::profiles::update_club_profile,
        super::profiles::get_sponsor_profile,
        super::profiles::update_sponsor_profile,
        // Budgets
        super::budgets::create_budget,
        super::budgets::list_budgets,
        super::budgets::get_budget,
        super::budgets::update_budget,
        super::budgets::delete_budget,
        super::budgets::create_expense,
        super::budgets::list_expenses,
        super::budgets::delete_expense,
        // Contracts
        super::contracts::create_contract,
        super::contracts::list_club_contracts,
        super::contracts::get_club_contract,
        super::contracts::update_contract,
        super::contracts::send_contract,
        super::contracts::list_sponsor_contracts,
        super::contracts::get_sponsor_contract,
        super::contracts::view_by_token,
        super::contracts::sign_by_token,
        // Invoices
        super::invoices::create_invoice,
        super::invoices::list_club_invoices,
        super::invoices::get_club_invoice,
        super::invoices::update_invoice_status,
        super::invoices::list_sponsor_invoices,
        super::invoices::get_sponsor_invoice,
        // Marketplace
        super::marketplace::create_opportunity,
        super::marketplace::list_club_opportunities,
        super::marketplace::get_club_opportunity,
        super::marketplace::update_opportunity,
        super::marketplace::delete_opportunity,
        super::marketplace::list_opportunity_applications,
        super::marketplace::decide_application,
        super::marketplace::browse_marketplace,
        super::marketplace::get_marketplace_opportunity,
        super::marketplace::apply,
        super::marketplace::list_sponsor_applications,
        // Inventory
        super::inventory::create_asset,
        super::inventory::list_assets,
        super::inventory::get_asset,
        super::inventory::update_asset,
        super::inventory::delete_asset,
        super::inventory::create_booking,
        super::inventory::list_bookings,
        super::inventory::cancel_booking,
        // Rights
        super::rights::create_right,
        super::rights::list_rights,
        super::rights::get_right,
        super::rights::update_right,
        super::rights::delete_right,
        // Calendar
        super::calendar::create_event,
        super::calendar::list_events,
        super::calendar::delete_event,
        // Messages and notifications
        super::messages::send_message,
        super::messages::list_messages,
        super::messages::get_message,
        super::messages::mark_message_read,
        super::notifications::list_notifications,
        super::notifications::mark_notification_read,
    ),
    components(
        schemas(
            super::common::ApiError,
            super::common::PaginationParams,
        )
    )
)]
pub struct PlatformApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(PlatformApiDoc::openapi())
}

pub fn openapi_router() -> Router {
    Router::new().route("/q/openapi", get(openapi_json))
}
