//! Inventory API
//!
//! Club assets and their time-slot bookings. A booking is accepted only
//! while the asset has free capacity over the whole requested interval.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::api::common::{optional, positive, required, time_order, JsonBody};
use crate::api::middleware::Authenticated;
use crate::domain::{check_availability, now, to_stored_precision, Booking, BookingStatus, InventoryAsset};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, BookingRepository, InventoryAssetRepository};
use crate::service::{ensure_owner, AuditService, AuthContext};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: String,
    pub asset_type: String,
    pub quantity: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub quantity: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub sponsor_id: Option<String>,
    pub notes: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Clone)]
pub struct InventoryState {
    pub asset_repo: Arc<InventoryAssetRepository>,
    pub booking_repo: Arc<BookingRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
}

impl InventoryState {
    async fn owned_asset(&self, ctx: &AuthContext, id: &str) -> Result<InventoryAsset, PlatformError> {
        ensure_owner(ctx, self.asset_repo.find_by_id(id).await?, id)
    }
}

/// Add an inventory asset
#[utoipa::path(
    post,
    path = "/api/club/assets",
    tag = "club",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = InventoryAsset),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_asset(
    State(state): State<InventoryState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateAssetRequest>,
) -> Result<(StatusCode, Json<InventoryAsset>), PlatformError> {
    let mut asset = InventoryAsset::new(
        &auth.0.subject_id,
        required("name", &req.name)?,
        required("assetType", &req.asset_type)?,
        positive("quantity", req.quantity)?,
    );
    asset.description = optional(req.description);

    state.asset_repo.insert(&asset).await?;
    state
        .audit_service
        .log_create(&auth.0, "InventoryAsset", &asset.id, format!("Added asset {}", asset.name))
        .await;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// List own assets
#[utoipa::path(
    get,
    path = "/api/club/assets",
    tag = "club",
    responses((status = 200, description = "Assets", body = Vec<InventoryAsset>)),
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(state): State<InventoryState>,
    auth: Authenticated,
) -> Result<Json<Vec<InventoryAsset>>, PlatformError> {
    Ok(Json(state.asset_repo.find_by_club(&auth.0.subject_id).await?))
}

/// Get an asset
#[utoipa::path(
    get,
    path = "/api/club/assets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset", body = InventoryAsset),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_asset(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<InventoryAsset>, PlatformError> {
    Ok(Json(state.owned_asset(&auth.0, &id).await?))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/api/club/assets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = InventoryAsset),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_asset(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateAssetRequest>,
) -> Result<Json<InventoryAsset>, PlatformError> {
    let mut asset = state.owned_asset(&auth.0, &id).await?;

    if let Some(name) = req.name {
        asset.name = required("name", &name)?;
    }
    if let Some(asset_type) = req.asset_type {
        asset.asset_type = required("assetType", &asset_type)?;
    }
    if let Some(quantity) = req.quantity {
        asset.quantity = positive("quantity", quantity)?;
    }
    if req.description.is_some() {
        asset.description = optional(req.description);
    }
    asset.updated_at = now();

    state.asset_repo.update(&asset).await?;
    state
        .audit_service
        .log_update(&auth.0, "InventoryAsset", &asset.id, format!("Updated asset {}", asset.name))
        .await;

    Ok(Json(asset))
}

/// Delete an asset and its bookings
#[utoipa::path(
    delete,
    path = "/api/club/assets/{id}",
    tag = "club",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_asset(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    let asset = state.owned_asset(&auth.0, &id).await?;
    state.asset_repo.delete(&asset.id).await?;
    state
        .audit_service
        .log_delete(&auth.0, "InventoryAsset", &asset.id, format!("Deleted asset {}", asset.name))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Book an asset for a time slot
#[utoipa::path(
    post,
    path = "/api/club/assets/{id}/bookings",
    tag = "club",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = Booking),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Asset or sponsor not found"),
        (status = 409, description = "Not enough capacity")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), PlatformError> {
    let asset = state.owned_asset(&auth.0, &id).await?;
    let starts_at = to_stored_precision(req.starts_at);
    let ends_at = to_stored_precision(req.ends_at);
    time_order(starts_at, ends_at)?;
    let quantity = positive("quantity", req.quantity)?;

    let sponsor_id = optional(req.sponsor_id);
    if let Some(sponsor_id) = &sponsor_id {
        if state.account_repo.find_sponsor(sponsor_id).await?.is_none() {
            return Err(PlatformError::not_found("Sponsor", sponsor_id));
        }
    }

    let overlapping = state
        .booking_repo
        .find_overlapping(&asset.id, starts_at, ends_at)
        .await?;
    check_availability(&asset, &overlapping, starts_at, ends_at, quantity)?;

    let mut booking = Booking::new(&asset, starts_at, ends_at, quantity);
    booking.sponsor_id = sponsor_id;
    booking.notes = optional(req.notes);

    state.booking_repo.insert(&booking).await?;
    state
        .audit_service
        .log_create(&auth.0, "Booking", &booking.id, format!("Booked {} x{}", asset.name, booking.quantity))
        .await;
    info!(booking_id = %booking.id, asset_id = %asset.id, "Booking confirmed");

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Bookings of an asset
#[utoipa::path(
    get,
    path = "/api/club/assets/{id}/bookings",
    tag = "club",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Bookings", body = Vec<Booking>),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<Booking>>, PlatformError> {
    let asset = state.owned_asset(&auth.0, &id).await?;
    Ok(Json(state.booking_repo.find_by_asset(&asset.id).await?))
}

/// Cancel a booking, freeing its capacity
#[utoipa::path(
    put,
    path = "/api/club/bookings/{id}/cancel",
    tag = "club",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 403, description = "Owned by another club"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Already cancelled")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(state): State<InventoryState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Booking>, PlatformError> {
    let mut booking = ensure_owner(&auth.0, state.booking_repo.find_by_id(&id).await?, &id)?;
    if !booking.is_active() {
        return Err(PlatformError::conflict("Booking is already cancelled"));
    }

    booking.status = BookingStatus::Cancelled;
    state.booking_repo.update_status(&booking).await?;
    state
        .audit_service
        .log_status_changed(&auth.0, "Booking", &booking.id, booking.status.as_str())
        .await;

    Ok(Json(booking))
}

pub fn assets_router(state: InventoryState) -> Router {
    Router::new()
        .route("/", post(create_asset).get(list_assets))
        .route("/:id", get(get_asset).put(update_asset).delete(delete_asset))
        .route("/:id/bookings", post(create_booking).get(list_bookings))
        .with_state(state)
}

pub fn bookings_router(state: InventoryState) -> Router {
    Router::new()
        .route("/:id/cancel", put(cancel_booking))
        .with_state(state)
}
