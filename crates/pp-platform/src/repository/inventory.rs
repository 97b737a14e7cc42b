//! Inventory Asset, Booking and Right Repositories

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{Booking, InventoryAsset, Right};
use crate::error::Result;

const ASSET_COLUMNS: &str =
    "id, club_id, name, asset_type, quantity, description, created_at, updated_at";
const BOOKING_COLUMNS: &str =
    "id, asset_id, club_id, sponsor_id, starts_at, ends_at, quantity, status, notes, created_at";
const RIGHT_COLUMNS: &str = "id, club_id, name, category, exclusive, sponsor_id, start_date, \
     end_date, created_at, updated_at";

pub struct InventoryAssetRepository {
    pool: SqlitePool,
}

impl InventoryAssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, asset: &InventoryAsset) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO inventory_assets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            ASSET_COLUMNS
        ))
        .bind(&asset.id)
        .bind(&asset.club_id)
        .bind(&asset.name)
        .bind(&asset.asset_type)
        .bind(asset.quantity)
        .bind(&asset.description)
        .bind(millis(&asset.created_at))
        .bind(millis(&asset.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<InventoryAsset>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM inventory_assets WHERE id = ?",
            ASSET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(asset_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<InventoryAsset>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM inventory_assets WHERE club_id = ? ORDER BY name",
            ASSET_COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(asset_from_row).collect()
    }

    pub async fn update(&self, asset: &InventoryAsset) -> Result<()> {
        sqlx::query(
            "UPDATE inventory_assets SET name = ?, asset_type = ?, quantity = ?, description = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&asset.name)
        .bind(&asset.asset_type)
        .bind(asset.quantity)
        .bind(&asset.description)
        .bind(millis(&asset.updated_at))
        .bind(&asset.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventory_assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, booking: &Booking) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO bookings ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            BOOKING_COLUMNS
        ))
        .bind(&booking.id)
        .bind(&booking.asset_id)
        .bind(&booking.club_id)
        .bind(&booking.sponsor_id)
        .bind(millis(&booking.starts_at))
        .bind(millis(&booking.ends_at))
        .bind(booking.quantity)
        .bind(booking.status.as_str())
        .bind(&booking.notes)
        .bind(millis(&booking.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    pub async fn find_by_asset(&self, asset_id: &str) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE asset_id = ? ORDER BY starts_at",
            BOOKING_COLUMNS
        ))
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    /// Confirmed bookings of an asset intersecting `[starts_at, ends_at)`.
    pub async fn find_overlapping(
        &self,
        asset_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE asset_id = ? AND status = 'confirmed' \
             AND starts_at < ? AND ends_at > ?",
            BOOKING_COLUMNS
        ))
        .bind(asset_id)
        .bind(millis(&ends_at))
        .bind(millis(&starts_at))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    pub async fn update_status(&self, booking: &Booking) -> Result<()> {
        sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(booking.status.as_str())
            .bind(&booking.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct RightRepository {
    pool: SqlitePool,
}

impl RightRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, right: &Right) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO rights ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            RIGHT_COLUMNS
        ))
        .bind(&right.id)
        .bind(&right.club_id)
        .bind(&right.name)
        .bind(&right.category)
        .bind(right.exclusive)
        .bind(&right.sponsor_id)
        .bind(right.start_date)
        .bind(right.end_date)
        .bind(millis(&right.created_at))
        .bind(millis(&right.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Right>> {
        let row = sqlx::query(&format!("SELECT {} FROM rights WHERE id = ?", RIGHT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(right_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<Right>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rights WHERE club_id = ? ORDER BY category, start_date",
            RIGHT_COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(right_from_row).collect()
    }

    /// Rights of a club in one category, the candidates for an exclusivity clash.
    pub async fn find_by_category(&self, club_id: &str, category: &str) -> Result<Vec<Right>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rights WHERE club_id = ? AND category = ? COLLATE NOCASE",
            RIGHT_COLUMNS
        ))
        .bind(club_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(right_from_row).collect()
    }

    pub async fn update(&self, right: &Right) -> Result<()> {
        sqlx::query(
            "UPDATE rights SET name = ?, category = ?, exclusive = ?, sponsor_id = ?, \
             start_date = ?, end_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&right.name)
        .bind(&right.category)
        .bind(right.exclusive)
        .bind(&right.sponsor_id)
        .bind(right.start_date)
        .bind(right.end_date)
        .bind(millis(&right.updated_at))
        .bind(&right.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rights WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn asset_from_row(row: &SqliteRow) -> Result<InventoryAsset> {
    Ok(InventoryAsset {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        name: row.try_get("name")?,
        asset_type: row.try_get("asset_type")?,
        quantity: row.try_get("quantity")?,
        description: row.try_get("description")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn booking_from_row(row: &SqliteRow) -> Result<Booking> {
    Ok(Booking {
        id: row.try_get("id")?,
        asset_id: row.try_get("asset_id")?,
        club_id: row.try_get("club_id")?,
        sponsor_id: row.try_get("sponsor_id")?,
        starts_at: timestamp(row, "starts_at")?,
        ends_at: timestamp(row, "ends_at")?,
        quantity: row.try_get("quantity")?,
        status: parse_column(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn right_from_row(row: &SqliteRow) -> Result<Right> {
    Ok(Right {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        exclusive: row.try_get("exclusive")?,
        sponsor_id: row.try_get("sponsor_id")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
