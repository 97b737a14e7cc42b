//! Contract Repository

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, opt_millis, opt_timestamp, parse_column, timestamp};
use crate::domain::Contract;
use crate::error::Result;

const COLUMNS: &str = "id, club_id, sponsor_id, title, terms, value_cents, start_date, end_date, \
     status, sign_token, signed_by, signed_at, viewed_at, created_at, updated_at";

pub struct ContractRepository {
    pool: SqlitePool,
}

impl ContractRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, contract: &Contract) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO contracts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&contract.id)
        .bind(&contract.club_id)
        .bind(&contract.sponsor_id)
        .bind(&contract.title)
        .bind(&contract.terms)
        .bind(contract.value_cents)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status.as_str())
        .bind(&contract.sign_token)
        .bind(&contract.signed_by)
        .bind(opt_millis(&contract.signed_at))
        .bind(opt_millis(&contract.viewed_at))
        .bind(millis(&contract.created_at))
        .bind(millis(&contract.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Contract>> {
        let row = sqlx::query(&format!("SELECT {} FROM contracts WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(contract_from_row).transpose()
    }

    pub async fn find_by_sign_token(&self, token: &str) -> Result<Option<Contract>> {
        let row = sqlx::query(&format!("SELECT {} FROM contracts WHERE sign_token = ?", COLUMNS))
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(contract_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<Contract>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contracts WHERE club_id = ? ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(contract_from_row).collect()
    }

    /// Sponsors only see contracts that have left draft.
    pub async fn find_visible_to_sponsor(&self, sponsor_id: &str) -> Result<Vec<Contract>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contracts WHERE sponsor_id = ? AND status != 'draft' \
             ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(sponsor_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(contract_from_row).collect()
    }

    pub async fn update(&self, contract: &Contract) -> Result<()> {
        sqlx::query(
            "UPDATE contracts SET sponsor_id = ?, title = ?, terms = ?, value_cents = ?, \
             start_date = ?, end_date = ?, status = ?, sign_token = ?, signed_by = ?, \
             signed_at = ?, viewed_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&contract.sponsor_id)
        .bind(&contract.title)
        .bind(&contract.terms)
        .bind(contract.value_cents)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status.as_str())
        .bind(&contract.sign_token)
        .bind(&contract.signed_by)
        .bind(opt_millis(&contract.signed_at))
        .bind(opt_millis(&contract.viewed_at))
        .bind(millis(&contract.updated_at))
        .bind(&contract.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn contract_from_row(row: &SqliteRow) -> Result<Contract> {
    Ok(Contract {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        sponsor_id: row.try_get("sponsor_id")?,
        title: row.try_get("title")?,
        terms: row.try_get("terms")?,
        value_cents: row.try_get("value_cents")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: parse_column(row, "status")?,
        sign_token: row.try_get("sign_token")?,
        signed_by: row.try_get("signed_by")?,
        signed_at: opt_timestamp(row, "signed_at")?,
        viewed_at: opt_timestamp(row, "viewed_at")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
