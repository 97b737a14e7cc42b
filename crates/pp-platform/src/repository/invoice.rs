//! Invoice Repository

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{invoice_year_prefix, Invoice};
use crate::error::Result;

const COLUMNS: &str = "id, club_id, sponsor_id, contract_id, invoice_number, amount_cents, \
     issue_date, due_date, status, notes, created_at, updated_at";

pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, invoice: &Invoice) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO invoices ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&invoice.id)
        .bind(&invoice.club_id)
        .bind(&invoice.sponsor_id)
        .bind(&invoice.contract_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.amount_cents)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.status.as_str())
        .bind(&invoice.notes)
        .bind(millis(&invoice.created_at))
        .bind(millis(&invoice.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!("SELECT {} FROM invoices WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(invoice_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE club_id = ? ORDER BY invoice_number DESC",
            COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(invoice_from_row).collect()
    }

    /// Drafts stay private to the issuing club.
    pub async fn find_visible_to_sponsor(&self, sponsor_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE sponsor_id = ? AND status != 'draft' \
             ORDER BY invoice_number DESC",
            COLUMNS
        ))
        .bind(sponsor_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(invoice_from_row).collect()
    }

    /// Every invoice number already issued in `year`, across all clubs.
    pub async fn numbers_for_year(&self, year: i32) -> Result<Vec<String>> {
        let pattern = format!("{}%", invoice_year_prefix(year));
        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT invoice_number FROM invoices WHERE invoice_number LIKE ?")
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
        Ok(numbers)
    }

    pub async fn update_status(&self, invoice: &Invoice) -> Result<()> {
        sqlx::query("UPDATE invoices SET status = ?, updated_at = ? WHERE id = ?")
            .bind(invoice.status.as_str())
            .bind(millis(&invoice.updated_at))
            .bind(&invoice.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn invoice_from_row(row: &SqliteRow) -> Result<Invoice> {
    Ok(Invoice {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        sponsor_id: row.try_get("sponsor_id")?,
        contract_id: row.try_get("contract_id")?,
        invoice_number: row.try_get("invoice_number")?,
        amount_cents: row.try_get("amount_cents")?,
        issue_date: row.try_get("issue_date")?,
        due_date: row.try_get("due_date")?,
        status: parse_column(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
