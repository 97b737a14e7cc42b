//! Marketplace Opportunity and Application Repositories

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{Application, Opportunity};
use crate::error::Result;

const OPPORTUNITY_COLUMNS: &str = "id, club_id, title, description, category, price_cents, \
     status, available_from, available_until, created_at, updated_at";
const APPLICATION_COLUMNS: &str =
    "id, opportunity_id, sponsor_id, message, status, created_at, updated_at";

pub struct OpportunityRepository {
    pool: SqlitePool,
}

impl OpportunityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, opportunity: &Opportunity) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO opportunities ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            OPPORTUNITY_COLUMNS
        ))
        .bind(&opportunity.id)
        .bind(&opportunity.club_id)
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(&opportunity.category)
        .bind(opportunity.price_cents)
        .bind(opportunity.status.as_str())
        .bind(opportunity.available_from)
        .bind(opportunity.available_until)
        .bind(millis(&opportunity.created_at))
        .bind(millis(&opportunity.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Opportunity>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM opportunities WHERE id = ?",
            OPPORTUNITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(opportunity_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<Opportunity>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM opportunities WHERE club_id = ? ORDER BY created_at DESC",
            OPPORTUNITY_COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(opportunity_from_row).collect()
    }

    /// Open listings, optionally narrowed to one category (case-insensitive).
    pub async fn find_open(&self, category: Option<&str>) -> Result<Vec<Opportunity>> {
        let rows = match category {
            Some(category) => {
                sqlx::query(&format!(
                    "SELECT {} FROM opportunities WHERE status = 'open' \
                     AND category = ? COLLATE NOCASE ORDER BY created_at DESC",
                    OPPORTUNITY_COLUMNS
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM opportunities WHERE status = 'open' ORDER BY created_at DESC",
                    OPPORTUNITY_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(opportunity_from_row).collect()
    }

    pub async fn update(&self, opportunity: &Opportunity) -> Result<()> {
        sqlx::query(
            "UPDATE opportunities SET title = ?, description = ?, category = ?, price_cents = ?, \
             status = ?, available_from = ?, available_until = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(&opportunity.category)
        .bind(opportunity.price_cents)
        .bind(opportunity.status.as_str())
        .bind(opportunity.available_from)
        .bind(opportunity.available_until)
        .bind(millis(&opportunity.updated_at))
        .bind(&opportunity.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct ApplicationRepository {
    pool: SqlitePool,
}

impl ApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, application: &Application) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO applications ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            APPLICATION_COLUMNS
        ))
        .bind(&application.id)
        .bind(&application.opportunity_id)
        .bind(&application.sponsor_id)
        .bind(&application.message)
        .bind(application.status.as_str())
        .bind(millis(&application.created_at))
        .bind(millis(&application.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(application_from_row).transpose()
    }

    pub async fn exists(&self, opportunity_id: &str, sponsor_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE opportunity_id = ? AND sponsor_id = ?",
        )
        .bind(opportunity_id)
        .bind(sponsor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn find_by_opportunity(&self, opportunity_id: &str) -> Result<Vec<Application>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM applications WHERE opportunity_id = ? ORDER BY created_at",
            APPLICATION_COLUMNS
        ))
        .bind(opportunity_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(application_from_row).collect()
    }

    pub async fn find_by_sponsor(&self, sponsor_id: &str) -> Result<Vec<Application>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM applications WHERE sponsor_id = ? ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(sponsor_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(application_from_row).collect()
    }

    pub async fn update_status(&self, application: &Application) -> Result<()> {
        sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(application.status.as_str())
            .bind(millis(&application.updated_at))
            .bind(&application.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn opportunity_from_row(row: &SqliteRow) -> Result<Opportunity> {
    Ok(Opportunity {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price_cents: row.try_get("price_cents")?,
        status: parse_column(row, "status")?,
        available_from: row.try_get("available_from")?,
        available_until: row.try_get("available_until")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn application_from_row(row: &SqliteRow) -> Result<Application> {
    Ok(Application {
        id: row.try_get("id")?,
        opportunity_id: row.try_get("opportunity_id")?,
        sponsor_id: row.try_get("sponsor_id")?,
        message: row.try_get("message")?,
        status: parse_column(row, "status")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
