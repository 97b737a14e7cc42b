//! Account, Club and Sponsor Repository

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{Account, Club, PartyRole, Sponsor};
use crate::error::Result;

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, role, active, created_at";
const CLUB_COLUMNS: &str =
    "id, name, sport, city, description, contact_email, created_at, updated_at";
const SPONSOR_COLUMNS: &str =
    "id, company_name, industry, website, contact_email, created_at, updated_at";

pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, role, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.active)
        .bind(millis(&account.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create a club login and its profile in one transaction.
    pub async fn insert_club_account(&self, account: &Account, club: &Club) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, role, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.active)
        .bind(millis(&account.created_at))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO clubs (id, name, sport, city, description, contact_email, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&club.id)
        .bind(&club.name)
        .bind(&club.sport)
        .bind(&club.city)
        .bind(&club.description)
        .bind(&club.contact_email)
        .bind(millis(&club.created_at))
        .bind(millis(&club.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create a sponsor login and its profile in one transaction.
    pub async fn insert_sponsor_account(&self, account: &Account, sponsor: &Sponsor) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, role, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.active)
        .bind(millis(&account.created_at))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO sponsors (id, company_name, industry, website, contact_email, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sponsor.id)
        .bind(&sponsor.company_name)
        .bind(&sponsor.industry)
        .bind(&sponsor.website)
        .bind(&sponsor.contact_email)
        .bind(millis(&sponsor.created_at))
        .bind(millis(&sponsor.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE username = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn count_by_role(&self, role: PartyRole) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns false when no account has this id.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Clubs

    pub async fn find_club(&self, id: &str) -> Result<Option<Club>> {
        let row = sqlx::query(&format!("SELECT {} FROM clubs WHERE id = ?", CLUB_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(club_from_row).transpose()
    }

    pub async fn list_clubs(&self) -> Result<Vec<Club>> {
        let rows = sqlx::query(&format!("SELECT {} FROM clubs ORDER BY name", CLUB_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(club_from_row).collect()
    }

    pub async fn update_club(&self, club: &Club) -> Result<()> {
        sqlx::query(
            "UPDATE clubs SET name = ?, sport = ?, city = ?, description = ?, contact_email = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&club.name)
        .bind(&club.sport)
        .bind(&club.city)
        .bind(&club.description)
        .bind(&club.contact_email)
        .bind(millis(&club.updated_at))
        .bind(&club.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Sponsors

    pub async fn find_sponsor(&self, id: &str) -> Result<Option<Sponsor>> {
        let row = sqlx::query(&format!("SELECT {} FROM sponsors WHERE id = ?", SPONSOR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(sponsor_from_row).transpose()
    }

    pub async fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sponsors ORDER BY company_name",
            SPONSOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(sponsor_from_row).collect()
    }

    pub async fn update_sponsor(&self, sponsor: &Sponsor) -> Result<()> {
        sqlx::query(
            "UPDATE sponsors SET company_name = ?, industry = ?, website = ?, contact_email = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&sponsor.company_name)
        .bind(&sponsor.industry)
        .bind(&sponsor.website)
        .bind(&sponsor.contact_email)
        .bind(millis(&sponsor.updated_at))
        .bind(&sponsor.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn account_from_row(row: &SqliteRow) -> Result<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(row, "role")?,
        active: row.try_get("active")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn club_from_row(row: &SqliteRow) -> Result<Club> {
    Ok(Club {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        sport: row.try_get("sport")?,
        city: row.try_get("city")?,
        description: row.try_get("description")?,
        contact_email: row.try_get("contact_email")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn sponsor_from_row(row: &SqliteRow) -> Result<Sponsor> {
    Ok(Sponsor {
        id: row.try_get("id")?,
        company_name: row.try_get("company_name")?,
        industry: row.try_get("industry")?,
        website: row.try_get("website")?,
        contact_email: row.try_get("contact_email")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
