//! Notification Repository

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, opt_millis, opt_timestamp, parse_column, timestamp};
use crate::domain::Notification;
use crate::error::Result;

const COLUMNS: &str =
    "id, account_id, kind, title, body, entity_type, entity_id, read_at, created_at";

pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO notifications ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&notification.id)
        .bind(&notification.account_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.entity_type)
        .bind(&notification.entity_id)
        .bind(opt_millis(&notification.read_at))
        .bind(millis(&notification.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Notification>> {
        let row = sqlx::query(&format!("SELECT {} FROM notifications WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(notification_from_row).transpose()
    }

    pub async fn find_by_account(&self, account_id: &str, unread_only: bool) -> Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE account_id = ? AND (? = 0 OR read_at IS NULL) \
             ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(account_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(notification_from_row).collect()
    }

    pub async fn mark_read(&self, id: &str, read_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE notifications SET read_at = ? WHERE id = ? AND read_at IS NULL")
            .bind(millis(&read_at))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        kind: parse_column(row, "kind")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        read_at: opt_timestamp(row, "read_at")?,
        created_at: timestamp(row, "created_at")?,
    })
}
