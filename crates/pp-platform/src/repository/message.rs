//! Message Repository

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, opt_millis, opt_timestamp, timestamp};
use crate::domain::Message;
use crate::error::Result;

const COLUMNS: &str = "id, sender_id, recipient_id, subject, body, read_at, created_at";

pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, message: &Message) -> Result<()> {
        sqlx::query(&format!("INSERT INTO messages ({}) VALUES (?, ?, ?, ?, ?, ?, ?)", COLUMNS))
            .bind(&message.id)
            .bind(&message.sender_id)
            .bind(&message.recipient_id)
            .bind(&message.subject)
            .bind(&message.body)
            .bind(opt_millis(&message.read_at))
            .bind(millis(&message.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Message>> {
        let row = sqlx::query(&format!("SELECT {} FROM messages WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(message_from_row).transpose()
    }

    pub async fn find_inbox(&self, account_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM messages WHERE recipient_id = ? ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(message_from_row).collect()
    }

    pub async fn find_sent(&self, account_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM messages WHERE sender_id = ? ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(message_from_row).collect()
    }

    pub async fn mark_read(&self, id: &str, read_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE messages SET read_at = ? WHERE id = ? AND read_at IS NULL")
            .bind(millis(&read_at))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        recipient_id: row.try_get("recipient_id")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        read_at: opt_timestamp(row, "read_at")?,
        created_at: timestamp(row, "created_at")?,
    })
}
