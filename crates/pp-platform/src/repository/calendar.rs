//! Calendar Event Repository

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, timestamp};
use crate::domain::CalendarEvent;
use crate::error::Result;

const COLUMNS: &str = "id, club_id, title, event_type, starts_at, ends_at, location, created_at";

pub struct CalendarEventRepository {
    pool: SqlitePool,
}

impl CalendarEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, event: &CalendarEvent) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO calendar_events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&event.id)
        .bind(&event.club_id)
        .bind(&event.title)
        .bind(&event.event_type)
        .bind(millis(&event.starts_at))
        .bind(millis(&event.ends_at))
        .bind(&event.location)
        .bind(millis(&event.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<CalendarEvent>> {
        let row = sqlx::query(&format!("SELECT {} FROM calendar_events WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(event_from_row).transpose()
    }

    /// Events of a club that intersect the optional `[from, to)` window.
    pub async fn find_by_club(
        &self,
        club_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<CalendarEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM calendar_events WHERE club_id = ? \
             AND (? IS NULL OR ends_at > ?) AND (? IS NULL OR starts_at < ?) \
             ORDER BY starts_at",
            COLUMNS
        ))
        .bind(club_id)
        .bind(from.as_ref().map(millis))
        .bind(from.as_ref().map(millis))
        .bind(to.as_ref().map(millis))
        .bind(to.as_ref().map(millis))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        title: row.try_get("title")?,
        event_type: row.try_get("event_type")?,
        starts_at: timestamp(row, "starts_at")?,
        ends_at: timestamp(row, "ends_at")?,
        location: row.try_get("location")?,
        created_at: timestamp(row, "created_at")?,
    })
}
