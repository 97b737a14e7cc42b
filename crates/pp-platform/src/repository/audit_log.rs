//! Audit Log Repository

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{AuditAction, AuditLog, PartyRole};
use crate::error::Result;

const COLUMNS: &str =
    "id, action, entity_type, entity_id, description, principal_id, principal_role, created_at";

/// Filters for the admin audit trail; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub principal_id: Option<String>,
    pub action: Option<AuditAction>,
}

pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, log: &AuditLog) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO audit_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&log.id)
        .bind(log.action.as_str())
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.description)
        .bind(&log.principal_id)
        .bind(log.principal_role.map(|r| r.as_str()))
        .bind(millis(&log.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn search(&self, filter: &AuditLogFilter, limit: i64, offset: i64) -> Result<Vec<AuditLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM audit_logs \
             WHERE (? IS NULL OR entity_type = ?) \
             AND (? IS NULL OR entity_id = ?) \
             AND (? IS NULL OR principal_id = ?) \
             AND (? IS NULL OR action = ?) \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(&filter.entity_type)
        .bind(&filter.entity_type)
        .bind(&filter.entity_id)
        .bind(&filter.entity_id)
        .bind(&filter.principal_id)
        .bind(&filter.principal_id)
        .bind(filter.action.map(|a| a.as_str()))
        .bind(filter.action.map(|a| a.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(audit_log_from_row).collect()
    }
}

fn audit_log_from_row(row: &SqliteRow) -> Result<AuditLog> {
    let principal_role: Option<String> = row.try_get("principal_role")?;
    Ok(AuditLog {
        id: row.try_get("id")?,
        action: parse_column(row, "action")?,
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        description: row.try_get("description")?,
        principal_id: row.try_get("principal_id")?,
        principal_role: principal_role
            .map(|r| r.parse::<PartyRole>())
            .transpose()?,
        created_at: timestamp(row, "created_at")?,
    })
}
