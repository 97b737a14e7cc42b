//! Admin CRM Repositories: notes, tags and tag assignments

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, parse_column, timestamp};
use crate::domain::{CrmEntityType, Note, Tag, TagAssignment};
use crate::error::Result;

const NOTE_COLUMNS: &str = "id, author_id, entity_type, entity_id, body, created_at";
const TAG_COLUMNS: &str = "id, name, color, created_at";

pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, note: &Note) -> Result<()> {
        sqlx::query(&format!("INSERT INTO notes ({}) VALUES (?, ?, ?, ?, ?, ?)", NOTE_COLUMNS))
            .bind(&note.id)
            .bind(&note.author_id)
            .bind(note.entity_type.as_str())
            .bind(&note.entity_id)
            .bind(&note.body)
            .bind(millis(&note.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All notes, or only those about one club or sponsor.
    pub async fn find(&self, entity: Option<(CrmEntityType, &str)>) -> Result<Vec<Note>> {
        let rows = match entity {
            Some((entity_type, entity_id)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM notes WHERE entity_type = ? AND entity_id = ? \
                     ORDER BY created_at DESC",
                    NOTE_COLUMNS
                ))
                .bind(entity_type.as_str())
                .bind(entity_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {} FROM notes ORDER BY created_at DESC", NOTE_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(note_from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tag: &Tag) -> Result<()> {
        sqlx::query("INSERT INTO tags (id, name, color, created_at) VALUES (?, ?, ?, ?)")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(millis(&tag.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(&format!("SELECT {} FROM tags WHERE id = ?", TAG_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(tag_from_row).transpose()
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(&format!("SELECT {} FROM tags ORDER BY name", TAG_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(tag_from_row).collect()
    }

    /// Assignments go with the tag through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn assign(&self, assignment: &TagAssignment) -> Result<()> {
        sqlx::query(
            "INSERT INTO tag_assignments (tag_id, entity_type, entity_id, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&assignment.tag_id)
        .bind(assignment.entity_type.as_str())
        .bind(&assignment.entity_id)
        .bind(millis(&assignment.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn unassign(&self, tag_id: &str, entity_type: CrmEntityType, entity_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM tag_assignments WHERE tag_id = ? AND entity_type = ? AND entity_id = ?",
        )
        .bind(tag_id)
        .bind(entity_type.as_str())
        .bind(entity_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_assignments(&self, tag_id: &str) -> Result<Vec<TagAssignment>> {
        let rows = sqlx::query(
            "SELECT tag_id, entity_type, entity_id, created_at FROM tag_assignments \
             WHERE tag_id = ? ORDER BY created_at",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(assignment_from_row).collect()
    }
}

fn note_from_row(row: &SqliteRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        entity_type: parse_column(row, "entity_type")?,
        entity_id: row.try_get("entity_id")?,
        body: row.try_get("body")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn tag_from_row(row: &SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn assignment_from_row(row: &SqliteRow) -> Result<TagAssignment> {
    Ok(TagAssignment {
        tag_id: row.try_get("tag_id")?,
        entity_type: parse_column(row, "entity_type")?,
        entity_id: row.try_get("entity_id")?,
        created_at: timestamp(row, "created_at")?,
    })
}
