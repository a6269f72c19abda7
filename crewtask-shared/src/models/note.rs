/// Note model and database operations
///
/// Notes hang off a task and carry an immutable author reference; only the
/// author may delete one. A task's note list is its notes in insertion
/// order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Note record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID (UUID v4)
    pub id: Uuid,

    /// Owning task; immutable
    pub task_id: Uuid,

    /// Note body
    pub content: String,

    /// Authoring account; immutable, sole deletion authority
    pub created_by: Uuid,

    /// When the note was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub task_id: Uuid,
    pub content: String,
    pub created_by: Uuid,
}

impl Note {
    /// Inserts a new note.
    pub async fn create(db: impl PgExecutor<'_>, data: CreateNote) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (task_id, content, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, content, created_by, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.content)
        .bind(data.created_by)
        .fetch_one(db)
        .await
    }

    /// Finds a note by ID.
    pub async fn find_by_id(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, task_id, content, created_by, created_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Lists a task's notes in insertion order.
    pub async fn list_for_task(
        db: impl PgExecutor<'_>,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, task_id, content, created_by, created_at
            FROM notes
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(db)
        .await
    }

    /// Deletes a note. It disappears from the owning task's list by
    /// construction.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
