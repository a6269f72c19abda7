/// Task model and database operations
///
/// Tasks belong to exactly one project (immutable reference) and move
/// through a flat status enumeration. `completed_by` records who last
/// moved the task out of `pending`; it is NULL whenever the status is
/// `pending`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'pending', 'on_hold', 'in_progress', 'under_review', 'completed'
/// );
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     completed_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A project's "task list" is its tasks ordered by creation time, so
/// insertion order is stable without a separate position column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Task status
///
/// Wire names are camelCase (`onHold`, `inProgress`, `underReview`);
/// database labels are snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started; carries no completed_by attribution
    Pending,

    /// Parked
    OnHold,

    /// Being worked on
    InProgress,

    /// Waiting for review
    UnderReview,

    /// Done
    Completed,
}

impl TaskStatus {
    /// String form as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::OnHold => "onHold",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::UnderReview => "underReview",
            TaskStatus::Completed => "completed",
        }
    }

    /// Whether this status clears the completed_by attribution.
    ///
    /// Moving to `pending` resets attribution to NULL; every other status
    /// records the acting account.
    pub fn clears_attribution(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning project; immutable after creation
    pub project_id: Uuid,

    /// Task name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Current status
    pub status: TaskStatus,

    /// Account that last moved the task out of `pending`; NULL while
    /// pending
    pub completed_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
}

impl Task {
    /// Inserts a new task in `pending` status.
    pub async fn create(db: impl PgExecutor<'_>, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, name, description, status, completed_by,
                      created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_one(db)
        .await
    }

    /// Finds a task by ID.
    pub async fn find_by_id(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, description, status, completed_by,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Lists a project's tasks in insertion order.
    pub async fn list_for_project(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, description, status, completed_by,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await
    }

    /// Updates name and description.
    pub async fn update(
        db: impl PgExecutor<'_>,
        id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, status, completed_by,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(db)
        .await
    }

    /// Deletes a task. Its notes cascade, and it disappears from the
    /// owning project's list by construction.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transitions the task's status and records attribution.
    ///
    /// `completed_by` must be NULL when the target status is `pending` —
    /// the handler derives it via [`TaskStatus::clears_attribution`].
    pub async fn set_status(
        db: impl PgExecutor<'_>,
        id: Uuid,
        status: TaskStatus,
        completed_by: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, completed_by = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, status, completed_by,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(completed_by)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            r#""pending""#
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::OnHold).unwrap(),
            r#""onHold""#
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            r#""inProgress""#
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::UnderReview).unwrap(),
            r#""underReview""#
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            r#""completed""#
        );
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::OnHold,
            TaskStatus::InProgress,
            TaskStatus::UnderReview,
            TaskStatus::Completed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
            assert_eq!(json, format!(r#""{}""#, status.as_str()));
        }
    }

    #[test]
    fn test_only_pending_clears_attribution() {
        assert!(TaskStatus::Pending.clears_attribution());
        assert!(!TaskStatus::OnHold.clears_attribution());
        assert!(!TaskStatus::InProgress.clears_attribution());
        assert!(!TaskStatus::UnderReview.clears_attribution());
        assert!(!TaskStatus::Completed.clears_attribution());
    }
}
