/// Project model and database operations
///
/// A project is owned by its manager (the creating account, immutable) and
/// shared with a team of collaborator accounts. The team lives in the
/// `project_members` join table; the manager is never inserted there, so
/// visibility checks are always `manager OR member`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_name VARCHAR(255) NOT NULL,
///     client_name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     manager_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub project_name: String,

    /// Client the project is for
    pub client_name: String,

    /// Free-form description
    pub description: String,

    /// Owning account; immutable after creation
    pub manager_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub project_name: String,
    pub client_name: String,
    pub description: String,
    pub manager_id: Uuid,
}

/// Input for updating a project (all fields required, as in the API)
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub project_name: String,
    pub client_name: String,
    pub description: String,
}

/// Team member view: the account fields exposed to collaborators
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl Project {
    /// Inserts a new project with the given manager.
    pub async fn create(db: impl PgExecutor<'_>, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (project_name, client_name, description, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_name, client_name, description, manager_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.project_name)
        .bind(data.client_name)
        .bind(data.description)
        .bind(data.manager_id)
        .fetch_one(db)
        .await
    }

    /// Finds a project by ID.
    pub async fn find_by_id(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, project_name, client_name, description, manager_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Lists every project visible to an account: managed by it, or where
    /// it is on the team. Newest first.
    pub async fn list_for_account(
        db: impl PgExecutor<'_>,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.project_name, p.client_name, p.description, p.manager_id,
                   p.created_at, p.updated_at
            FROM projects p
            WHERE p.manager_id = $1
               OR EXISTS (
                    SELECT 1 FROM project_members m
                    WHERE m.project_id = p.id AND m.user_id = $1
               )
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(db)
        .await
    }

    /// Updates the mutable fields of a project.
    ///
    /// Returns the updated row, or None when the project does not exist.
    /// The manager reference is deliberately not updatable.
    pub async fn update(
        db: impl PgExecutor<'_>,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET project_name = $2, client_name = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_name, client_name, description, manager_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.project_name)
        .bind(data.client_name)
        .bind(data.description)
        .fetch_optional(db)
        .await
    }

    /// Deletes a project. Tasks, their notes, and team memberships cascade.
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the IDs of the project's team members (manager excluded by
    /// construction). Loaded once per request by the scope layer and fed
    /// to the authorization engine.
    pub async fn team_member_ids(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id FROM project_members
            WHERE project_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Returns the team as account profiles (id, email, name).
    pub async fn team_members(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<TeamMember>, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT u.id, u.email, u.name
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.added_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await
    }

    /// Checks whether an account is on the project's team.
    pub async fn is_team_member(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(exists.0)
    }

    /// Adds an account to the team.
    ///
    /// The primary key on (project_id, user_id) backs the duplicate check;
    /// callers translate the unique violation into a conflict response.
    pub async fn add_team_member(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Removes an account from the team. Returns false when the account
    /// was not a member.
    pub async fn remove_team_member(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
