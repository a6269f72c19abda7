/// Request-scope loaders
///
/// The middle stages of the request pipeline: resolve path-embedded
/// identifiers into loaded records, enforce cross-entity consistency, and
/// run the authorization engine — all before any handler mutation. Each
/// loader returns an explicit scope value that the handler threads through
/// its work; nothing is smuggled through shared mutable request state.
///
/// Failure order follows the pipeline: missing entity → 404, task outside
/// the addressed project → 400, authorization denial → per-policy 401/404.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crewtask_shared::auth::authorization::{
    can_modify_project, can_modify_task, enforce, is_project_member, DenialPolicy,
};
use crewtask_shared::auth::middleware::AuthContext;
use crewtask_shared::models::note::Note;
use crewtask_shared::models::project::Project;
use crewtask_shared::models::task::Task;

/// Access level a route demands on the project it addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Manager or team member (reads, note creation)
    Member,

    /// Manager only (all mutations). Denied as absence.
    Manager,
}

/// A resolved project with its team, checked against the actor
#[derive(Debug)]
pub struct ProjectScope {
    pub project: Project,

    /// Team member IDs, loaded once for the authorization checks and
    /// reusable by handlers (e.g. duplicate-member detection)
    pub team: Vec<Uuid>,
}

impl ProjectScope {
    /// Loads a project and enforces the demanded access level.
    ///
    /// # Errors
    ///
    /// - 404 when the project does not exist
    /// - 404 when the actor lacks access (denials are masked — existence
    ///   is not leaked to outsiders)
    pub async fn load(
        db: &PgPool,
        actor: &AuthContext,
        project_id: Uuid,
        access: Access,
    ) -> Result<Self, ApiError> {
        let project = Project::find_by_id(db, project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        let team = Project::team_member_ids(db, project_id).await?;

        let allowed = match access {
            Access::Member => is_project_member(actor.id, &project, &team),
            Access::Manager => can_modify_project(actor.id, &project),
        };
        enforce(allowed, DenialPolicy::Mask)?;

        Ok(Self { project, team })
    }
}

/// A resolved task inside its project scope
#[derive(Debug)]
pub struct TaskScope {
    pub project: Project,
    pub team: Vec<Uuid>,
    pub task: Task,
}

impl TaskScope {
    /// Loads a project and a task, verifies the task belongs to the
    /// addressed project, then enforces the demanded access level.
    ///
    /// # Errors
    ///
    /// - 404 when either entity does not exist
    /// - 400 when the task exists but belongs to a different project
    /// - 404 on masked authorization denial
    pub async fn load(
        db: &PgPool,
        actor: &AuthContext,
        project_id: Uuid,
        task_id: Uuid,
        access: Access,
    ) -> Result<Self, ApiError> {
        let project = Project::find_by_id(db, project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        let task = Task::find_by_id(db, task_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        // Cross-project task access is forbidden
        if task.project_id != project.id {
            return Err(ApiError::BadRequest(
                "Task does not belong to this project".to_string(),
            ));
        }

        let team = Project::team_member_ids(db, project_id).await?;

        let allowed = match access {
            Access::Member => is_project_member(actor.id, &project, &team),
            Access::Manager => can_modify_task(actor.id, &project),
        };
        enforce(allowed, DenialPolicy::Mask)?;

        Ok(Self {
            project,
            team,
            task,
        })
    }
}

/// A resolved note inside its task scope
#[derive(Debug)]
pub struct NoteScope {
    pub task: Task,
    pub note: Note,
}

impl NoteScope {
    /// Loads the task scope at Member level, then the note, verifying it
    /// belongs to the addressed task.
    ///
    /// The author-only deletion rule is not applied here: it uses the
    /// Reveal policy and lives in the delete handler.
    pub async fn load(
        db: &PgPool,
        actor: &AuthContext,
        project_id: Uuid,
        task_id: Uuid,
        note_id: Uuid,
    ) -> Result<Self, ApiError> {
        let scope = TaskScope::load(db, actor, project_id, task_id, Access::Member).await?;

        let note = Note::find_by_id(db, note_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

        if note.task_id != scope.task.id {
            return Err(ApiError::BadRequest(
                "Note does not belong to this task".to_string(),
            ));
        }

        Ok(Self {
            task: scope.task,
            note,
        })
    }
}
