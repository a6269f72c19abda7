/// Task endpoints
///
/// Reads are open to any project member; every mutation — including
/// status changes — is manager-only, with denials masked as 404.
///
/// # Endpoints
///
/// - `POST   /api/projects/:project_id/tasks` - Create (manager)
/// - `GET    /api/projects/:project_id/tasks` - List (member)
/// - `GET    /api/projects/:project_id/tasks/:task_id` - Detail (member)
/// - `PUT    /api/projects/:project_id/tasks/:task_id` - Update (manager)
/// - `DELETE /api/projects/:project_id/tasks/:task_id` - Delete (manager)
/// - `POST   /api/projects/:project_id/tasks/:task_id/status` - Status (manager)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{
        scope::{Access, ProjectScope, TaskScope},
        MessageResponse,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use crewtask_shared::{
    auth::middleware::AuthContext,
    models::{
        note::Note,
        project::TeamMember,
        task::{CreateTask, Task, TaskStatus},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Task create/update request
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// Task name
    #[validate(length(min = 1, message = "Task name is required"))]
    pub name: String,

    /// Description
    #[validate(length(min = 1, message = "Task description is required"))]
    pub description: String,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status (wire names: pending, onHold, inProgress,
    /// underReview, completed)
    pub status: TaskStatus,
}

/// Task detail response with resolved completion attribution and notes
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,

    /// Who last moved the task out of `pending`, as a profile
    pub completed_by: Option<TeamMember>,

    /// Notes in insertion order
    pub notes: Vec<Note>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creates a task in the addressed project. Manager only.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Manager).await?;

    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: scope.project.id,
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Lists the project's tasks in insertion order. Member read.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Member).await?;

    let tasks = Task::list_for_project(&state.db, scope.project.id).await?;
    Ok(Json(tasks))
}

/// Returns one task with completion attribution and its notes. Member read.
pub async fn get_task(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskDetail>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Member).await?;

    let completed_by = match scope.task.completed_by {
        Some(user_id) => User::find_by_id(&state.db, user_id).await?.map(|u| TeamMember {
            id: u.id,
            email: u.email,
            name: u.name,
        }),
        None => None,
    };

    let notes = Note::list_for_task(&state.db, scope.task.id).await?;

    let task = scope.task;
    Ok(Json(TaskDetail {
        id: task.id,
        project_id: task.project_id,
        name: task.name,
        description: task.description,
        status: task.status,
        completed_by,
        notes,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }))
}

/// Updates a task's name and description. Manager only.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Manager).await?;

    req.validate()?;

    let updated = Task::update(&state.db, scope.task.id, &req.name, &req.description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a task. Manager only; its notes cascade.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Manager).await?;

    Task::delete(&state.db, scope.task.id).await?;

    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Transitions a task's status. Manager only.
///
/// Moving to `pending` clears the completion attribution; every other
/// status records the actor as `completed_by`.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Task>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Manager).await?;

    let completed_by = if req.status.clears_attribution() {
        None
    } else {
        Some(actor.id)
    };

    let updated = Task::set_status(&state.db, scope.task.id, req.status, completed_by)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(updated))
}
