/// Project endpoints
///
/// # Endpoints
///
/// - `POST   /api/projects` - Create a project (actor becomes manager)
/// - `GET    /api/projects` - List projects visible to the actor
/// - `GET    /api/projects/:project_id` - Project with its task list
/// - `PUT    /api/projects/:project_id` - Update (manager only)
/// - `DELETE /api/projects/:project_id` - Delete (manager only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{
        scope::{Access, ProjectScope},
        MessageResponse,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewtask_shared::{
    auth::middleware::AuthContext,
    models::{
        project::{CreateProject, Project, UpdateProject},
        task::Task,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Project create/update request
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    /// Project name
    #[validate(length(min = 1, message = "Project name is required"))]
    pub project_name: String,

    /// Client name
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,

    /// Description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Project detail response: the project plus its ordered task list
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,

    /// Tasks in insertion order
    pub tasks: Vec<Task>,
}

/// Creates a project with the actor as manager.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            project_name: req.project_name,
            client_name: req.client_name,
            description: req.description,
            manager_id: actor.id,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Lists every project the actor manages or collaborates on.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_account(&state.db, actor.id).await?;
    Ok(Json(projects))
}

/// Returns one project with its task list.
///
/// # Errors
///
/// - `404`: project missing, or the actor is neither manager nor member
pub async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Member).await?;

    let tasks = Task::list_for_project(&state.db, scope.project.id).await?;

    Ok(Json(ProjectDetail {
        project: scope.project,
        tasks,
    }))
}

/// Updates a project's fields. Manager only; denial is masked.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<Json<Project>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Manager).await?;

    req.validate()?;

    let updated = Project::update(
        &state.db,
        scope.project.id,
        UpdateProject {
            project_name: req.project_name,
            client_name: req.client_name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a project. Manager only; tasks, notes, and memberships cascade.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Manager).await?;

    Project::delete(&state.db, scope.project.id).await?;

    Ok(Json(MessageResponse::new("Project deleted")))
}
