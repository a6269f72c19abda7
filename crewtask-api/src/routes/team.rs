/// Team endpoints
///
/// The team is the set of collaborator accounts on a project. Reads are
/// open to members; changing the set is manager-only.
///
/// # Endpoints
///
/// - `GET    /api/projects/:project_id/team` - List team (member)
/// - `POST   /api/projects/:project_id/team/find` - Look up an account by email (member)
/// - `POST   /api/projects/:project_id/team` - Add a collaborator (manager)
/// - `DELETE /api/projects/:project_id/team/:user_id` - Remove one (manager)

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
        project::{Project, TeamMember},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Account lookup request
#[derive(Debug, Deserialize, Validate)]
pub struct FindMemberRequest {
    /// Email address to search for
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Add-collaborator request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Account ID to add
    pub id: Uuid,
}

/// Lists the project's team. Member read.
pub async fn get_team(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TeamMember>>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Member).await?;

    let team = Project::team_members(&state.db, scope.project.id).await?;
    Ok(Json(team))
}

/// Looks up an account by email for the add-collaborator picker.
///
/// # Errors
///
/// - `404`: no account with that email
pub async fn find_member(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<FindMemberRequest>,
) -> ApiResult<Json<TeamMember>> {
    ProjectScope::load(&state.db, &actor, project_id, Access::Member).await?;

    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(TeamMember {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}

/// Adds an account to the project's team. Manager only.
///
/// # Errors
///
/// - `404`: no such account
/// - `409`: already a collaborator, or the account is the manager (the
///   manager is never stored in the team set)
pub async fn add_member(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Manager).await?;

    let user = User::find_by_id(&state.db, req.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.id == scope.project.manager_id {
        return Err(ApiError::Conflict(
            "The manager is already part of the project".to_string(),
        ));
    }

    if scope.team.contains(&user.id) {
        return Err(ApiError::Conflict(
            "User is already a collaborator on this project".to_string(),
        ));
    }

    // The composite primary key turns a racing duplicate into a 409 too
    Project::add_team_member(&state.db, scope.project.id, user.id).await?;

    Ok(Json(MessageResponse::new("Collaborator added to the project")))
}

/// Removes an account from the project's team. Manager only.
///
/// # Errors
///
/// - `409`: the account is not a collaborator
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = ProjectScope::load(&state.db, &actor, project_id, Access::Manager).await?;

    let removed = Project::remove_team_member(&state.db, scope.project.id, user_id).await?;
    if !removed {
        return Err(ApiError::Conflict(
            "User is not a collaborator on this project".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new(
        "Collaborator removed from the project",
    )))
}
