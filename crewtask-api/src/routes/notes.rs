/// Note endpoints
///
/// Any project member may write a note on a task they can see; only the
/// note's author may delete it — the author check denies openly (401)
/// rather than masking, since the actor has already proven they can see
/// the task.
///
/// # Endpoints
///
/// - `POST   /api/projects/:project_id/tasks/:task_id/notes` - Create (member)
/// - `GET    /api/projects/:project_id/tasks/:task_id/notes` - List (member)
/// - `DELETE /api/projects/:project_id/tasks/:task_id/notes/:note_id` - Delete (author)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{
        scope::{Access, NoteScope, TaskScope},
        MessageResponse,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewtask_shared::{
    auth::authorization::{enforce, is_note_author, DenialPolicy},
    auth::middleware::AuthContext,
    models::note::{CreateNote, Note},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Note creation request
#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    /// Note body
    #[validate(length(min = 1, message = "Note content is required"))]
    pub content: String,
}

/// Creates a note on a task, authored by the actor.
pub async fn create_note(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<NoteRequest>,
) -> ApiResult<Json<Note>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Member).await?;

    req.validate()?;

    let note = Note::create(
        &state.db,
        CreateNote {
            task_id: scope.task.id,
            content: req.content,
            created_by: actor.id,
        },
    )
    .await?;

    Ok(Json(note))
}

/// Lists a task's notes in insertion order. Member read.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Note>>> {
    let scope = TaskScope::load(&state.db, &actor, project_id, task_id, Access::Member).await?;

    let notes = Note::list_for_task(&state.db, scope.task.id).await?;
    Ok(Json(notes))
}

/// Deletes a note. Author only — the project manager gets no override.
///
/// # Errors
///
/// - `401`: the actor is not the note's author
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path((project_id, task_id, note_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let scope = NoteScope::load(&state.db, &actor, project_id, task_id, note_id).await?;

    enforce(is_note_author(actor.id, &scope.note), DenialPolicy::Reveal)?;

    Note::delete(&state.db, scope.note.id).await?;

    Ok(Json(MessageResponse::new("Note deleted")))
}
