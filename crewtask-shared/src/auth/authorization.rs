/// Authorization engine
///
/// Stateless allow/deny rules over already-loaded entities. The request
/// pipeline resolves the actor and the target records first; the functions
/// here only compare identifiers, so they are pure, cheap, and safe for
/// arbitrary concurrent use.
///
/// # Permission model
///
/// - **Manager**: the account that created a project. Holds exclusive
///   mutation rights over the project, its team, and its tasks.
/// - **Team member**: may read the project, its tasks, and task notes, and
///   may create notes. No mutation rights beyond their own notes.
/// - **Note author**: the only account that may delete a note — including
///   against the project manager.
///
/// # Denial policy
///
/// A denial never mutates anything and is always recoverable. How it is
/// reported is an explicit per-route choice, not an accident of error
/// handling:
///
/// - [`DenialPolicy::Mask`] answers as if the resource did not exist
///   (HTTP 404), so probing cannot distinguish "forbidden" from "absent".
///   Used for project visibility and all manager-only checks.
/// - [`DenialPolicy::Reveal`] admits the resource exists but refuses
///   (HTTP 401). Used for note deletion.
///
/// # Example
///
/// ```
/// use crewtask_shared::auth::authorization::{
///     can_modify_project, enforce, DenialPolicy,
/// };
/// use crewtask_shared::models::project::Project;
/// use uuid::Uuid;
///
/// # fn example(actor_id: Uuid, project: &Project) -> Result<(), Box<dyn std::error::Error>> {
/// enforce(can_modify_project(actor_id, project), DenialPolicy::Mask)?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use crate::models::note::Note;
use crate::models::project::Project;

/// Error type for authorization denials
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Denied without revealing that the target exists (reported as 404)
    #[error("Resource not found")]
    Hidden,

    /// Denied openly (reported as 401)
    #[error("Not authorized to perform this action")]
    Forbidden,
}

/// How a denial is reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialPolicy {
    /// Deny as "not found" — existence is not leaked
    Mask,

    /// Deny as "not authorized" — existence is admitted
    Reveal,
}

/// Converts an allow/deny decision into a result under the given policy.
pub fn enforce(allowed: bool, policy: DenialPolicy) -> Result<(), AuthzError> {
    if allowed {
        return Ok(());
    }

    match policy {
        DenialPolicy::Mask => Err(AuthzError::Hidden),
        DenialPolicy::Reveal => Err(AuthzError::Forbidden),
    }
}

/// Checks whether the actor is the project's manager.
pub fn is_project_manager(actor_id: Uuid, project: &Project) -> bool {
    actor_id == project.manager_id
}

/// Checks whether the actor may see the project: manager or team member.
///
/// `team` is the project's member set as loaded by the request pipeline.
/// The manager is never stored in the team set, so both halves of the
/// check are required.
pub fn is_project_member(actor_id: Uuid, project: &Project, team: &[Uuid]) -> bool {
    is_project_manager(actor_id, project) || team.contains(&actor_id)
}

/// Checks whether the actor may mutate the project (update, delete, team
/// changes): manager only.
pub fn can_modify_project(actor_id: Uuid, project: &Project) -> bool {
    is_project_manager(actor_id, project)
}

/// Checks whether the actor may mutate tasks in the project (create,
/// update, delete, status change): manager only.
///
/// Task reads are intentionally wider — any project member — which is why
/// this takes the project and not the task: the rule depends only on who
/// manages the project the task lives in.
pub fn can_modify_task(actor_id: Uuid, project: &Project) -> bool {
    is_project_manager(actor_id, project)
}

/// Checks whether the actor wrote the note. Deletion requires an exact
/// match; the project manager gets no override here.
pub fn is_note_author(actor_id: Uuid, note: &Note) -> bool {
    actor_id == note.created_by
}
