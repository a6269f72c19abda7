/// Database models
///
/// Struct-per-table records with their CRUD operations. Every method takes
/// any `PgExecutor`, so single queries run on the pool directly and
/// multi-row flows compose inside a transaction.
///
/// # Models
///
/// - `user`: accounts (registration, confirmation flag, password hash)
/// - `token`: one-time verification codes (see `crate::tokens` for rules)
/// - `project`: projects, managers, and team membership
/// - `task`: tasks with status and completion attribution
/// - `note`: task notes with author-only deletion

pub mod note;
pub mod project;
pub mod task;
pub mod token;
pub mod user;
