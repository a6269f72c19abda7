/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: account flows (register, confirm, login, password reset)
/// - `projects`: project CRUD
/// - `tasks`: tasks within a project
/// - `team`: project collaborators
/// - `notes`: task notes
/// - `scope`: shared request-scope loaders (entity resolution +
///   authorization)

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod notes;
pub mod projects;
pub mod scope;
pub mod tasks;
pub mod team;

/// Plain message body for mutations that don't return an entity
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    /// Builds a message response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
