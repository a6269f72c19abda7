/// Bearer-token authentication middleware for Axum
///
/// Validates the `Authorization: Bearer <token>` header, then resolves the
/// token's subject into an account row. The loaded identity is attached to
/// the request as an [`AuthContext`] extension, so downstream handlers
/// receive an explicit, typed actor value instead of re-parsing headers.
///
/// The database lookup is deliberate: a signed token whose account has
/// been removed must not authenticate.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use crewtask_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(actor): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", actor.name)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// The authenticated actor, attached to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account ID of the caller
    pub id: Uuid,

    /// Account email
    pub email: String,

    /// Account display name
    pub name: String,
}

impl AuthContext {
    /// Builds the context from a loaded account row.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Error type for the authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a Bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token subject does not resolve to an account
    UnknownAccount,

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::UnknownAccount => {
                (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Bearer authentication middleware
///
/// On success, the request proceeds with an [`AuthContext`] extension; on
/// failure the request is rejected before reaching the handler.
///
/// # Errors
///
/// - 401 when the header is missing, the token is invalid or expired, or
///   the subject account no longer exists
/// - 400 when the header is present but not a Bearer token
pub async fn bearer_auth(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_id(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::UnknownAccount)?;

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_auth_context_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            password_hash: "$argon2id$...".to_string(),
            confirmed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let ctx = AuthContext::from_user(&user);
        assert_eq!(ctx.id, user.id);
        assert_eq!(ctx.email, "dev@example.com");
        assert_eq!(ctx.name, "Dev");
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::UnknownAccount.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
