/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed session tokens (HS256)
/// - [`code`]: one-time verification codes for email flows
/// - [`middleware`]: bearer-token authentication for Axum
/// - [`authorization`]: the pure allow/deny rule set
///
/// # Example
///
/// ```no_run
/// use crewtask_shared::auth::password::{hash_password, verify_password};
/// use crewtask_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), chrono::Duration::days(180));
/// let session = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod code;
pub mod jwt;
pub mod middleware;
pub mod password;
