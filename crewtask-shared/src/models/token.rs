/// Verification token model
///
/// Row-level storage for one-time verification codes. The lifecycle rules
/// (TTL, redemption, issue policy) live in [`crate::tokens`]; this module
/// is only the table access.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE token_purpose AS ENUM ('confirmation', 'password_reset');
///
/// CREATE TABLE verification_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     code VARCHAR(16) NOT NULL UNIQUE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     purpose token_purpose NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The explicit purpose tag keeps confirmation codes and password-reset
/// codes in disjoint namespaces: every lookup filters on purpose, so a
/// code minted for one flow can never be redeemed by the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// What a verification code is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Confirms a freshly registered account
    Confirmation,

    /// Authorizes a password reset
    PasswordReset,
}

impl TokenPurpose {
    /// Database/wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Confirmation => "confirmation",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// Verification token record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationToken {
    /// Unique row ID
    pub id: Uuid,

    /// The opaque code as mailed to the user
    pub code: String,

    /// Bound account
    pub user_id: Uuid,

    /// Flow the code belongs to
    pub purpose: TokenPurpose,

    /// Mint time; TTL is measured from here
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Inserts a new active token row.
    ///
    /// Surfaces the unique violation on a code collision; `tokens::issue`
    /// retries with a fresh code.
    pub async fn insert(
        db: impl PgExecutor<'_>,
        code: &str,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (code, user_id, purpose)
            VALUES ($1, $2, $3)
            RETURNING id, code, user_id, purpose, created_at
            "#,
        )
        .bind(code)
        .bind(user_id)
        .bind(purpose)
        .fetch_one(db)
        .await
    }

    /// Non-destructive lookup by exact code and purpose.
    pub async fn find(
        db: impl PgExecutor<'_>,
        code: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT id, code, user_id, purpose, created_at
            FROM verification_tokens
            WHERE code = $1 AND purpose = $2
            "#,
        )
        .bind(code)
        .bind(purpose)
        .fetch_optional(db)
        .await
    }

    /// Atomically removes and returns the token matching code and purpose.
    ///
    /// The row delete is the commit point for redemption: of two
    /// concurrent attempts, exactly one gets the row back; the other sees
    /// None.
    pub async fn consume(
        db: impl PgExecutor<'_>,
        code: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, VerificationToken>(
            r#"
            DELETE FROM verification_tokens
            WHERE code = $1 AND purpose = $2
            RETURNING id, code, user_id, purpose, created_at
            "#,
        )
        .bind(code)
        .bind(purpose)
        .fetch_optional(db)
        .await
    }

    /// Deletes a token row by ID (used when a lookup finds a stale row).
    pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM verification_tokens WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all of an account's tokens for one purpose. Returns the
    /// number removed. Backs the single-active issue policy.
    pub async fn delete_for_user(
        db: impl PgExecutor<'_>,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE user_id = $1 AND purpose = $2
            "#,
        )
        .bind(user_id)
        .bind(purpose)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every token of one purpose minted before `cutoff`. Returns
    /// the number removed.
    pub async fn delete_older_than(
        db: impl PgExecutor<'_>,
        purpose: TokenPurpose,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE purpose = $1 AND created_at < $2
            "#,
        )
        .bind(purpose)
        .bind(cutoff)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_labels() {
        assert_eq!(TokenPurpose::Confirmation.as_str(), "confirmation");
        assert_eq!(TokenPurpose::PasswordReset.as_str(), "password_reset");
    }

    #[test]
    fn test_purpose_serde() {
        assert_eq!(
            serde_json::to_string(&TokenPurpose::Confirmation).unwrap(),
            r#""confirmation""#
        );
        assert_eq!(
            serde_json::to_string(&TokenPurpose::PasswordReset).unwrap(),
            r#""password_reset""#
        );
    }
}
