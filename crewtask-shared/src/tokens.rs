/// Token lifecycle manager
///
/// Governs one-time verification codes from mint to terminal state.
///
/// # State machine
///
/// ```text
/// issue() ──▶ Active ──▶ Redeemed   (row deleted, side effect applied once)
///                   └──▶ Expired    (row deleted on contact, no side effect)
/// ```
///
/// Both terminal states delete the row, so "redeemed" and "expired" tokens
/// are indistinguishable from tokens that never existed — later attempts
/// see NotFound. Expiry is measured from `created_at` against a
/// per-purpose TTL supplied by configuration (confirmation codes live for
/// days, password-reset codes for minutes).
///
/// # At-most-once redemption
///
/// [`redeem`] consumes the row with a single `DELETE ... RETURNING`. Under
/// two concurrent redemption attempts for the same code, exactly one
/// statement returns the row; the loser observes NotFound and must not
/// apply the confirmation/reset side effect. Callers that pair redemption
/// with another write (confirming the account, replacing the password
/// hash) run both inside one transaction, so a failure after the delete
/// rolls the consumption back too.
///
/// # Issue policy
///
/// Requesting a new code does not invalidate older ones by default
/// ([`IssuePolicy::AllowMany`]); deployments that want exactly one live
/// code per account and purpose opt into [`IssuePolicy::SingleActive`]
/// via configuration.

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::auth::code::generate_code;
use crate::models::token::{TokenPurpose, VerificationToken};

/// Attempts before giving up on a code collision. The code space is 10^6,
/// so consecutive collisions this deep mean the table is saturated, not
/// unlucky.
const ISSUE_RETRIES: usize = 5;

/// Whether issuing a new code invalidates the account's older codes of
/// the same purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuePolicy {
    /// Keep older codes active (observed legacy behavior, the default)
    AllowMany,

    /// Delete older codes of the same purpose before minting
    SingleActive,
}

/// Outcome of a redemption attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// Code matched within its TTL; the row is gone and the bound account
    /// is returned for the side effect
    Redeemed { user_id: Uuid },

    /// Code matched but was minted too long ago; the row is gone, no side
    /// effect may be applied
    Expired,

    /// No such code (never minted, already redeemed, or already expired)
    NotFound,
}

/// Mints an Active token bound to an account and purpose.
///
/// Runs on a connection so callers can compose it into a transaction
/// (e.g. registration inserts the account and its first confirmation code
/// atomically). Retries on code collision with a fresh code.
///
/// # Errors
///
/// Database errors, including exhaustion of collision retries.
pub async fn issue(
    conn: &mut PgConnection,
    user_id: Uuid,
    purpose: TokenPurpose,
    policy: IssuePolicy,
) -> Result<VerificationToken, sqlx::Error> {
    if policy == IssuePolicy::SingleActive {
        let removed = VerificationToken::delete_for_user(&mut *conn, user_id, purpose).await?;
        if removed > 0 {
            debug!(%user_id, purpose = purpose.as_str(), removed, "Replaced active codes");
        }
    }

    let mut last_err = None;
    for _ in 0..ISSUE_RETRIES {
        let code = generate_code();
        match VerificationToken::insert(&mut *conn, &code, user_id, purpose).await {
            Ok(token) => return Ok(token),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                last_err = Some(sqlx::Error::Database(db_err));
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.expect("retry loop exits early without an error"))
}

/// Redeems a code: exact match, at most once.
///
/// The matching row is deleted atomically. A match older than `ttl`
/// reports [`Redemption::Expired`] — the row is still consumed, but the
/// caller must not apply the side effect. A purpose mismatch is
/// indistinguishable from an unknown code.
pub async fn redeem(
    db: impl PgExecutor<'_>,
    code: &str,
    purpose: TokenPurpose,
    ttl: Duration,
) -> Result<Redemption, sqlx::Error> {
    let Some(token) = VerificationToken::consume(db, code, purpose).await? else {
        return Ok(Redemption::NotFound);
    };

    if !is_fresh(token.created_at, Utc::now(), ttl) {
        debug!(purpose = purpose.as_str(), "Discarded expired code on redemption");
        return Ok(Redemption::Expired);
    }

    Ok(Redemption::Redeemed {
        user_id: token.user_id,
    })
}

/// Non-destructive code check.
///
/// Used by the password-reset flow's "validate code" step: confirms the
/// code exists and is fresh without consuming it, so the destructive
/// "set new password" step can still redeem it. Idempotent. A stale row
/// found here is deleted (it is terminal either way).
pub async fn validate(
    pool: &PgPool,
    code: &str,
    purpose: TokenPurpose,
    ttl: Duration,
) -> Result<bool, sqlx::Error> {
    let Some(token) = VerificationToken::find(pool, code, purpose).await? else {
        return Ok(false);
    };

    if !is_fresh(token.created_at, Utc::now(), ttl) {
        VerificationToken::delete(pool, token.id).await?;
        return Ok(false);
    }

    Ok(true)
}

/// Bulk housekeeping: removes every expired code of one purpose. Returns
/// the number deleted.
pub async fn purge_expired(
    pool: &PgPool,
    purpose: TokenPurpose,
    ttl: Duration,
) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - ttl;
    VerificationToken::delete_older_than(pool, purpose, cutoff).await
}

/// Freshness rule: a token minted at `created_at` is redeemable until
/// `created_at + ttl` exclusive.
fn is_fresh(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - created_at < ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let ttl = Duration::minutes(15);

        assert!(is_fresh(now, now, ttl));
        assert!(is_fresh(now - Duration::minutes(14), now, ttl));
        assert!(!is_fresh(now - Duration::minutes(15), now, ttl));
        assert!(!is_fresh(now - Duration::days(2), now, ttl));
    }

    #[test]
    fn test_redemption_outcomes_are_distinct() {
        let user_id = Uuid::new_v4();

        assert_ne!(Redemption::Redeemed { user_id }, Redemption::Expired);
        assert_ne!(Redemption::Expired, Redemption::NotFound);
        assert_ne!(Redemption::Redeemed { user_id }, Redemption::NotFound);
    }

    // Redemption/issue behavior against a live database is covered in
    // tests/token_lifecycle_tests.rs.
}
