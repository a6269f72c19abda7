/// One-time verification codes
///
/// Account confirmation and password reset are driven by short numeric
/// codes sent over email. Codes are sampled from an OS-backed CSPRNG, so
/// they are not guessable from account metadata or timestamps. They are
/// distinct from session tokens: a code is a single-use database record
/// with a TTL, consumed by the token lifecycle manager (`crate::tokens`).
///
/// # Example
///
/// ```
/// use crewtask_shared::auth::code::{generate_code, CODE_LENGTH};
///
/// let code = generate_code();
/// assert_eq!(code.len(), CODE_LENGTH);
/// assert!(code.chars().all(|c| c.is_ascii_digit()));
/// ```

use rand::rngs::OsRng;
use rand::Rng;

/// Length of a verification code (digits)
pub const CODE_LENGTH: usize = 6;

/// Generates a new 6-digit verification code.
///
/// Leading zeros are allowed: the code is a fixed-length string, not a
/// number. Uniqueness is enforced by the database column, not here; the
/// code space is small enough that issuance retries on a unique-violation
/// are the caller's concern.
pub fn generate_code() -> String {
    const DIGITS: &[u8] = b"0123456789";
    let mut rng = OsRng;

    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..DIGITS.len());
            DIGITS[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_format() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_vary() {
        // 1000 draws from a 10^6 space colliding down to <10 distinct
        // values would mean a broken generator, not bad luck.
        let codes: HashSet<String> = (0..1000).map(|_| generate_code()).collect();
        assert!(codes.len() > 900, "Generated only {} distinct codes", codes.len());
    }
}
