use thiserror::Error;
use tracing::error;

/// bcrypt work factor for stored passwords.
pub const PASSWORD_COST: u32 = 12;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(#[source] bcrypt::BcryptError),

    #[error("password verification failed: {0}")]
    Verification(#[source] bcrypt::BcryptError),
}

/// Refuses passwords longer than [`MAX_PASSWORD_BYTES`] instead of silently
/// hashing a prefix of them.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    bcrypt::non_truncating_hash(plain, PASSWORD_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        PasswordError::Hashing(e)
    })
}

/// `Ok(false)` means the candidate is wrong; `Err` means the stored hash
/// could not be checked at all.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    match bcrypt::non_truncating_verify(plain, hash) {
        Ok(matches) => Ok(matches),
        // no stored hash was made from an input this long
        Err(bcrypt::BcryptError::Truncation(_)) => Ok(false),
        Err(e) => {
            error!(error = %e, "bcrypt verify error");
            Err(PasswordError::Verification(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password_without_error() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hashes_are_salted_and_use_cost_12() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$2b$12$"), "unexpected hash prefix: {a}");
    }

    #[test]
    fn overlong_passwords_are_refused_not_truncated() {
        let err = hash_password(&"a".repeat(100)).unwrap_err();
        assert!(matches!(err, PasswordError::Hashing(_)));

        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(&prefix).expect("72 bytes is accepted");
        assert!(verify_password(&prefix, &hash).unwrap());
        let longer = format!("{prefix}DIFFERENT_TAIL");
        assert!(!verify_password(&longer, &hash).expect("long candidate is a mismatch"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, PasswordError::Verification(_)));
    }
}
