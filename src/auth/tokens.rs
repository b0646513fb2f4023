//! Opaque bearer tokens.
//!
//! A token is 32 random bytes rendered as unpadded base32. Only the SHA-256
//! digest of that plaintext is ever persisted; the plaintext is handed to the
//! client once, at creation.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

pub const SCOPE_AUTHENTICATION: &str = "authentication";

/// Lifetime of tokens issued at login.
pub const AUTH_TOKEN_TTL: Duration = Duration::hours(24);

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct Token {
    pub plaintext: String,
    pub hash: Vec<u8>,
    pub user_id: i64,
    pub expiry: OffsetDateTime,
    pub scope: String,
}

impl Token {
    pub fn generate(user_id: i64, ttl: Duration, scope: &str, now: OffsetDateTime) -> Self {
        let mut secret = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut secret);

        let plaintext = base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &secret);
        let hash = hash_token(&plaintext);

        Self {
            plaintext,
            hash,
            user_id,
            expiry: now + ttl,
            scope: scope.to_string(),
        }
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.expiry
    }
}

pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Source of "now" for token issue and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
