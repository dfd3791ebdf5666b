//! Password reset tokens.
//!
//! The raw token travels to the user by email; only its SHA-256 digest is
//! stored, so a database leak does not hand out working reset links.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::{PASSWORD_RESET_TOKEN_BYTES, PASSWORD_RESET_TTL_MINUTES};

/// A freshly issued reset token
#[derive(Clone)]
pub struct ResetToken {
    raw: String,
    digest: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("raw", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl ResetToken {
    /// Issue a new token valid for the configured lifetime from `now`.
    pub fn issue(now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; PASSWORD_RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw = hex::encode(bytes);

        Self {
            digest: Self::digest(&raw),
            raw,
            expires_at: now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
        }
    }

    /// Hex SHA-256 of a raw token, as stored on the user.
    pub fn digest(raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }

    /// Token to hand to the user
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Digest to persist
    pub fn hashed(&self) -> &str {
        &self.digest
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
