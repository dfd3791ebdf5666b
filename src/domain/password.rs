//! Password value object - Domain layer password handling.
//!
//! Hashing and verification use Argon2 with its default parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// A real hash of a throwaway password, verified against when the account
/// does not exist so that a failed lookup costs the same as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    Password::hash("robot-cleaner-timing-placeholder")
        .map_err(|e| tracing::warn!("Could not prepare dummy password hash: {}", e))
        .ok()
});

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns validation error if password is shorter than the minimum length.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        Self::check_length(plain_text)?;
        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    /// Burn the time of a verification without an account to verify against.
    /// Always returns `false`.
    pub fn verify_dummy(plain_text: &str) -> bool {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = Self::verify_hash(plain_text, hash);
        }
        false
    }

    /// Reject passwords below the minimum length.
    pub fn check_length(plain_text: &str) -> AppResult<()> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_the_original() {
        let password = Password::new("limpeza123").unwrap();

        assert!(password.verify("limpeza123"));
        assert!(!password.verify("Limpeza123"));
        assert!(password.as_str().starts_with("$argon2"));
    }

    #[test]
    fn test_stored_hash_round_trips() {
        let stored = Password::new("limpeza123").unwrap().into_string();
        assert!(Password::from_hash(stored).verify("limpeza123"));
    }

    #[test]
    fn test_salts_differ() {
        let a = Password::new("limpeza123").unwrap();
        let b = Password::new("limpeza123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_minimum_length() {
        assert!(Password::new("12345").is_err());
        assert!(Password::new("123456").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // five characters, six bytes
        assert!(Password::check_length("senhã").is_err());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let stored = Password::from_hash("not-a-phc-string".to_string());
        assert!(!stored.verify("anything"));
    }

    #[test]
    fn test_verify_dummy_is_false() {
        assert!(!Password::verify_dummy("robot-cleaner-timing-placeholder"));
    }
}
