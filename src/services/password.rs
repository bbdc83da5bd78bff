//! Credential hashing
//!
//! Provides the `CredentialHasher` collaborator used by the user pre-create
//! lifecycle handler, and its Argon2id implementation.
//!
//! # Security
//!
//! - Uses Argon2id variant (hybrid of Argon2i and Argon2d)
//! - Uses secure default parameters from the argon2 crate
//! - Generates random salt for each password hash

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::models::User;

/// Longest plaintext accepted for hashing, in bytes
pub const MAX_PASSWORD_LENGTH: usize = 4096;

/// Error returned when a credential cannot be hashed or verified
#[derive(Debug, thiserror::Error)]
pub enum HashingError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password exceeds {MAX_PASSWORD_LENGTH} bytes")]
    PasswordTooLong,

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    #[error("Password hashing failed: {0}")]
    Backend(String),
}

/// Password hashing collaborator.
///
/// `identity` is the account the credential belongs to; implementations may use
/// it for salting policy or diagnostics.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext credential for the given account
    fn hash(&self, identity: &User, plaintext: &str) -> Result<String, HashingError>;

    /// Check a plaintext credential against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError>;
}

/// Argon2id hasher with a random salt per hash
#[derive(Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, identity: &User, plaintext: &str) -> Result<String, HashingError> {
        if plaintext.is_empty() {
            return Err(HashingError::EmptyPassword);
        }
        if plaintext.len() > MAX_PASSWORD_LENGTH {
            return Err(HashingError::PasswordTooLong);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashingError::Backend(e.to_string()))?;

        tracing::debug!(email = %identity.email, "Hashed credential");

        Ok(password_hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| HashingError::InvalidHash(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> User {
        User::new(
            "reader@actu.news".to_string(),
            "Ada".to_string(),
            "Reader".to_string(),
            String::new(),
        )
    }

    #[test]
    fn test_hash_produces_argon2id_hash() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash(&identity(), "test_password_123").unwrap();

        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = Argon2CredentialHasher::new();
        let hash1 = hasher.hash(&identity(), "same_password").unwrap();
        let hash2 = hasher.hash(&identity(), "same_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash(&identity(), "p@ss").unwrap();

        assert!(hasher.verify("p@ss", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = Argon2CredentialHasher::new();
        let result = hasher.verify("password", "invalid_hash_format");

        assert!(matches!(result, Err(HashingError::InvalidHash(_))));
    }

    #[test]
    fn test_hash_rejects_empty_password() {
        let hasher = Argon2CredentialHasher::new();
        let result = hasher.hash(&identity(), "");

        assert!(matches!(result, Err(HashingError::EmptyPassword)));
    }

    #[test]
    fn test_hash_rejects_overlong_password() {
        let hasher = Argon2CredentialHasher::new();
        let result = hasher.hash(&identity(), &"a".repeat(MAX_PASSWORD_LENGTH + 1));

        assert!(matches!(result, Err(HashingError::PasswordTooLong)));
    }

    #[test]
    fn test_hash_unicode_password() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash(&identity(), "mot de passe très sûr 🔐").unwrap();

        assert!(hasher.verify("mot de passe très sûr 🔐", &hash).unwrap());
    }

    #[test]
    fn test_hash_does_not_contain_plaintext() {
        let hasher = Argon2CredentialHasher::new();
        let password = "my_secret_password";
        let hash = hasher.hash(&identity(), password).unwrap();

        assert_ne!(password, hash);
        assert!(!hash.contains(password));
    }
}
