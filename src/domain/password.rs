//! Password value object - Domain layer password handling.
//!
//! Hashing uses Argon2id with a random salt per hash. The PHC string
//! stores its own parameters, so verification works for any cost setting.

use std::borrow::Cow;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use validator::ValidationError;

use crate::config::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Message shown when a password does not satisfy the complexity rule
pub const PASSWORD_PATTERN_MESSAGE: &str =
    "Password must be 8-25 letters or digits with at least one lowercase letter, one uppercase letter and one digit";

/// Argon2 cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    /// Cheapest parameters Argon2 accepts. Only meant for tests.
    pub fn low_cost() -> Self {
        Self {
            memory_cost: Params::MIN_M_COST,
            time_cost: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn argon2(&self) -> AppResult<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

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
    /// Hash a plain text password with the given cost parameters.
    pub fn new(plain_text: &str, config: &PasswordConfig) -> AppResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = config
            .argon2()?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A malformed stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

/// Password hashing collaborator.
///
/// Hashing is CPU-bound, so implementations must not block the async runtime.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted one-way hash of `plain_text`
    async fn hash(&self, plain_text: &str) -> AppResult<String>;

    /// Check `plain_text` against a stored hash
    async fn compare(&self, plain_text: &str, hash: &str) -> AppResult<bool>;
}

/// Argon2id hasher running on the blocking thread pool.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    config: PasswordConfig,
}

impl Argon2Hasher {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plain_text: &str) -> AppResult<String> {
        let plain_text = plain_text.to_owned();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || Password::new(&plain_text, &config))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
            .map(Password::into_string)
    }

    async fn compare(&self, plain_text: &str, hash: &str) -> AppResult<bool> {
        let plain_text = plain_text.to_owned();
        let stored = Password::from_hash(hash.to_owned());

        tokio::task::spawn_blocking(move || stored.verify(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
    }
}

/// Complexity rule for passwords: 8-25 ASCII letters or digits, with at
/// least one lowercase letter, one uppercase letter and one digit.
pub fn validate_password_pattern(password: &str) -> Result<(), ValidationError> {
    let length_ok = (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password.len());
    let charset_ok = password.chars().all(|c| c.is_ascii_alphanumeric());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if length_ok && charset_ok && has_lower && has_upper && has_digit {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_pattern");
        error.message = Some(Cow::Borrowed(PASSWORD_PATTERN_MESSAGE));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123";
        let password = Password::new(plain, &PasswordConfig::low_cost()).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let password = Password::new(plain, &PasswordConfig::low_cost()).unwrap();
        let hash = password.into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain, &PasswordConfig::low_cost()).unwrap();
        let pass2 = Password::new(plain, &PasswordConfig::low_cost()).unwrap();

        // Different salts produce different hashes
        assert_ne!(pass1.clone().into_string(), pass2.clone().into_string());
        // But both verify correctly
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let plain = "Abcdef12";
        let password = Password::new(plain, &PasswordConfig::default()).unwrap();

        let hash = password.into_string();
        assert!(!hash.contains(plain));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let stored = Password::from_hash("not-a-phc-string".to_string());
        assert!(!stored.verify("Abcdef12"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::new("Abcdef12", &PasswordConfig::low_cost()).unwrap();
        assert!(format!("{:?}", password).contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_hasher_round_trip() {
        let hasher = Argon2Hasher::new(PasswordConfig::low_cost());
        let hash = hasher.hash("Abcdef12").await.unwrap();

        assert!(hasher.compare("Abcdef12", &hash).await.unwrap());
        assert!(!hasher.compare("Abcdef13", &hash).await.unwrap());
    }

    #[test]
    fn test_password_pattern_accepts_valid() {
        assert!(validate_password_pattern("Abcdef12").is_ok());
        assert!(validate_password_pattern("aB3aB3aB3aB3aB3aB3aB3aB3a").is_ok());
    }

    #[test]
    fn test_password_pattern_rejects_invalid() {
        // too short / too long
        assert!(validate_password_pattern("Abcde12").is_err());
        assert!(validate_password_pattern("aB3aB3aB3aB3aB3aB3aB3aB3aB").is_err());
        // missing character classes
        assert!(validate_password_pattern("abcdefg1").is_err());
        assert!(validate_password_pattern("ABCDEFG1").is_err());
        assert!(validate_password_pattern("Abcdefgh").is_err());
        // symbols are outside the allowed alphabet
        assert!(validate_password_pattern("Abcdef12!").is_err());
    }
}
