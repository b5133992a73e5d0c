//! Token service - Issues, verifies and persists session tokens.
//!
//! Access and refresh tokens are HS256 JWTs signed with distinct secrets.
//! Expiry is checked against an injected [`Clock`] instead of the system
//! time so that validity windows can be tested deterministically.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{Config, ACCESS_TOKEN_TTL_MINUTES, REFRESH_TOKEN_TTL_MINUTES};
use crate::domain::TokenPair;
use crate::errors::AppResult;
use crate::infra::RefreshTokenRepository;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Claims embedded in both token kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Random token id; keeps tokens issued within the same second distinct
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Token signing and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

/// Secrets and validity windows for both token kinds.
#[derive(Clone)]
pub struct TokenSettings {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access_secret: access_secret.to_vec(),
            refresh_secret: refresh_secret.to_vec(),
            access_ttl: Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            refresh_ttl: Duration::minutes(REFRESH_TOKEN_TTL_MINUTES),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.access_secret_bytes(), config.refresh_secret_bytes())
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

/// Stateless token issuer/verifier.
#[derive(Clone)]
pub struct TokenService {
    settings: TokenSettings,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(settings: TokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    /// Token service backed by the wall clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(TokenSettings::from_config(config), Arc::new(SystemClock))
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, user_id)
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, user_id)
    }

    /// Issue a fresh access + refresh pair for `user_id`.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user_id)?,
            refresh_token: self.issue_refresh_token(user_id)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(TokenKind::Access, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(TokenKind::Refresh, token)
    }

    /// Store `token` as the only refresh token of `user_id`, replacing any
    /// earlier one. Older tokens then fail the stored-token check even while
    /// their signature is still valid.
    pub async fn persist_refresh_token(
        &self,
        store: &dyn RefreshTokenRepository,
        token: &str,
        user_id: Uuid,
    ) -> AppResult<()> {
        store.upsert_by_user_id(user_id, token).await?;
        tracing::debug!(%user_id, "Refresh token stored");
        Ok(())
    }

    /// Swap the stored refresh token of `user_id` from `current` to
    /// `replacement`. Returns `false` when `current` is no longer the stored
    /// token, e.g. because a concurrent refresh already rotated it.
    pub async fn rotate_refresh_token(
        &self,
        store: &dyn RefreshTokenRepository,
        user_id: Uuid,
        current: &str,
        replacement: &str,
    ) -> AppResult<bool> {
        let rotated = store.rotate(user_id, current, replacement).await?;
        tracing::debug!(%user_id, rotated, "Refresh token rotation");
        Ok(rotated)
    }

    fn issue(&self, kind: TokenKind, user_id: Uuid) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.settings.ttl(kind)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.settings.secret(kind)),
        )
        .map_err(TokenError::Signing)
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret(kind)),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?
        .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn settings() -> TokenSettings {
        TokenSettings::new(
            b"access-secret-for-tests-0123456789abcdef",
            b"refresh-secret-for-tests-0123456789abcdef",
        )
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = TokenService::new(settings(), ManualClock::new());
        let user_id = Uuid::new_v4();

        let token = service.issue_access_token(user_id).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_refresh_window_is_sixty_minutes() {
        let service = TokenService::new(settings(), ManualClock::new());

        let token = service.issue_refresh_token(Uuid::new_v4()).unwrap();
        let claims = service.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_access_token_expires_after_thirty_minutes() {
        let clock = ManualClock::new();
        let service = TokenService::new(settings(), clock.clone());
        let token = service.issue_access_token(Uuid::new_v4()).unwrap();

        clock.advance(Duration::minutes(29));
        assert!(service.verify_access_token(&token).is_ok());

        clock.advance(Duration::minutes(2));
        assert!(matches!(
            service.verify_access_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let clock = ManualClock::new();
        let service = TokenService::new(settings(), clock.clone());
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        clock.advance(Duration::minutes(45));
        assert!(matches!(
            service.verify_access_token(&pair.access_token),
            Err(TokenError::Expired)
        ));
        assert!(service.verify_refresh_token(&pair.refresh_token).is_ok());

        clock.advance(Duration::minutes(16));
        assert!(matches!(
            service.verify_refresh_token(&pair.refresh_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let service = TokenService::new(settings(), ManualClock::new());
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        assert!(matches!(
            service.verify_refresh_token(&pair.access_token),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            service.verify_access_token(&pair.refresh_token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_and_garbage_tokens_rejected() {
        let service = TokenService::new(settings(), ManualClock::new());
        let token = service.issue_access_token(Uuid::new_v4()).unwrap();
        let other = service.issue_access_token(Uuid::new_v4()).unwrap();

        // Claims of one token with the signature of another
        let (signed_part, _) = token.rsplit_once('.').unwrap();
        let (_, foreign_signature) = other.rsplit_once('.').unwrap();
        let tampered = format!("{}.{}", signed_part, foreign_signature);
        assert!(matches!(
            service.verify_access_token(&tampered),
            Err(TokenError::InvalidSignature)
        ));

        assert!(matches!(
            service.verify_access_token("not.a.token"),
            Err(TokenError::Malformed)
        ));
        assert!(service.verify_access_token("").is_err());
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let service = TokenService::new(settings(), ManualClock::new());
        let user_id = Uuid::new_v4();

        let first = service.issue_refresh_token(user_id).unwrap();
        let second = service.issue_refresh_token(user_id).unwrap();

        assert_ne!(first, second);
    }
}
