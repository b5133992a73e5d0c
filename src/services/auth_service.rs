//! Authentication service - Registration, login and session rotation.
//!
//! Every successful register/login/refresh ends with exactly one stored
//! refresh token for the user, so a token rotated out by a later login or
//! refresh no longer passes the stored-token check.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::TokenService;
use crate::domain::{NewUser, PasswordHasher, Registration, TokenPair, User};
use crate::errors::{AppError, AppResult, CredentialFailure};
use crate::infra::UnitOfWork;

const EMAIL_TAKEN: &str = "Email already exists, use another email to register";
const USERNAME_TAKEN: &str = "Username already exists, choose another username";
const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Authenticated user together with freshly issued tokens.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and open its first session
    async fn register(&self, registration: Registration) -> AppResult<AuthSession>;

    /// Check credentials and open a session, replacing any earlier one
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Forget the stored refresh token, if any
    async fn logout(&self, refresh_token: Option<&str>) -> AppResult<()>;

    /// Trade a valid, current refresh token for a new pair
    async fn refresh(&self, refresh_token: Option<&str>) -> AppResult<AuthSession>;

    /// Resolve the user behind an access token
    async fn authenticate(&self, access_token: &str) -> AppResult<User>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenService,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, tokens: TokenService, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            uow,
            tokens,
            hasher,
        }
    }

    /// Issue a pair for `user` and make its refresh token the stored one.
    async fn open_session(&self, user: User) -> AppResult<AuthSession> {
        let tokens = self.tokens.issue_pair(user.id)?;
        self.tokens
            .persist_refresh_token(
                self.uow.refresh_tokens().as_ref(),
                &tokens.refresh_token,
                user.id,
            )
            .await?;

        Ok(AuthSession { user, tokens })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<AuthSession> {
        // Field shapes are validated by the handler's ValidatedJson extractor
        if registration.password != registration.confirm_password {
            return Err(AppError::validation(PASSWORD_MISMATCH));
        }

        let users = self.uow.users();
        let (email_taken, username_taken) = tokio::try_join!(
            users.exists_by_email(&registration.email),
            users.exists_by_username(&registration.username),
        )?;

        if email_taken {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }
        if username_taken {
            return Err(AppError::conflict(USERNAME_TAKEN));
        }

        let password_hash = self.hasher.hash(&registration.password).await?;

        // The id is fixed up front so the session can be stored with the user
        let user_id = Uuid::new_v4();
        let tokens = self.tokens.issue_pair(user_id)?;

        let user = self
            .uow
            .register_user(
                NewUser {
                    id: user_id,
                    username: registration.username,
                    email: registration.email,
                    name: registration.name,
                    password_hash,
                },
                &tokens.refresh_token,
            )
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(AuthSession { user, tokens })
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let user = self
            .uow
            .users()
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials(CredentialFailure::UnknownEmail))?;

        if !self.hasher.compare(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials(CredentialFailure::WrongPassword));
        }

        let session = self.open_session(user).await?;
        tracing::debug!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    async fn logout(&self, refresh_token: Option<&str>) -> AppResult<()> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        let removed = self.uow.refresh_tokens().delete_by_token(token).await?;
        tracing::debug!(removed, "Refresh token revoked");
        Ok(())
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> AppResult<AuthSession> {
        let token = refresh_token.ok_or(AppError::Unauthorized)?;

        let claims = self.tokens.verify_refresh_token(token).map_err(|e| {
            tracing::debug!("Refresh token rejected: {}", e);
            AppError::Unauthorized
        })?;

        // Rotated-out tokens verify but no longer match the stored one
        self.uow
            .refresh_tokens()
            .find_by_user_id_and_token(claims.sub, token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // The lookup above can race another refresh; only the swap decides
        let tokens = self.tokens.issue_pair(user.id)?;
        let rotated = self
            .tokens
            .rotate_refresh_token(
                self.uow.refresh_tokens().as_ref(),
                user.id,
                token,
                &tokens.refresh_token,
            )
            .await?;
        if !rotated {
            tracing::debug!(user_id = %user.id, "Refresh token already rotated");
            return Err(AppError::Unauthorized);
        }

        Ok(AuthSession { user, tokens })
    }

    async fn authenticate(&self, access_token: &str) -> AppResult<User> {
        let claims = self.tokens.verify_access_token(access_token).map_err(|e| {
            tracing::debug!("Access token rejected: {}", e);
            AppError::Unauthorized
        })?;

        self.uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
