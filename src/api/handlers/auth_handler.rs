//! Authentication handlers.
//!
//! Tokens never appear in response bodies; they are set and cleared as
//! http-only cookies.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, routing::post, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::{cookies, AppState};
use crate::domain::{validate_password_pattern, Registration, UserResponse};
use crate::errors::AppResult;
use crate::services::AuthSession;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 5, max = 30, message = "Username must be 5-30 characters"))]
    #[schema(example = "alice1", min_length = 5, max_length = 30)]
    pub username: String,
    #[validate(length(min = 1, max = 30, message = "Name must be 1-30 characters"))]
    #[schema(example = "Alice", max_length = 30)]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    /// 8-25 letters or digits with a lowercase, an uppercase and a digit
    #[validate(custom(function = "validate_password_pattern"))]
    #[schema(example = "Abcdef12")]
    pub password: String,
    /// Must repeat `password`
    #[schema(example = "Abcdef12")]
    pub confirm_password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            name: request.name,
            email: request.email,
            password: request.password,
            confirm_password: request.confirm_password,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(custom(function = "validate_password_pattern"))]
    #[schema(example = "Abcdef12")]
    pub password: String,
}

/// Session state returned by every auth endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: Option<UserResponse>,
    pub auth: bool,
}

impl AuthResponse {
    fn signed_in(session: &AuthSession) -> Self {
        Self {
            user: Some(UserResponse::from(session.user.clone())),
            auth: true,
        }
    }

    fn signed_out() -> Self {
        Self {
            user: None,
            auth: false,
        }
    }
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", get(refresh))
}

/// Register a new user and open a session
#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, session cookies set", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let session = state.auth_service.register(payload.into()).await?;
    let body = AuthResponse::signed_in(&session);

    Ok((
        StatusCode::CREATED,
        cookies::set_session(jar, session.tokens),
        Json(body),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookies set", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let session = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    let body = AuthResponse::signed_in(&session);

    Ok((cookies::set_session(jar, session.tokens), Json(body)))
}

/// Revoke the stored refresh token and clear both cookies
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logged out, cookies cleared", body = AuthResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    state
        .auth_service
        .logout(cookies::refresh_token(&jar))
        .await?;

    Ok((cookies::clear_session(jar), Json(AuthResponse::signed_out())))
}

/// Rotate the session using the refresh token cookie
#[utoipa::path(
    get,
    path = "/refresh",
    tag = "Authentication",
    responses(
        (status = 200, description = "Tokens rotated, new cookies set", body = AuthResponse),
        (status = 401, description = "Missing, invalid, expired or rotated-out refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let session = state
        .auth_service
        .refresh(cookies::refresh_token(&jar))
        .await?;
    let body = AuthResponse::signed_in(&session);

    Ok((cookies::set_session(jar, session.tokens), Json(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "alice1".to_string(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password: "Abcdef12".to_string(),
            confirm_password: "Abcdef12".to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request().validate().is_ok());

        let mut short_username = register_request();
        short_username.username = "bob".to_string();
        assert!(short_username.validate().is_err());

        let mut bad_email = register_request();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut weak_password = register_request();
        weak_password.password = "abcdefgh".to_string();
        assert!(weak_password.validate().is_err());
    }

    #[test]
    fn test_register_request_is_camel_case() {
        let json = r#"{"username":"alice1","name":"Alice","email":"a@x.com","password":"Abcdef12","confirmPassword":"Abcdef12"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.confirm_password, "Abcdef12");
    }
}
