//! Cookie session authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::api::{cookies, AppState};
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated user resolved from the access token cookie
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
        }
    }
}

/// Session authentication middleware.
///
/// Verifies the `accessToken` cookie, loads its user and injects the
/// CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies::access_token(&jar).ok_or(AppError::Unauthorized)?;
    let user = state.auth_service.authenticate(token).await?;

    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}
