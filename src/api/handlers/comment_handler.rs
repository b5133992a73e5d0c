//! Comment handlers. Every route requires a session.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{PathParam, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CommentDetailsResponse, CommentResponse};
use crate::errors::AppResult;

/// New comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    #[schema(example = "Great post!")]
    pub content: String,
    pub blog_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentEnvelope {
    pub comment: CommentResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListEnvelope {
    pub data: Vec<CommentDetailsResponse>,
}

/// Create comment routes
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/:id", get(list_comments))
}

/// Comment on a blog as the current user
#[utoipa::path(
    post,
    path = "/comment",
    tag = "Comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentEnvelope),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blog not found")
    ),
    security(("cookie_auth" = []))
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentEnvelope>)> {
    let comment = state
        .comment_service
        .create(current_user.id, payload.blog_id, payload.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentEnvelope {
            comment: CommentResponse::from(comment),
        }),
    ))
}

/// Comments of a blog, oldest first
#[utoipa::path(
    get,
    path = "/comment/{id}",
    tag = "Comments",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Comments of the blog", body = CommentListEnvelope),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = []))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    PathParam(blog_id): PathParam<Uuid>,
) -> AppResult<Json<CommentListEnvelope>> {
    let comments = state.comment_service.list_for_blog(blog_id).await?;

    Ok(Json(CommentListEnvelope {
        data: comments
            .into_iter()
            .map(CommentDetailsResponse::from)
            .collect(),
    }))
}
