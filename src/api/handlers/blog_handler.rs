//! Blog handlers. Every route requires a session.

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
use crate::domain::{BlogDetailsResponse, BlogDraft, BlogEdit, BlogResponse};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// New blog request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "My first post")]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Base64 image, optionally as a `data:image/png;base64,` URL
    #[validate(length(min = 1, message = "Photo is required"))]
    pub photo: String,
}

/// Blog update request; omit `photo` to keep the current one
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub blog_id: Uuid,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogEnvelope {
    pub blog: BlogResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogDetailsEnvelope {
    pub blog: BlogDetailsResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogListEnvelope {
    pub blogs: Vec<BlogResponse>,
}

/// Create blog routes
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_blog).put(update_blog))
        .route("/all", get(list_blogs))
        .route("/:id", get(get_blog).delete(delete_blog))
}

/// Create a blog authored by the current user
#[utoipa::path(
    post,
    path = "/blog",
    tag = "Blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog created", body = BlogEnvelope),
        (status = 400, description = "Validation error or undecodable photo"),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = []))
)]
pub async fn create_blog(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateBlogRequest>,
) -> AppResult<(StatusCode, Json<BlogEnvelope>)> {
    let blog = state
        .blog_service
        .create(
            current_user.id,
            BlogDraft {
                title: payload.title,
                content: payload.content,
                photo: payload.photo,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BlogEnvelope {
            blog: BlogResponse::from(blog),
        }),
    ))
}

/// List all blogs, newest first
#[utoipa::path(
    get,
    path = "/blog/all",
    tag = "Blogs",
    responses(
        (status = 200, description = "All blogs", body = BlogListEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("cookie_auth" = []))
)]
pub async fn list_blogs(State(state): State<AppState>) -> AppResult<Json<BlogListEnvelope>> {
    let blogs = state.blog_service.list().await?;

    Ok(Json(BlogListEnvelope {
        blogs: blogs.into_iter().map(BlogResponse::from).collect(),
    }))
}

/// Get a blog with its author
#[utoipa::path(
    get,
    path = "/blog/{id}",
    tag = "Blogs",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog found", body = BlogDetailsEnvelope),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blog not found")
    ),
    security(("cookie_auth" = []))
)]
pub async fn get_blog(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<BlogDetailsEnvelope>> {
    let details = state.blog_service.get(id).await?;

    Ok(Json(BlogDetailsEnvelope {
        blog: BlogDetailsResponse::from(details),
    }))
}

/// Update one of the current user's blogs
#[utoipa::path(
    put,
    path = "/blog",
    tag = "Blogs",
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = MessageResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Blog not found")
    ),
    security(("cookie_auth" = []))
)]
pub async fn update_blog(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateBlogRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .blog_service
        .update(
            current_user.id,
            BlogEdit {
                blog_id: payload.blog_id,
                title: payload.title,
                content: payload.content,
                photo: payload.photo.filter(|p| !p.is_empty()),
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("Blog updated")))
}

/// Delete one of the current user's blogs and its comments
#[utoipa::path(
    delete,
    path = "/blog/{id}",
    tag = "Blogs",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog deleted", body = MessageResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Blog not found")
    ),
    security(("cookie_auth" = []))
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.blog_service.delete(current_user.id, id).await?;

    Ok(Json(MessageResponse::new("Blog deleted")))
}
