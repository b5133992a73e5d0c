//! OpenAPI documentation configuration.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, blog_handler, comment_handler};
use crate::config::ACCESS_TOKEN_COOKIE;
use crate::domain::{
    BlogDetailsResponse, BlogResponse, CommentDetailsResponse, CommentResponse, UserResponse,
};
use crate::types::MessageResponse;

/// OpenAPI documentation for the blog backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Backend",
        version = "0.1.0",
        description = "Blog and comment API with cookie-based session tokens"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::refresh,
        blog_handler::create_blog,
        blog_handler::list_blogs,
        blog_handler::get_blog,
        blog_handler::update_blog,
        blog_handler::delete_blog,
        comment_handler::create_comment,
        comment_handler::list_comments,
    ),
    components(
        schemas(
            UserResponse,
            BlogResponse,
            BlogDetailsResponse,
            CommentResponse,
            CommentDetailsResponse,
            MessageResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::AuthResponse,
            blog_handler::CreateBlogRequest,
            blog_handler::UpdateBlogRequest,
            blog_handler::BlogEnvelope,
            blog_handler::BlogDetailsEnvelope,
            blog_handler::BlogListEnvelope,
            comment_handler::CreateCommentRequest,
            comment_handler::CommentEnvelope,
            comment_handler::CommentListEnvelope,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session rotation"),
        (name = "Blogs", description = "Blog posts"),
        (name = "Comments", description = "Comments on blog posts")
    )
)]
pub struct ApiDoc;

/// Declares the access token cookie as the session security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    ACCESS_TOKEN_COOKIE,
                    "Access token cookie set by /login, /register and /refresh",
                ))),
            );
        }
    }
}
