//! HTTP request handlers.

pub mod auth_handler;
pub mod blog_handler;
pub mod comment_handler;

pub use auth_handler::auth_routes;
pub use blog_handler::blog_routes;
pub use comment_handler::comment_routes;
