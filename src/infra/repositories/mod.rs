//! Repository layer - Data access abstraction
//!
//! Each store wraps a SeaORM connection behind a trait so services can be
//! tested against mocks or in-memory implementations.

mod blog_repository;
mod comment_repository;
pub(crate) mod entities;
mod refresh_token_repository;
mod user_repository;

pub use blog_repository::{BlogRepository, BlogStore};
pub use comment_repository::{CommentRepository, CommentStore};
pub use refresh_token_repository::{RefreshTokenRepository, RefreshTokenStore};
pub use user_repository::{UserRepository, UserStore};

pub(crate) use blog_repository::delete_blog;
pub(crate) use comment_repository::delete_for_blog;
pub(crate) use refresh_token_repository::upsert_token;
pub(crate) use user_repository::insert_user;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use blog_repository::MockBlogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use comment_repository::MockCommentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use refresh_token_repository::MockRefreshTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
