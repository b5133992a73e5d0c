//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for the writes that span several tables
//! - Local file storage for blog photos

pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    BlogRepository, BlogStore, CommentRepository, CommentStore, RefreshTokenRepository,
    RefreshTokenStore, UserRepository, UserStore,
};
pub use storage::{decode_photo, LocalPhotoStore, PhotoStore};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBlogRepository, MockCommentRepository, MockRefreshTokenRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockPhotoStore;
