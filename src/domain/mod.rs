//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and client projections for users, sessions,
//! blogs and comments. Nothing here touches the database or HTTP.

pub mod blog;
pub mod comment;
pub mod password;
pub mod session;
pub mod user;

pub use blog::{
    Blog, BlogChanges, BlogDetails, BlogDetailsResponse, BlogDraft, BlogEdit, BlogResponse,
    NewBlog,
};
pub use comment::{Comment, CommentDetails, CommentDetailsResponse, CommentResponse, NewComment};
pub use password::{
    validate_password_pattern, Argon2Hasher, Password, PasswordConfig, PasswordHasher,
};
pub use session::{RefreshTokenRecord, TokenPair};
pub use user::{NewUser, Registration, User, UserResponse};
