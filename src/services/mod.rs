//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, with the Unit of Work as the single entry point
//! to persistence.

mod auth_service;
mod blog_service;
mod comment_service;
pub mod container;
mod token_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, AuthSession, Authenticator};
pub use blog_service::{BlogManager, BlogService};
pub use comment_service::{CommentManager, CommentService};
pub use token_service::{Claims, Clock, SystemClock, TokenError, TokenService, TokenSettings};
