//! API layer - HTTP handlers and middleware
//!
//! - Request handlers
//! - Session cookie helpers and authentication middleware
//! - Custom extractors
//! - Route definitions

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
