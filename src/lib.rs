//! Blog backend - cookie-session blog and comment API.
//!
//! Users register and log in to receive an access token and a refresh
//! token as http-only cookies. The refresh token is stored per user and
//! rotated on every login and refresh, so an older token stops working as
//! soon as a newer one is issued.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, value objects and client projections
//! - **services**: Token issuing, authentication, blogs and comments
//! - **infra**: Database, repositories, Unit of Work and photo storage
//! - **api**: HTTP handlers, cookies, middleware and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (runs pending migrations first)
//! cargo run -- serve
//!
//! # Inspect or apply migrations
//! cargo run -- migrate status
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
