//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{AuthService, BlogService, CommentService, ServiceContainer};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub blog_service: Arc<dyn BlogService>,
    pub comment_service: Arc<dyn CommentService>,
    /// Database handle for health checks; absent when running on
    /// in-memory persistence
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Take the services out of a container.
    pub fn from_container(container: &dyn ServiceContainer, database: Option<Arc<Database>>) -> Self {
        Self {
            auth_service: container.auth(),
            blog_service: container.blogs(),
            comment_service: container.comments(),
            database,
        }
    }
}
