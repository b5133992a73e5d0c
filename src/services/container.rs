//! Service Container - Centralized service access.
//!
//! Wires the concrete services over one shared Unit of Work so the HTTP
//! layer only ever sees the service traits.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BlogManager, BlogService, CommentManager, CommentService,
    TokenService,
};
use crate::domain::PasswordHasher;
use crate::infra::{PhotoStore, UnitOfWork};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn blogs(&self) -> Arc<dyn BlogService>;

    fn comments(&self) -> Arc<dyn CommentService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    blog_service: Arc<dyn BlogService>,
    comment_service: Arc<dyn CommentService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        blog_service: Arc<dyn BlogService>,
        comment_service: Arc<dyn CommentService>,
    ) -> Self {
        Self {
            auth_service,
            blog_service,
            comment_service,
        }
    }

    /// Build every service over the same unit of work.
    pub fn from_parts<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        tokens: TokenService,
        hasher: Arc<dyn PasswordHasher>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), tokens, hasher)),
            blog_service: Arc::new(BlogManager::new(uow.clone(), photos)),
            comment_service: Arc::new(CommentManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn blogs(&self) -> Arc<dyn BlogService> {
        self.blog_service.clone()
    }

    fn comments(&self) -> Arc<dyn CommentService> {
        self.comment_service.clone()
    }
}
