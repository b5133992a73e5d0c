//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs the multi-row writes that must
//! succeed or fail together (registration, blog deletion) inside one
//! database transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    delete_blog, delete_for_blog, insert_user, upsert_token, BlogRepository, BlogStore,
    CommentRepository, CommentStore, RefreshTokenRepository, RefreshTokenStore, UserRepository,
    UserStore,
};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get refresh token repository
    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository>;

    /// Get blog repository
    fn blogs(&self) -> Arc<dyn BlogRepository>;

    /// Get comment repository
    fn comments(&self) -> Arc<dyn CommentRepository>;

    /// Create the user and store its first refresh token atomically.
    ///
    /// If either write fails nothing is persisted.
    async fn register_user(&self, user: NewUser, refresh_token: &str) -> AppResult<User>;

    /// Delete a blog and all of its comments atomically.
    ///
    /// Returns `false` if the blog did not exist.
    async fn delete_blog_with_comments(&self, blog_id: Uuid) -> AppResult<bool>;
}

/// Transaction context providing write access within a transaction.
///
/// All operations performed through this context are part of the same
/// database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        insert_user(self.txn, user).await
    }

    pub async fn upsert_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        upsert_token(self.txn, user_id, token).await
    }

    pub async fn delete_comments_for_blog(&self, blog_id: Uuid) -> AppResult<u64> {
        delete_for_blog(self.txn, blog_id).await
    }

    pub async fn delete_blog(&self, blog_id: Uuid) -> AppResult<u64> {
        delete_blog(self.txn, blog_id).await
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    refresh_token_repo: Arc<RefreshTokenStore>,
    blog_repo: Arc<BlogStore>,
    comment_repo: Arc<CommentStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            refresh_token_repo: Arc::new(RefreshTokenStore::new(db.clone())),
            blog_repo: Arc::new(BlogStore::new(db.clone())),
            comment_repo: Arc::new(CommentStore::new(db.clone())),
            db,
        }
    }

    /// Run `f` in a transaction, committing on success and rolling back on error.
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        self.refresh_token_repo.clone()
    }

    fn blogs(&self) -> Arc<dyn BlogRepository> {
        self.blog_repo.clone()
    }

    fn comments(&self) -> Arc<dyn CommentRepository> {
        self.comment_repo.clone()
    }

    async fn register_user(&self, user: NewUser, refresh_token: &str) -> AppResult<User> {
        let refresh_token = refresh_token.to_owned();

        self.execute_transaction(IsolationLevel::ReadCommitted, move |ctx| {
            Box::pin(async move {
                let user = ctx.insert_user(user).await?;
                ctx.upsert_refresh_token(user.id, &refresh_token).await?;
                Ok(user)
            })
        })
        .await
    }

    async fn delete_blog_with_comments(&self, blog_id: Uuid) -> AppResult<bool> {
        self.execute_transaction(IsolationLevel::ReadCommitted, move |ctx| {
            Box::pin(async move {
                let comments = ctx.delete_comments_for_blog(blog_id).await?;
                let blogs = ctx.delete_blog(blog_id).await?;
                tracing::debug!(%blog_id, comments, "Blog deleted with its comments");
                Ok(blogs > 0)
            })
        })
        .await
    }
}
