//! Comment service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Comment, CommentDetails, NewComment};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Comment service trait for dependency injection.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Comment on an existing blog as `author_id`
    async fn create(&self, author_id: Uuid, blog_id: Uuid, content: String) -> AppResult<Comment>;

    /// Comments of a blog, oldest first
    async fn list_for_blog(&self, blog_id: Uuid) -> AppResult<Vec<CommentDetails>>;
}

/// Concrete implementation of CommentService.
pub struct CommentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CommentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CommentService for CommentManager<U> {
    async fn create(&self, author_id: Uuid, blog_id: Uuid, content: String) -> AppResult<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::validation("Comment content must not be empty"));
        }

        self.uow.blogs().find_by_id(blog_id).await?.ok_or_not_found()?;

        let comment = self
            .uow
            .comments()
            .create(NewComment {
                content,
                blog_id,
                author_id,
            })
            .await?;

        tracing::debug!(comment_id = %comment.id, %blog_id, "Comment created");
        Ok(comment)
    }

    async fn list_for_blog(&self, blog_id: Uuid) -> AppResult<Vec<CommentDetails>> {
        self.uow.comments().list_for_blog(blog_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{Blog, NewUser, User};
    use crate::infra::{
        BlogRepository, CommentRepository, MockBlogRepository, MockCommentRepository,
        RefreshTokenRepository, UserRepository,
    };

    struct StubUow {
        blogs: Arc<MockBlogRepository>,
        comments: Arc<MockCommentRepository>,
    }

    #[async_trait]
    impl UnitOfWork for StubUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            unimplemented!("not used by comments")
        }

        fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
            unimplemented!("not used by comments")
        }

        fn blogs(&self) -> Arc<dyn BlogRepository> {
            self.blogs.clone()
        }

        fn comments(&self) -> Arc<dyn CommentRepository> {
            self.comments.clone()
        }

        async fn register_user(&self, _user: NewUser, _refresh_token: &str) -> AppResult<User> {
            unimplemented!("not used by comments")
        }

        async fn delete_blog_with_comments(&self, _blog_id: Uuid) -> AppResult<bool> {
            unimplemented!("not used by comments")
        }
    }

    fn manager(blogs: MockBlogRepository, comments: MockCommentRepository) -> CommentManager<StubUow> {
        CommentManager::new(Arc::new(StubUow {
            blogs: Arc::new(blogs),
            comments: Arc::new(comments),
        }))
    }

    #[tokio::test]
    async fn test_blank_comment_rejected() {
        let result = manager(MockBlogRepository::new(), MockCommentRepository::new())
            .create(Uuid::new_v4(), Uuid::new_v4(), "   ".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_comment_on_unknown_blog() {
        let mut blogs = MockBlogRepository::new();
        blogs.expect_find_by_id().returning(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_create().never();

        let result = manager(blogs, comments)
            .create(Uuid::new_v4(), Uuid::new_v4(), "Nice post".to_string())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_comment_created_for_author() {
        let author_id = Uuid::new_v4();
        let blog_id = Uuid::new_v4();

        let mut blogs = MockBlogRepository::new();
        blogs.expect_find_by_id().returning(move |id| {
            Ok(Some(Blog {
                id,
                title: "Title".to_string(),
                content: "Content".to_string(),
                photo_path: "http://localhost:5000/storage/1-a.png".to_string(),
                author_id: Uuid::new_v4(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let mut comments = MockCommentRepository::new();
        comments.expect_create().times(1).returning(|new| {
            Ok(Comment {
                id: Uuid::new_v4(),
                content: new.content,
                blog_id: new.blog_id,
                author_id: new.author_id,
                created_at: Utc::now(),
            })
        });

        let comment = manager(blogs, comments)
            .create(author_id, blog_id, "Nice post".to_string())
            .await
            .unwrap();

        assert_eq!(comment.author_id, author_id);
        assert_eq!(comment.blog_id, blog_id);
    }
}
