//! Comment repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::comment::{self, ActiveModel, Entity as CommentEntity};
use super::entities::user::Entity as UserEntity;
use crate::domain::{Comment, CommentDetails, NewComment};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> AppResult<Comment>;

    /// Comments of one blog with author usernames, oldest first
    async fn list_for_blog(&self, blog_id: Uuid) -> AppResult<Vec<CommentDetails>>;
}

pub struct CommentStore {
    db: DatabaseConnection,
}

impl CommentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn delete_for_blog<C: ConnectionTrait>(conn: &C, blog_id: Uuid) -> AppResult<u64> {
    let result = CommentEntity::delete_many()
        .filter(comment::Column::BlogId.eq(blog_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

#[async_trait]
impl CommentRepository for CommentStore {
    async fn create(&self, comment: NewComment) -> AppResult<Comment> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            content: Set(comment.content),
            blog_id: Set(comment.blog_id),
            author_id: Set(comment.author_id),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Comment::from(model))
    }

    async fn list_for_blog(&self, blog_id: Uuid) -> AppResult<Vec<CommentDetails>> {
        let rows = CommentEntity::find()
            .filter(comment::Column::BlogId.eq(blog_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentDetails {
                comment: Comment::from(comment),
                author_username: author.map(|a| a.username).unwrap_or_default(),
            })
            .collect())
    }
}
