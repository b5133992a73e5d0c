//! Blog repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::blog::{self, ActiveModel, Entity as BlogEntity};
use super::entities::user::Entity as UserEntity;
use crate::domain::{Blog, BlogChanges, BlogDetails, NewBlog};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(&self, blog: NewBlog) -> AppResult<Blog>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Blog>>;

    /// Blog together with its author's name and username
    async fn find_details(&self, id: Uuid) -> AppResult<Option<BlogDetails>>;

    /// All blogs, newest first
    async fn list(&self) -> AppResult<Vec<Blog>>;

    async fn update(&self, id: Uuid, changes: BlogChanges) -> AppResult<Blog>;
}

pub struct BlogStore {
    db: DatabaseConnection,
}

impl BlogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn delete_blog<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<u64> {
    let result = BlogEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}

#[async_trait]
impl BlogRepository for BlogStore {
    async fn create(&self, blog: NewBlog) -> AppResult<Blog> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(blog.title),
            content: Set(blog.content),
            photo_path: Set(blog.photo_path),
            author_id: Set(blog.author_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Blog::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Blog>> {
        let result = BlogEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Blog::from))
    }

    async fn find_details(&self, id: Uuid) -> AppResult<Option<BlogDetails>> {
        let result = BlogEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await?;

        let Some((blog, author)) = result else {
            return Ok(None);
        };
        let author = author.ok_or_else(|| {
            AppError::internal(format!("Blog {} references a missing author", blog.id))
        })?;

        Ok(Some(BlogDetails {
            blog: Blog::from(blog),
            author_name: author.name,
            author_username: author.username,
        }))
    }

    async fn list(&self) -> AppResult<Vec<Blog>> {
        let models = BlogEntity::find()
            .order_by_desc(blog::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Blog::from).collect())
    }

    async fn update(&self, id: Uuid, changes: BlogChanges) -> AppResult<Blog> {
        let blog = BlogEntity::find()
            .filter(blog::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = blog.into();
        active.title = Set(changes.title);
        active.content = Set(changes.content);
        if let Some(photo_path) = changes.photo_path {
            active.photo_path = Set(photo_path);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Blog::from(model))
    }
}
