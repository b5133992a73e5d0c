//! Blog service - Blog CRUD with photo storage.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Blog, BlogChanges, BlogDetails, BlogDraft, BlogEdit, NewBlog};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{PhotoStore, UnitOfWork};

/// Blog service trait for dependency injection.
#[async_trait]
pub trait BlogService: Send + Sync {
    /// Store the photo and create a blog owned by `author_id`
    async fn create(&self, author_id: Uuid, draft: BlogDraft) -> AppResult<Blog>;

    /// All blogs, newest first
    async fn list(&self) -> AppResult<Vec<Blog>>;

    /// Blog with its author's name and username
    async fn get(&self, id: Uuid) -> AppResult<BlogDetails>;

    /// Change a blog; only its author may do so
    async fn update(&self, editor_id: Uuid, edit: BlogEdit) -> AppResult<Blog>;

    /// Delete a blog and its comments; only its author may do so
    async fn delete(&self, requester_id: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of BlogService.
pub struct BlogManager<U: UnitOfWork> {
    uow: Arc<U>,
    photos: Arc<dyn PhotoStore>,
}

impl<U: UnitOfWork> BlogManager<U> {
    pub fn new(uow: Arc<U>, photos: Arc<dyn PhotoStore>) -> Self {
        Self { uow, photos }
    }

    /// Load a blog the caller is allowed to change.
    async fn owned_blog(&self, user_id: Uuid, id: Uuid) -> AppResult<Blog> {
        let blog = self.uow.blogs().find_by_id(id).await?.ok_or_not_found()?;

        if !blog.is_authored_by(user_id) {
            tracing::debug!(%user_id, blog_id = %id, "Blog change rejected for non-author");
            return Err(AppError::Forbidden);
        }
        Ok(blog)
    }

    /// Remove a photo file, logging rather than failing.
    async fn discard_photo(&self, url: &str) {
        if let Err(e) = self.photos.remove(url).await {
            tracing::warn!(url = %url, "Failed to remove photo: {}", e);
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> BlogService for BlogManager<U> {
    async fn create(&self, author_id: Uuid, draft: BlogDraft) -> AppResult<Blog> {
        let photo_path = self.photos.save(author_id, &draft.photo).await?;

        let blog = self
            .uow
            .blogs()
            .create(NewBlog {
                title: draft.title,
                content: draft.content,
                photo_path: photo_path.clone(),
                author_id,
            })
            .await;

        match blog {
            Ok(blog) => {
                tracing::info!(blog_id = %blog.id, %author_id, "Blog created");
                Ok(blog)
            }
            Err(e) => {
                self.discard_photo(&photo_path).await;
                Err(e)
            }
        }
    }

    async fn list(&self) -> AppResult<Vec<Blog>> {
        self.uow.blogs().list().await
    }

    async fn get(&self, id: Uuid) -> AppResult<BlogDetails> {
        self.uow.blogs().find_details(id).await?.ok_or_not_found()
    }

    async fn update(&self, editor_id: Uuid, edit: BlogEdit) -> AppResult<Blog> {
        let current = self.owned_blog(editor_id, edit.blog_id).await?;

        // The new photo is written before the old one goes away
        let photo_path = match edit.photo.as_deref() {
            Some(photo) => Some(self.photos.save(editor_id, photo).await?),
            None => None,
        };
        let replaced_photo = photo_path.is_some();

        let updated = self
            .uow
            .blogs()
            .update(
                current.id,
                BlogChanges {
                    title: edit.title,
                    content: edit.content,
                    photo_path,
                },
            )
            .await?;

        if replaced_photo {
            self.discard_photo(&current.photo_path).await;
        }

        tracing::info!(blog_id = %updated.id, "Blog updated");
        Ok(updated)
    }

    async fn delete(&self, requester_id: Uuid, id: Uuid) -> AppResult<()> {
        let blog = self.owned_blog(requester_id, id).await?;

        if !self.uow.delete_blog_with_comments(blog.id).await? {
            return Err(AppError::NotFound);
        }
        self.discard_photo(&blog.photo_path).await;

        tracing::info!(blog_id = %id, "Blog deleted");
        Ok(())
    }
}
