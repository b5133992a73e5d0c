//! Blog post entity and projections.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Blog post domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Public URL of the stored photo
    pub photo_path: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Blog joined with its author's public fields
#[derive(Debug, Clone)]
pub struct BlogDetails {
    pub blog: Blog,
    pub author_name: String,
    pub author_username: String,
}

/// Blog submitted by its author; `photo` is still base64 encoded
#[derive(Debug, Clone)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub photo: String,
}

/// Edit of an existing blog; a missing `photo` keeps the stored one
#[derive(Debug, Clone)]
pub struct BlogEdit {
    pub blog_id: Uuid,
    pub title: String,
    pub content: String,
    pub photo: Option<String>,
}

/// Data needed to insert a blog row
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub photo_path: String,
    pub author_id: Uuid,
}

/// Field changes applied by an update; `None` keeps the current photo
#[derive(Debug, Clone)]
pub struct BlogChanges {
    pub title: String,
    pub content: String,
    pub photo_path: Option<String>,
}

/// Blog list entry returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: Uuid,
    pub author: Uuid,
    #[schema(example = "My first post")]
    pub title: String,
    pub content: String,
    #[schema(example = "http://localhost:5000/storage/1691042948876-550e8400.png")]
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            author: blog.author_id,
            title: blog.title,
            content: blog.content,
            photo: blog.photo_path,
            created_at: blog.created_at,
        }
    }
}

/// Single blog with author information
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogDetailsResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub photo: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_username: String,
}

impl From<BlogDetails> for BlogDetailsResponse {
    fn from(details: BlogDetails) -> Self {
        let BlogDetails {
            blog,
            author_name,
            author_username,
        } = details;

        Self {
            id: blog.id,
            title: blog.title,
            content: blog.content,
            photo: blog.photo_path,
            created_at: blog.created_at,
            author_id: blog.author_id,
            author_name,
            author_username,
        }
    }
}
