//! Comment entity and projections.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Comment domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub blog_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's username
#[derive(Debug, Clone)]
pub struct CommentDetails {
    pub comment: Comment,
    pub author_username: String,
}

/// Data needed to insert a comment row
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub blog_id: Uuid,
    pub author_id: Uuid,
}

/// Freshly created comment returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub blog: Uuid,
    pub author: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            blog: comment.blog_id,
            author: comment.author_id,
            created_at: comment.created_at,
        }
    }
}

/// Comment as listed under a blog
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetailsResponse {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_username: String,
}

impl From<CommentDetails> for CommentDetailsResponse {
    fn from(details: CommentDetails) -> Self {
        Self {
            id: details.comment.id,
            content: details.comment.content,
            created_at: details.comment.created_at,
            author_username: details.author_username,
        }
    }
}
