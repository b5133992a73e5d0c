//! Shared test harness: in-memory persistence, a manual clock and an
//! in-memory photo store wired into the real services and router.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use blog_backend::api::{create_router, AppState};
use blog_backend::domain::{
    Argon2Hasher, Blog, BlogChanges, BlogDetails, Comment, CommentDetails, NewBlog, NewComment,
    NewUser, PasswordConfig, RefreshTokenRecord, User,
};
use blog_backend::errors::{AppError, AppResult};
use blog_backend::infra::{
    decode_photo, BlogRepository, CommentRepository, PhotoStore, RefreshTokenRepository,
    UnitOfWork, UserRepository,
};
use blog_backend::services::{Clock, Services, TokenService, TokenSettings};

pub const ACCESS_SECRET: &[u8] = b"integration-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &[u8] = b"integration-refresh-secret-0123456789abcdef";

/// Clock that only moves when told to
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// All tables in memory
#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<HashMap<Uuid, User>>,
    refresh_tokens: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
    blogs: Mutex<HashMap<Uuid, Blog>>,
    comments: Mutex<Vec<Comment>>,
    fail_token_writes: AtomicBool,
}

impl MemoryDb {
    pub fn stored_refresh_token(&self, user_id: Uuid) -> Option<String> {
        self.refresh_tokens
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|r| r.token.clone())
    }

    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.lock().unwrap().len()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }

    /// Make every refresh-token write fail like a lost database connection
    pub fn fail_token_writes(&self) {
        self.fail_token_writes.store(true, Ordering::SeqCst);
    }

    fn token_write_error(&self) -> AppResult<()> {
        if self.fail_token_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(DbErr::Custom(
                "refresh_tokens unavailable".to_string(),
            )));
        }
        Ok(())
    }

    fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::conflict("Email or username already exists"));
        }

        let user = user.into_user(Utc::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    fn upsert_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.token_write_error()?;
        self.refresh_tokens.lock().unwrap().insert(
            user_id,
            RefreshTokenRecord {
                user_id,
                token: token.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.users.lock().unwrap().values().any(|u| u.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.insert_user(user)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryDb {
    async fn upsert_by_user_id(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.upsert_token(user_id, token)
    }

    async fn find_by_user_id_and_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let record = self
            .refresh_tokens
            .lock()
            .unwrap()
            .get(&user_id)
            .filter(|r| r.token == token)
            .cloned();

        // A real database round trip lets concurrent requests interleave here
        tokio::task::yield_now().await;
        Ok(record)
    }

    async fn rotate(&self, user_id: Uuid, current: &str, replacement: &str) -> AppResult<bool> {
        self.token_write_error()?;
        let mut tokens = self.refresh_tokens.lock().unwrap();
        match tokens.get_mut(&user_id) {
            Some(record) if record.token == current => {
                record.token = replacement.to_string();
                record.created_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<u64> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, r| r.token != token);
        Ok((before - tokens.len()) as u64)
    }
}

#[async_trait]
impl BlogRepository for MemoryDb {
    async fn create(&self, blog: NewBlog) -> AppResult<Blog> {
        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            content: blog.content,
            photo_path: blog.photo_path,
            author_id: blog.author_id,
            created_at: now,
            updated_at: now,
        };
        self.blogs.lock().unwrap().insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Blog>> {
        Ok(self.blogs.lock().unwrap().get(&id).cloned())
    }

    async fn find_details(&self, id: Uuid) -> AppResult<Option<BlogDetails>> {
        let Some(blog) = self.blogs.lock().unwrap().get(&id).cloned() else {
            return Ok(None);
        };
        let users = self.users.lock().unwrap();
        let author = users.get(&blog.author_id);

        Ok(Some(BlogDetails {
            author_name: author.map(|a| a.name.clone()).unwrap_or_default(),
            author_username: author.map(|a| a.username.clone()).unwrap_or_default(),
            blog,
        }))
    }

    async fn list(&self) -> AppResult<Vec<Blog>> {
        let mut blogs: Vec<Blog> = self.blogs.lock().unwrap().values().cloned().collect();
        blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(blogs)
    }

    async fn update(&self, id: Uuid, changes: BlogChanges) -> AppResult<Blog> {
        let mut blogs = self.blogs.lock().unwrap();
        let blog = blogs.get_mut(&id).ok_or(AppError::NotFound)?;

        blog.title = changes.title;
        blog.content = changes.content;
        if let Some(photo_path) = changes.photo_path {
            blog.photo_path = photo_path;
        }
        blog.updated_at = Utc::now();
        Ok(blog.clone())
    }
}

#[async_trait]
impl CommentRepository for MemoryDb {
    async fn create(&self, comment: NewComment) -> AppResult<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            content: comment.content,
            blog_id: comment.blog_id,
            author_id: comment.author_id,
            created_at: Utc::now(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn list_for_blog(&self, blog_id: Uuid) -> AppResult<Vec<CommentDetails>> {
        let users = self.users.lock().unwrap();
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .map(|c| CommentDetails {
                comment: c.clone(),
                author_username: users
                    .get(&c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }
}

/// Unit of work over [`MemoryDb`]
pub struct MemoryUow {
    pub db: Arc<MemoryDb>,
}

#[async_trait]
impl UnitOfWork for MemoryUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.db.clone()
    }

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        self.db.clone()
    }

    fn blogs(&self) -> Arc<dyn BlogRepository> {
        self.db.clone()
    }

    fn comments(&self) -> Arc<dyn CommentRepository> {
        self.db.clone()
    }

    async fn register_user(&self, user: NewUser, refresh_token: &str) -> AppResult<User> {
        let user = self.db.insert_user(user)?;
        if let Err(e) = self.db.upsert_token(user.id, refresh_token) {
            // Roll back the user row like the database transaction does
            self.db.users.lock().unwrap().remove(&user.id);
            return Err(e);
        }
        Ok(user)
    }

    async fn delete_blog_with_comments(&self, blog_id: Uuid) -> AppResult<bool> {
        let removed = self.db.blogs.lock().unwrap().remove(&blog_id).is_some();
        self.db
            .comments
            .lock()
            .unwrap()
            .retain(|c| c.blog_id != blog_id);
        Ok(removed)
    }
}

/// Photo store keeping decoded files in memory
#[derive(Default)]
pub struct MemoryPhotoStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl MemoryPhotoStore {
    pub fn contains(&self, url: &str) -> bool {
        self.files.lock().unwrap().contains_key(url)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn save(&self, owner: Uuid, encoded: &str) -> AppResult<String> {
        let bytes = decode_photo(encoded)?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let url = format!("http://localhost:5000/storage/{}-{}.png", n, owner);
        self.files.lock().unwrap().insert(url.clone(), bytes);
        Ok(url)
    }

    async fn remove(&self, public_url: &str) -> AppResult<()> {
        self.files.lock().unwrap().remove(public_url);
        Ok(())
    }
}

/// Real services over in-memory collaborators
pub struct TestApp {
    pub db: Arc<MemoryDb>,
    pub clock: Arc<ManualClock>,
    pub photos: Arc<MemoryPhotoStore>,
    pub tokens: TokenService,
    pub services: Services,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let clock = ManualClock::new();
        let photos = Arc::new(MemoryPhotoStore::default());
        let tokens = TokenService::new(
            TokenSettings::new(ACCESS_SECRET, REFRESH_SECRET),
            clock.clone(),
        );

        let services = Services::from_parts(
            Arc::new(MemoryUow { db: db.clone() }),
            tokens.clone(),
            Arc::new(Argon2Hasher::new(PasswordConfig::low_cost())),
            photos.clone(),
        );

        Self {
            db,
            clock,
            photos,
            tokens,
            services,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::from_container(&self.services, None)
    }

    pub fn router(&self) -> Router {
        create_router(self.state(), std::env::temp_dir())
    }
}
