//! Local file storage for blog photos.
//!
//! Photos arrive as base64 strings (optionally a `data:image/..;base64,`
//! URL), are written under the storage directory and referenced by a
//! public URL below `STORAGE_ROUTE`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::config::{Config, STORAGE_ROUTE};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(png|jpe?g);base64,").expect("valid data URL pattern"));

/// Photo storage collaborator.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Decode and store a photo for `owner`; returns its public URL
    async fn save(&self, owner: Uuid, encoded: &str) -> AppResult<String>;

    /// Remove a previously stored photo by its public URL
    async fn remove(&self, public_url: &str) -> AppResult<()>;
}

/// Decode a base64 photo, accepting an optional data URL prefix.
pub fn decode_photo(encoded: &str) -> AppResult<Vec<u8>> {
    let payload = DATA_URL_PREFIX.replace(encoded.trim(), "");
    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| AppError::validation("Photo must be a base64 encoded image"))?;

    if bytes.is_empty() {
        return Err(AppError::validation("Photo must not be empty"));
    }
    Ok(bytes)
}

/// Photo store writing to a directory on the local disk
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    dir: PathBuf,
    public_base: String,
}

impl LocalPhotoStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.storage_dir.clone(), config.backend_server_path.clone())
    }

    /// Create the storage directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.public_base, STORAGE_ROUTE, file_name)
    }

    /// File name referenced by a public URL, rejecting anything that could
    /// escape the storage directory.
    fn file_name<'u>(&self, public_url: &'u str) -> Option<&'u str> {
        let name = public_url.rsplit('/').next()?;
        let safe = !name.is_empty() && !name.contains("..") && !name.contains('\\');
        safe.then_some(name)
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn save(&self, owner: Uuid, encoded: &str) -> AppResult<String> {
        let bytes = decode_photo(encoded)?;
        let file_name = format!(
            "{}-{}-{}.png",
            chrono::Utc::now().timestamp_millis(),
            owner,
            Uuid::new_v4().simple()
        );

        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        tracing::debug!(%owner, file = %file_name, "Photo stored");

        Ok(self.public_url(&file_name))
    }

    async fn remove(&self, public_url: &str) -> AppResult<()> {
        let Some(file_name) = self.file_name(public_url) else {
            tracing::warn!(url = %public_url, "Refusing to remove photo with unexpected path");
            return Ok(());
        };

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(file = %file_name, "Photo already missing from storage");
                Ok(())
            }
            Err(e) => Err(AppError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" in base64
    const HELLO: &str = "aGVsbG8=";

    fn temp_store() -> (LocalPhotoStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("blog-photos-{}", Uuid::new_v4()));
        (LocalPhotoStore::new(&dir, "http://localhost:5000/"), dir)
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        assert_eq!(decode_photo(HELLO).unwrap(), b"hello");
        assert_eq!(
            decode_photo(&format!("data:image/png;base64,{}", HELLO)).unwrap(),
            b"hello"
        );
        assert_eq!(
            decode_photo(&format!("data:image/jpeg;base64,{}", HELLO)).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_photo("%%%"), Err(AppError::Validation(_))));
        assert!(matches!(decode_photo(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_file_name_guards_traversal() {
        let (store, _) = temp_store();
        assert_eq!(
            store.file_name("http://localhost:5000/storage/1-abc.png"),
            Some("1-abc.png")
        );
        assert_eq!(store.file_name("http://localhost:5000/storage/.."), None);
        assert_eq!(store.file_name("http://localhost:5000/storage/"), None);
    }

    #[tokio::test]
    async fn test_save_then_remove() {
        let (store, dir) = temp_store();
        store.ensure_dir().await.unwrap();
        let owner = Uuid::new_v4();

        let url = store.save(owner, HELLO).await.unwrap();
        assert!(url.starts_with("http://localhost:5000/storage/"));
        assert!(url.contains(&format!("-{}-", owner)));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let written = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(written, b"hello");

        store.remove(&url).await.unwrap();
        assert!(!dir.join(file_name).exists());

        // Removing again is not an error
        store.remove(&url).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_same_owner_uploads_never_collide() {
        let (store, dir) = temp_store();
        store.ensure_dir().await.unwrap();
        let owner = Uuid::new_v4();

        let first = store.save(owner, HELLO).await.unwrap();
        let second = store
            .save(owner, &format!("data:image/png;base64,{}", HELLO))
            .await
            .unwrap();
        assert_ne!(first, second);

        store.remove(&first).await.unwrap();
        let second_name = second.rsplit('/').next().unwrap();
        assert!(dir.join(second_name).exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
