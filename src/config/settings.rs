//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_BACKEND_SERVER_PATH, DEFAULT_DATABASE_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_STORAGE_DIR, MIN_TOKEN_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    access_token_secret: String,
    refresh_token_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub storage_dir: PathBuf,
    pub backend_server_path: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("storage_dir", &self.storage_dir)
            .field("backend_server_path", &self.backend_server_path)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a token secret is missing in release builds, is too short,
    /// or if both secrets are identical.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let access_token_secret = secret_from_env(
            "ACCESS_TOKEN_SECRET",
            "dev-access-secret-minimum-32-chars!!",
        );
        let refresh_token_secret = secret_from_env(
            "REFRESH_TOKEN_SECRET",
            "dev-refresh-secret-minimum-32-chars!",
        );

        Self::new(
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            access_token_secret,
            refresh_token_secret,
        )
        .with_server(
            env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        )
        .with_storage(
            env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR)),
            env::var("BACKEND_SERVER_PATH")
                .unwrap_or_else(|_| DEFAULT_BACKEND_SERVER_PATH.to_string()),
        )
    }

    /// Build a configuration from explicit values.
    ///
    /// # Panics
    /// Panics if a secret is shorter than the minimum length or if the
    /// access and refresh secrets are the same.
    pub fn new(
        database_url: impl Into<String>,
        access_token_secret: impl Into<String>,
        refresh_token_secret: impl Into<String>,
    ) -> Self {
        let access_token_secret = access_token_secret.into();
        let refresh_token_secret = refresh_token_secret.into();

        for secret in [&access_token_secret, &refresh_token_secret] {
            if secret.len() < MIN_TOKEN_SECRET_LENGTH {
                panic!(
                    "Token secrets must be at least {} characters long",
                    MIN_TOKEN_SECRET_LENGTH
                );
            }
        }
        if access_token_secret == refresh_token_secret {
            panic!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
        }

        Self {
            database_url: database_url.into(),
            access_token_secret,
            refresh_token_secret,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            backend_server_path: DEFAULT_BACKEND_SERVER_PATH.to_string(),
        }
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.server_host = host.into();
        self.server_port = port;
        self
    }

    pub fn with_storage(mut self, dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        self.storage_dir = dir.into();
        self.backend_server_path = public_base.into();
        self
    }

    /// Secret bytes for signing and verifying access tokens.
    pub fn access_secret_bytes(&self) -> &[u8] {
        self.access_token_secret.as_bytes()
    }

    /// Secret bytes for signing and verifying refresh tokens.
    pub fn refresh_secret_bytes(&self) -> &[u8] {
        self.refresh_token_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn secret_from_env(key: &str, dev_default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            // Development mode: use default but warn
            tracing::warn!("{} not set, using insecure default for development", key);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", key);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS: &str = "access-secret-for-tests-0123456789abcdef";
    const REFRESH: &str = "refresh-secret-for-tests-0123456789abcdef";

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("postgres://db", ACCESS, REFRESH);
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains(ACCESS));
        assert!(!rendered.contains(REFRESH));
        assert!(!rendered.contains("postgres://db"));
    }

    #[test]
    #[should_panic(expected = "must differ")]
    fn test_identical_secrets_rejected() {
        Config::new("postgres://db", ACCESS, ACCESS);
    }

    #[test]
    #[should_panic(expected = "at least")]
    fn test_short_secret_rejected() {
        Config::new("postgres://db", "short", REFRESH);
    }

    #[test]
    fn test_server_addr() {
        let config = Config::new("postgres://db", ACCESS, REFRESH).with_server("127.0.0.1", 8080);
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }
}
