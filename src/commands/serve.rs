//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::domain::Argon2Hasher;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, LocalPhotoStore, Persistence};
use crate::services::{Services, TokenService};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let config = match (args.host, args.port) {
        (None, None) => config,
        (host, port) => {
            let host = host.unwrap_or_else(|| config.server_host.clone());
            let port = port.unwrap_or(config.server_port);
            config.with_server(host, port)
        }
    };

    let db = Arc::new(Database::connect(&config).await?);

    let photos = LocalPhotoStore::from_config(&config);
    photos.ensure_dir().await?;
    tracing::info!(dir = %config.storage_dir.display(), "Photo storage ready");

    let services = Services::from_parts(
        Arc::new(Persistence::new(db.get_connection())),
        TokenService::from_config(&config),
        Arc::new(Argon2Hasher::default()),
        Arc::new(photos),
    );
    let app_state = AppState::from_container(&services, Some(db));

    let app = create_router(app_state, &config.storage_dir);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
