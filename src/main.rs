use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use events_server::auth::JwtValidator;
use events_server::config::{Config, ConfigError};
use events_server::repositories::PgEventRepository;
use events_server::routes::{create_routes, RouterOptions};
use events_server::services::EventService;
use events_server::state::AppState;
use events_server::storage::{BlobError, LocalBlobStore};

const DEFAULT_LOG_FILTER: &str = "events_server=debug,tower_http=info";

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("blob storage error: {0}")]
    Blob(#[from] BlobError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Migrations run successfully");

    let blobs = LocalBlobStore::new(
        config.blob.storage_dir.clone(),
        config.blob.public_base_url.clone(),
    );
    blobs.ensure_container().await?;
    tracing::info!(dir = %blobs.root().display(), "Blob container ready");

    let service = EventService::new(
        Arc::new(PgEventRepository::new(pool)),
        Arc::new(blobs),
    );
    let state = AppState::new(service, JwtValidator::new(&config.jwt));

    let app: Router = create_routes(
        state,
        RouterOptions {
            cors_allowed_origins: config.cors_allowed_origins.clone(),
            production: config.production,
            images_dir: Some(config.blob.storage_dir.clone()),
        },
    );

    tracing::info!("Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
