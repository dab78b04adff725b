pub mod api;
pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod pagination;
pub mod seed;
pub mod service;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

// Export API types
pub use api::{build_app, create_router, AppState};

pub use config::{AppConfig, StorageBackend};
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use pagination::{Page, PageRequest};

// Export store types
pub use store::{CatalogStore, MemoryStore, PostgresStore};

/// Build the services on top of the configured storage backend.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<Arc<AppState>> {
    let state = match config.storage.backend {
        StorageBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on shutdown");
            AppState::new(Arc::new(MemoryStore::new()), config.pagination)
        }
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.database.max_connections).await?;

            if config.database.run_migrations {
                log::info!("Running database migrations...");
                store.migrate().await?;
            }

            AppState::new(Arc::new(store), config.pagination)
        }
    };

    let state = Arc::new(state);

    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(&state)
            .await
            .context("Failed to load seed data")?;
    }

    Ok(state)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let app = build_app(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    log::info!("Catalog service running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
