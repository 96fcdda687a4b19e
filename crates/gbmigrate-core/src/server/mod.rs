//! Axum server exposing single-file conversion and the storage directory.

pub mod handlers;
pub mod routes;

pub use routes::create_router;

use crate::config::AppConfig;
use crate::convert::Converter;
use crate::detect::Classifier;
use crate::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Shared, read-only state handed to every handler.
pub struct ServerState {
    pub classifier: Classifier,
    pub converter: Converter,
    pub storage_dir: PathBuf,
}

impl ServerState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            classifier: Classifier::new(config.confidence_threshold),
            converter: Converter::new(config.source_encoding),
            storage_dir: config.server.storage_dir.clone(),
        }
    }
}

/// Bind `config.server.bind_addr` and serve until the process stops.
pub async fn run_server(config: AppConfig) -> Result<(), Error> {
    tokio::fs::create_dir_all(&config.server.storage_dir).await?;

    let state = Arc::new(ServerState::new(&config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
    info!(
        "Serving {} on http://{}",
        config.server.storage_dir.display(),
        config.server.bind_addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
