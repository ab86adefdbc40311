//! Testament Router
//!
//! HTTP service hosting a testament registry over SQLite. Callers identify
//! themselves with bearer tokens; the registry does the rest.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod identity;

use config::RouterConfig;
use handlers::{create_router, AppState};
use identity::IdentityTokens;
use testament_domain::{Clock, SystemClock, TestamentRegistry};
use testament_store::{SqliteStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build application state from configuration
///
/// Opens (or creates) the database and wires the registry to wall-clock time.
pub fn build_state(config: &RouterConfig) -> Result<AppState, RouterError> {
    let store = SqliteStore::new(&config.database_path)?;
    let clock: Box<dyn Clock + Send> = Box::new(SystemClock);
    let registry = TestamentRegistry::new(store, clock);
    let tokens = IdentityTokens::new(&config.jwt_secret, config.token_expiry_secs);
    Ok(AppState::new(registry, tokens))
}

/// Start the Router HTTP server
///
/// Initializes tracing, opens the store, and serves until the process stops.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Testament Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Token expiry: {} seconds", config.token_expiry_secs);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
