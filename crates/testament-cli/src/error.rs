//! Error types for the CLI application.

use testament_domain::TestamentError;
use testament_router::identity::IdentityError;
use testament_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The registry rejected the command
    #[error("{0}")]
    Testament(#[from] TestamentError),

    /// The database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Token issuance failed
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No acting address for a command that needs one
    #[error("No caller address. Use '--as <address>' or set TESTAMENT_CALLER.")]
    NoCaller,
}
