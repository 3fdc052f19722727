//! Application-level error types

use thiserror::Error;

use crate::api::ApiError;

/// Result type for startup and configuration
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Settings file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Command line flags could not be parsed
    #[error("Invalid arguments: {0}")]
    Args(#[from] pico_args::Error),

    /// Backend client could not be created
    #[error(transparent)]
    Api(#[from] ApiError),
}
