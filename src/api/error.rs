//! Gallery backend error types

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while talking to the gallery backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network request failed
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Base URL could not be used to build endpoint URLs
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Response body was not the expected JSON
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Downloaded bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// Thumbnail cache could not be read or written
    #[error("Thumbnail cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// Background decode task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// True when the server could not be reached at all
    pub fn is_network(&self) -> bool {
        match self {
            ApiError::RequestFailed(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}
