//! Error types for the dashboard data layer

use thiserror::Error;

/// Result type alias for the dashboard data layer
pub type Result<T> = std::result::Result<T, Error>;

/// Dashboard data-layer errors
///
/// A cache miss is not represented here - misses are ordinary control
/// flow (`Option`), never errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request parameters could not be turned into a cache key
    #[error("Invalid request parameters: {0}")]
    InvalidParams(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        message: String,
    },
}
