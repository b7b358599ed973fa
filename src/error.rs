//! Common error types for pantrypal

use thiserror::Error;

/// Common result type for pantrypal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the library outside of the AI flows
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure inside one of the AI flows
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// Errors raised by the AI flow clients
#[derive(Error, Debug)]
pub enum AiError {
    /// The text model backend rejected or failed the request
    #[error("Model error: {0}")]
    Model(String),

    /// Transport failure talking to an HTTP backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model answered, but not with the JSON we asked for
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// Input or output failed schema validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Image generation returned neither image data nor a URL
    #[error("Image generation failed to return a URL")]
    MissingImage,

    /// The backend is not configured
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
