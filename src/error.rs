//! Error types for ForgeLink
//!
//! Defines one error enum covering all failure modes across the crate.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for ForgeLink operations
pub type Result<T> = std::result::Result<T, ForgeLinkError>;

/// Comprehensive error type for ForgeLink operations
///
/// Platform failures are surfaced with their HTTP status and response text
/// preserved in the message; this layer never retries and never collapses
/// distinct platform errors into one opaque value.
#[derive(Error, Debug)]
pub enum ForgeLinkError {
    /// A required argument was blank; detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid provider configuration or malformed endpoint at build time
    #[error("Configuration error: {0}")]
    Config(String),

    /// The platform rejected a call (auth failure, not-found, rate limit)
    #[error("API error: {0}")]
    Api(String),

    /// A webhook ID could not be converted to the platform's identifier form
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors (archive staging and extraction)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors (config files)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
