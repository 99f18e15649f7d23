//! Error types for pmplan

use thiserror::Error;

/// Result type alias for pmplan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pmplan operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed section catalog or template table
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// User input rejected (blank title, bad email, unknown field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Section id not present in the catalog or the plan's custom sections
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// Attempt to hide or remove a section the catalog marks as required
    #[error("Cannot remove required section: {0}")]
    RequiredSection(String),

    /// Export format that is not known or has no encoder
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Document encoder failure
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Key-value store failure
    #[cfg(feature = "database")]
    #[error("Store error: {0}")]
    Store(#[from] pmplan_store::Error),
}
