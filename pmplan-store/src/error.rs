//! Error types for storage operations

use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, Error>;
