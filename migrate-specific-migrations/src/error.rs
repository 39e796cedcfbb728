//! Error types for the migrator.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for migrator operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A migration's own SQL failed; its transaction has been rolled back
    #[error("Migration {name} failed: {message}")]
    MigrationFailed {
        /// Migration name
        name: String,
        /// Message reported by the database
        message: String,
    },

    /// The migrator is protected and the caller did not pass `force`
    #[error("Migrator is protected in this environment; pass `force` to proceed")]
    ForceRequired,

    /// A migration file could not be interpreted
    #[error("Invalid migration file {path}: {reason}")]
    InvalidFile {
        /// Path of the offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl MigrationError {
    /// Create a new database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Create a new custom error
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type alias for migrator operations
pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(feature = "postgres")]
impl From<postgres::Error> for MigrationError {
    fn from(err: postgres::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for MigrationError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
