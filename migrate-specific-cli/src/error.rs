//! Errors raised by the migrate-specific workflow

use migrate_specific_migrations::MigrationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecificError {
    /// `--mode` is not one of the supported modes
    #[error("Invalid migrate mode: {0}")]
    InvalidMode(String),

    /// A positional path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Two different selected files would land on the same scratch file
    #[error("Duplicate migration name {name}: {} and {}", .first.display(), .second.display())]
    DuplicateMigration {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Staging or cleanup failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The migrator failed; its message is surfaced as-is
    #[error("{0}")]
    Executor(#[from] MigrationError),
}

impl SpecificError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpecificError>;
