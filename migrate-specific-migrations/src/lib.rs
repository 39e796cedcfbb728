//! # migrate-specific-migrations
//!
//! Batch-aware SQL migrator used by the `migrate-specific` command.
//!
//! Migrations are plain `.sql` files in a directory. Applied migrations are
//! recorded in a tracking table as `(id, migration, batch)` rows; every `run`
//! applies the pending files as one new batch and every `rollback` reverts the
//! newest batch.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> Result<(), migrate_specific_migrations::MigrationError> {
//! use migrate_specific_migrations::prelude::*;
//! use migrate_specific_migrations::sqlite::SqliteConnectionExt;
//! use std::path::Path;
//!
//! let mut conn = rusqlite::Connection::open("app.db")?;
//! let migrator = Migrator::new(MigratorConfig::default());
//!
//! let report = migrator.run(
//!     &mut conn.migration_connection(),
//!     Path::new("database/migrations"),
//!     &MigrateOptions::new(),
//! )?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file;
pub mod migrator;
pub mod repository;
pub mod traits;
pub mod types;

// Feature-gated modules
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export commonly used types
pub use config::MigratorConfig;
pub use error::MigrationError;
pub use file::MigrationFile;
pub use migrator::{MigrateOptions, Migrator};
pub use repository::MigrationRepository;
pub use traits::{transaction, MigrationConnection};
pub use types::{Direction, MigrationReport, MigrationResult, PretendedMigration, TrackingRow};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::MigratorConfig;
    pub use crate::error::MigrationError;
    pub use crate::migrator::{MigrateOptions, Migrator};
    pub use crate::repository::MigrationRepository;
    pub use crate::traits::{transaction, MigrationConnection};
    pub use crate::types::{MigrationReport, TrackingRow};
}
