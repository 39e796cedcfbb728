//! Configuration options for the migrator.

use crate::error::{MigrationError, Result};

/// Default name of the tracking table
pub const DEFAULT_TABLE_NAME: &str = "migrations";

/// Configuration for the migrator
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Name of the tracking table
    pub table_name: String,

    /// Whether to run each migration and its tracking entry in one transaction
    pub transaction_per_migration: bool,

    /// Whether `run` creates the tracking table if it doesn't exist
    pub auto_create_table: bool,

    /// Whether `run` and `rollback` refuse to proceed without `force`
    pub protected: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            transaction_per_migration: true,
            auto_create_table: true,
            protected: false,
        }
    }
}

impl MigratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tracking table name
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Enable or disable transactions per migration
    pub fn with_transactions(mut self, enabled: bool) -> Self {
        self.transaction_per_migration = enabled;
        self
    }

    /// Set whether to auto-create the tracking table
    pub fn with_auto_create_table(mut self, enabled: bool) -> Self {
        self.auto_create_table = enabled;
        self
    }

    /// Mark the migrator as protected
    pub fn protected(mut self, enabled: bool) -> Self {
        self.protected = enabled;
        self
    }

    /// Check that the table name is a plain SQL identifier.
    ///
    /// Table names are interpolated into statements, so nothing but
    /// `[A-Za-z_][A-Za-z0-9_]*` is accepted.
    pub fn validate(&self) -> Result<()> {
        if is_identifier(&self.table_name) {
            Ok(())
        } else {
            Err(MigrationError::custom(format!(
                "Invalid tracking table name: {:?}",
                self.table_name
            )))
        }
    }

    /// Get the SQL for creating the tracking table for PostgreSQL
    pub fn postgres_create_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                migration VARCHAR(255) NOT NULL,
                batch BIGINT NOT NULL
            )"#,
            self.table_name
        )
    }

    /// Get the SQL for creating the tracking table for SQLite
    pub fn sqlite_create_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                migration TEXT NOT NULL,
                batch INTEGER NOT NULL
            )"#,
            self.table_name
        )
    }
}

/// Whether `name` is usable unquoted as a table name
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
