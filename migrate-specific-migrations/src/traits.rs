//! Connection trait the migrator and repository run against.

use crate::error::{MigrationError, Result};
use crate::types::TrackingRow;

/// Database connection trait that is dyn compatible
pub trait MigrationConnection: Send {
    /// Execute one or more SQL statements
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Execute a single SQL statement and return the number of affected rows
    fn execute_with_result(&mut self, sql: &str) -> Result<u64> {
        // Default implementation just executes and returns 0
        self.execute(sql)?;
        Ok(0)
    }

    /// Get the database type (postgres, sqlite, etc.)
    fn database_type(&self) -> &str;

    /// Whether a table with this name exists
    fn table_exists(&mut self, table_name: &str) -> Result<bool>;

    /// Read every row of the tracking table, ordered by batch then name
    fn query_tracking_rows(&mut self, table_name: &str) -> Result<Vec<TrackingRow>>;

    /// Take a write lock on a table for the rest of the current transaction
    fn lock_table(&mut self, _table_name: &str) -> Result<()> {
        Ok(())
    }

    /// Turn referential-integrity enforcement on or off for this session
    fn set_foreign_key_checks(&mut self, enabled: bool) -> Result<()>;

    /// Begin a transaction
    fn begin_transaction(&mut self) -> Result<()> {
        self.execute("BEGIN")
    }

    /// Commit a transaction
    fn commit_transaction(&mut self) -> Result<()> {
        self.execute("COMMIT")
    }

    /// Rollback a transaction
    fn rollback_transaction(&mut self) -> Result<()> {
        self.execute("ROLLBACK")
    }
}

/// Run `f` inside a transaction, committing on success and rolling back on error.
///
/// A failed rollback is logged; the error returned is always the one from `f`.
pub fn transaction<T, E, F>(conn: &mut dyn MigrationConnection, f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&mut dyn MigrationConnection) -> std::result::Result<T, E>,
    E: From<MigrationError>,
{
    conn.begin_transaction()?;

    match f(&mut *conn) {
        Ok(value) => {
            conn.commit_transaction()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.rollback_transaction() {
                tracing::error!(error = %rollback_err, "failed to roll back transaction");
            }
            Err(err)
        }
    }
}
