//! Access to the migration-tracking table.

use crate::{
    config::MigratorConfig,
    error::{MigrationError, Result},
    traits::MigrationConnection,
    types::TrackingRow,
};
use std::collections::BTreeSet;

/// Reads and writes rows of the tracking table
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    config: MigratorConfig,
}

impl MigrationRepository {
    /// Create a repository for the table named in `config`
    pub fn new(config: MigratorConfig) -> Self {
        Self { config }
    }

    /// Name of the tracking table
    pub fn table(&self) -> &str {
        &self.config.table_name
    }

    /// Create the tracking table if it doesn't exist
    pub fn ensure_table(&self, conn: &mut dyn MigrationConnection) -> Result<()> {
        let sql = match conn.database_type() {
            "postgresql" | "postgres" => self.config.postgres_create_table_sql(),
            "sqlite" => self.config.sqlite_create_table_sql(),
            db => return Err(MigrationError::Custom(format!("Unsupported database type: {}", db))),
        };

        conn.execute(&sql)
    }

    /// Whether the tracking table exists
    pub fn exists(&self, conn: &mut dyn MigrationConnection) -> Result<bool> {
        conn.table_exists(self.table())
    }

    /// All tracking rows; empty when the table doesn't exist yet
    pub fn rows(&self, conn: &mut dyn MigrationConnection) -> Result<Vec<TrackingRow>> {
        if !self.exists(conn)? {
            return Ok(Vec::new());
        }
        conn.query_tracking_rows(self.table())
    }

    /// Names of every applied migration
    pub fn ran(&self, conn: &mut dyn MigrationConnection) -> Result<BTreeSet<String>> {
        Ok(self.rows(conn)?.into_iter().map(|row| row.migration).collect())
    }

    /// Rows whose migration is in `names`; names without a row are left out
    pub fn rows_for(
        &self,
        conn: &mut dyn MigrationConnection,
        names: &[String],
    ) -> Result<Vec<TrackingRow>> {
        let wanted: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        Ok(self
            .rows(conn)?
            .into_iter()
            .filter(|row| wanted.contains(row.migration.as_str()))
            .collect())
    }

    /// Highest batch number in use
    pub fn last_batch_number(&self, conn: &mut dyn MigrationConnection) -> Result<Option<i64>> {
        Ok(self.rows(conn)?.iter().map(|row| row.batch).max())
    }

    /// Batch number the next `run` will use
    pub fn next_batch_number(&self, conn: &mut dyn MigrationConnection) -> Result<i64> {
        Ok(self.last_batch_number(conn)?.map_or(1, |batch| batch + 1))
    }

    /// Rows of the newest batch, newest migration first
    pub fn last(&self, conn: &mut dyn MigrationConnection) -> Result<Vec<TrackingRow>> {
        let rows = self.rows(conn)?;
        let Some(batch) = rows.iter().map(|row| row.batch).max() else {
            return Ok(Vec::new());
        };

        let mut last: Vec<TrackingRow> = rows.into_iter().filter(|row| row.batch == batch).collect();
        last.sort_by(|a, b| b.migration.cmp(&a.migration));
        Ok(last)
    }

    /// Record a migration as applied in `batch`
    pub fn log(&self, conn: &mut dyn MigrationConnection, name: &str, batch: i64) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (migration, batch) VALUES ({}, {})",
            self.table(),
            quote_literal(name),
            batch
        );
        conn.execute(&sql)
    }

    /// Remove a migration's row
    pub fn delete(&self, conn: &mut dyn MigrationConnection, name: &str) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE migration = {}",
            self.table(),
            quote_literal(name)
        );
        conn.execute(&sql)
    }

    /// Move the rows of `names` to `batch`, returning how many rows changed
    pub fn set_batch(
        &self,
        conn: &mut dyn MigrationConnection,
        names: &[String],
        batch: i64,
    ) -> Result<u64> {
        if names.is_empty() {
            return Ok(0);
        }

        let list = names.iter().map(|n| quote_literal(n)).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "UPDATE {} SET batch = {} WHERE migration IN ({})",
            self.table(),
            batch,
            list
        );
        tracing::debug!(%sql, "updating tracking rows");
        conn.execute_with_result(&sql)
    }

    /// Lock the tracking table for the rest of the current transaction
    pub fn lock(&self, conn: &mut dyn MigrationConnection) -> Result<()> {
        conn.lock_table(self.table())
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
