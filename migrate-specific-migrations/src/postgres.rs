//! PostgreSQL adapter for the migrator.

use crate::{
    error::Result,
    traits::MigrationConnection,
    types::TrackingRow,
};
use postgres::Client;

/// PostgreSQL connection wrapper for migrations
pub struct PostgresMigrationConnection<'a> {
    client: &'a mut Client,
}

impl<'a> PostgresMigrationConnection<'a> {
    /// Create a new PostgreSQL migration connection
    pub fn new(client: &'a mut Client) -> Self {
        Self { client }
    }
}

impl<'a> MigrationConnection for PostgresMigrationConnection<'a> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    fn execute_with_result(&mut self, sql: &str) -> Result<u64> {
        Ok(self.client.execute(sql, &[])?)
    }

    fn database_type(&self) -> &str {
        "postgresql"
    }

    fn table_exists(&mut self, table_name: &str) -> Result<bool> {
        let row = self.client.query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1::TEXT
            )",
            &[&table_name],
        )?;
        Ok(row.get(0))
    }

    fn query_tracking_rows(&mut self, table_name: &str) -> Result<Vec<TrackingRow>> {
        // Tables created elsewhere may use INTEGER columns
        let sql = format!(
            "SELECT id::BIGINT, migration::TEXT, batch::BIGINT FROM {} ORDER BY batch, migration",
            table_name
        );

        let rows = self.client.query(&sql, &[])?;

        Ok(rows
            .into_iter()
            .map(|row| TrackingRow {
                id: row.get(0),
                migration: row.get(1),
                batch: row.get(2),
            })
            .collect())
    }

    fn lock_table(&mut self, table_name: &str) -> Result<()> {
        self.execute(&format!("LOCK TABLE {} IN SHARE ROW EXCLUSIVE MODE", table_name))
    }

    fn set_foreign_key_checks(&mut self, enabled: bool) -> Result<()> {
        // Requires a role allowed to change session_replication_role
        let role = if enabled { "origin" } else { "replica" };
        self.execute(&format!("SET session_replication_role = '{}'", role))
    }
}

/// Extension trait for postgres::Client
pub trait PostgresConnectionExt {
    /// Create a migration connection from this PostgreSQL client
    fn migration_connection(&mut self) -> PostgresMigrationConnection<'_>;
}

impl PostgresConnectionExt for Client {
    fn migration_connection(&mut self) -> PostgresMigrationConnection<'_> {
        PostgresMigrationConnection::new(self)
    }
}
