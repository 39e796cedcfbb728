//! SQLite adapter for the migrator.

use crate::{
    error::Result,
    traits::MigrationConnection,
    types::TrackingRow,
};
use rusqlite::Connection;

/// SQLite connection wrapper for migrations
pub struct SqliteMigrationConnection<'a> {
    conn: &'a mut Connection,
}

impl<'a> SqliteMigrationConnection<'a> {
    /// Create a new SQLite migration connection
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }
}

impl<'a> MigrationConnection for SqliteMigrationConnection<'a> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn execute_with_result(&mut self, sql: &str) -> Result<u64> {
        let count = self.conn.execute(sql, [])?;
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn database_type(&self) -> &str {
        "sqlite"
    }

    fn table_exists(&mut self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query_tracking_rows(&mut self, table_name: &str) -> Result<Vec<TrackingRow>> {
        let sql = format!(
            "SELECT id, migration, batch FROM {} ORDER BY batch, migration",
            table_name
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TrackingRow {
                    id: row.get(0)?,
                    migration: row.get(1)?,
                    batch: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn set_foreign_key_checks(&mut self, enabled: bool) -> Result<()> {
        // PRAGMA foreign_keys is a no-op inside a transaction
        let value = if enabled { "ON" } else { "OFF" };
        self.execute(&format!("PRAGMA foreign_keys = {}", value))
    }

    fn begin_transaction(&mut self) -> Result<()> {
        // Take the write lock up front
        self.execute("BEGIN IMMEDIATE")
    }
}

/// Extension trait for rusqlite::Connection
pub trait SqliteConnectionExt {
    /// Create a migration connection from this SQLite connection
    fn migration_connection(&mut self) -> SqliteMigrationConnection<'_>;
}

impl SqliteConnectionExt for Connection {
    fn migration_connection(&mut self) -> SqliteMigrationConnection<'_> {
        SqliteMigrationConnection::new(self)
    }
}
