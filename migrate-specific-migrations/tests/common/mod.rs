//! Common test utilities for migration tests.

#![allow(dead_code)]

use migrate_specific_migrations::{MigrationConnection, MigrationError, TrackingRow};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// In-memory connection that records every statement it is given
pub struct TestConnection {
    executed_queries: Arc<Mutex<Vec<String>>>,
    rows: Vec<TrackingRow>,
    database_type: &'static str,
    table_exists: bool,
    fail_on: Option<&'static str>,
    fail_rollback: bool,
}

impl TestConnection {
    pub fn new() -> Self {
        Self {
            executed_queries: Arc::new(Mutex::new(Vec::new())),
            rows: Vec::new(),
            database_type: "sqlite",
            table_exists: true,
            fail_on: None,
            fail_rollback: false,
        }
    }

    pub fn with_rows(mut self, rows: &[(&str, i64)]) -> Self {
        self.rows = rows
            .iter()
            .zip(1..)
            .map(|((migration, batch), id)| TrackingRow {
                id,
                migration: migration.to_string(),
                batch: *batch,
            })
            .collect();
        self
    }

    pub fn with_database_type(mut self, database_type: &'static str) -> Self {
        self.database_type = database_type;
        self
    }

    pub fn without_table(mut self) -> Self {
        self.table_exists = false;
        self
    }

    /// Fail any statement containing `needle`
    pub fn failing_on(mut self, needle: &'static str) -> Self {
        self.fail_on = Some(needle);
        self
    }

    pub fn with_failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn get_executed_queries(&self) -> Vec<String> {
        self.executed_queries.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) {
        self.executed_queries.lock().unwrap().push(sql.to_string());
    }
}

impl MigrationConnection for TestConnection {
    fn execute(&mut self, sql: &str) -> Result<(), MigrationError> {
        if self.fail_on.is_some_and(|needle| sql.contains(needle)) {
            return Err(MigrationError::database("Test failure"));
        }
        self.record(sql);
        Ok(())
    }

    fn execute_with_result(&mut self, sql: &str) -> Result<u64, MigrationError> {
        self.execute(sql)?;
        Ok(1)
    }

    fn database_type(&self) -> &str {
        self.database_type
    }

    fn table_exists(&mut self, _table_name: &str) -> Result<bool, MigrationError> {
        Ok(self.table_exists)
    }

    fn query_tracking_rows(&mut self, _table_name: &str) -> Result<Vec<TrackingRow>, MigrationError> {
        Ok(self.rows.clone())
    }

    fn lock_table(&mut self, table_name: &str) -> Result<(), MigrationError> {
        self.record(&format!("LOCK {}", table_name));
        Ok(())
    }

    fn set_foreign_key_checks(&mut self, enabled: bool) -> Result<(), MigrationError> {
        self.record(&format!("FOREIGN KEYS {}", if enabled { "ON" } else { "OFF" }));
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), MigrationError> {
        if self.fail_rollback {
            return Err(MigrationError::database("rollback failed"));
        }
        self.record("ROLLBACK");
        Ok(())
    }
}

/// Write `name.sql` with the given sections
pub fn write_migration(dir: &Path, name: &str, up: &str, down: &str) {
    fs::write(
        dir.join(format!("{}.sql", name)),
        format!("-- migrate:up\n{}\n-- migrate:down\n{}\n", up, down),
    )
    .unwrap();
}
