//! Common test utilities for migrate-specific integration tests

#![allow(dead_code)]

use anyhow::Result;
use migrate_specific_cli::config::Config;
use migrate_specific_cli::confirm::Prompter;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory with a migrations folder, a scratch parent and a SQLite database
pub struct TestEnv {
    pub root: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join("migrations"))?;
        fs::create_dir_all(root.path().join("scratch"))?;
        let conn = Connection::open(root.path().join("test.db"))?;
        Ok(Self { root, conn })
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.root.path().join("migrations")
    }

    pub fn scratch_parent(&self) -> PathBuf {
        self.root.path().join("scratch")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default_with_directory(&self.migrations_dir().to_string_lossy());
        config.scratch.directory = Some(self.scratch_parent().to_string_lossy().into_owned());
        config
    }

    /// Write a migration that creates (and drops) a table of the same name
    pub fn add_table_migration(&self, name: &str, table: &str) -> PathBuf {
        self.add_migration(
            name,
            &format!("CREATE TABLE {} (id INTEGER PRIMARY KEY);", table),
            &format!("DROP TABLE {};", table),
        )
    }

    pub fn add_migration(&self, name: &str, up: &str, down: &str) -> PathBuf {
        write_migration(&self.migrations_dir(), name, up, down)
    }

    /// Entries left under the scratch parent
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.scratch_parent())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// Install a tracking table with the given `(migration, batch)` rows
    pub fn seed_tracking(&self, rows: &[(&str, i64)]) {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS migrations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    migration VARCHAR(255) NOT NULL,
                    batch INTEGER NOT NULL
                )",
            )
            .unwrap();
        for (migration, batch) in rows {
            self.conn
                .execute(
                    "INSERT INTO migrations (migration, batch) VALUES (?1, ?2)",
                    rusqlite::params![migration, batch],
                )
                .unwrap();
        }
    }

    /// `(id, migration, batch)` rows, ordered by id
    pub fn tracking(&self) -> Vec<(i64, String, i64)> {
        if !self.table_exists("migrations") {
            return Vec::new();
        }
        let mut stmt = self
            .conn
            .prepare("SELECT id, migration, batch FROM migrations ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    pub fn batch_of(&self, migration: &str) -> Option<i64> {
        self.tracking()
            .into_iter()
            .find(|(_, name, _)| name == migration)
            .map(|(_, _, batch)| batch)
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            > 0
    }
}

pub fn write_migration(dir: &Path, name: &str, up: &str, down: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.sql", name));
    fs::write(&path, format!("-- migrate:up\n{}\n\n-- migrate:down\n{}\n", up, down)).unwrap();
    path
}

/// Prompter that answers from a script and records every question
#[derive(Default)]
pub struct ScriptedPrompter {
    pub answer: bool,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.asked.push(prompt.to_string());
        Ok(self.answer)
    }
}
