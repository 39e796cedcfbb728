//! SQL migration files.
//!
//! A migration is one `.sql` file. Its name is the file name without the
//! extension, and its body is split into sections by marker lines:
//!
//! ```sql
//! -- migrate:up
//! CREATE TABLE users (id INTEGER PRIMARY KEY);
//!
//! -- migrate:down
//! DROP TABLE users;
//! ```
//!
//! Text before the first marker is ignored. A file without an up marker is
//! all "up" with an empty "down".

use crate::error::{MigrationError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker line opening the up section
pub const UP_MARKER: &str = "-- migrate:up";

/// Marker line opening the down section
pub const DOWN_MARKER: &str = "-- migrate:down";

/// File extension migrations are recognised by
pub const MIGRATION_EXTENSION: &str = "sql";

/// A migration loaded from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Canonical migration name
    pub name: String,
    /// Where the file was read from
    pub path: PathBuf,
    /// SQL applied by `run`
    pub up_sql: String,
    /// SQL applied by `rollback`
    pub down_sql: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Up,
    Down,
}

impl MigrationFile {
    /// Read and parse a migration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(path, &contents)
    }

    /// Parse migration contents that were read from `path`
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let name = migration_name(path).ok_or_else(|| MigrationError::InvalidFile {
            path: path.to_path_buf(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;

        let mut section = Section::Preamble;
        let mut seen_up = false;
        let mut seen_down = false;
        let mut preamble = String::new();
        let mut up = String::new();
        let mut down = String::new();

        for line in contents.lines() {
            let marker = line.trim();
            if marker.eq_ignore_ascii_case(UP_MARKER) {
                if seen_up {
                    return Err(duplicate_marker(path, UP_MARKER));
                }
                seen_up = true;
                section = Section::Up;
                continue;
            }
            if marker.eq_ignore_ascii_case(DOWN_MARKER) {
                if seen_down {
                    return Err(duplicate_marker(path, DOWN_MARKER));
                }
                seen_down = true;
                section = Section::Down;
                continue;
            }

            let buffer = match section {
                Section::Preamble => &mut preamble,
                Section::Up => &mut up,
                Section::Down => &mut down,
            };
            buffer.push_str(line);
            buffer.push('\n');
        }

        if !seen_up {
            up = preamble;
        }

        Ok(Self {
            name,
            path: path.to_path_buf(),
            up_sql: up.trim().to_string(),
            down_sql: down.trim().to_string(),
        })
    }
}

fn duplicate_marker(path: &Path, marker: &str) -> MigrationError {
    MigrationError::InvalidFile {
        path: path.to_path_buf(),
        reason: format!("duplicate `{}` marker", marker),
    }
}

/// Migration name for a path: the file name with its extension stripped
pub fn migration_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Whether a path looks like a migration file
pub fn is_migration_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MIGRATION_EXTENSION))
}

/// Load every migration in `directory`, keyed and ordered by name.
///
/// Only the directory itself is read; subdirectories and non-`.sql` files are skipped.
pub fn load_directory(directory: &Path) -> Result<BTreeMap<String, MigrationFile>> {
    let mut migrations = BTreeMap::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() || !is_migration_file(&path) {
            continue;
        }

        let migration = MigrationFile::load(&path)?;
        migrations.insert(migration.name.clone(), migration);
    }

    Ok(migrations)
}
