//! Batch-aware migrator working on a directory of migration files.

use crate::{
    config::MigratorConfig,
    error::{MigrationError, Result},
    file::{self, MigrationFile},
    repository::MigrationRepository,
    traits::{transaction, MigrationConnection},
    types::{Direction, MigrationReport, MigrationResult},
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

/// Options for a single `run` or `rollback`
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Report the SQL that would run instead of running it
    pub pretend: bool,
    /// Proceed even when the migrator is protected
    pub force: bool,
    /// Restrict the operation to these migration names
    pub only: Option<BTreeSet<String>>,
}

impl MigrateOptions {
    /// Options with every flag off
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable pretend mode
    pub fn pretend(mut self, enabled: bool) -> Self {
        self.pretend = enabled;
        self
    }

    /// Enable or disable force
    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    /// Restrict the operation to `names`
    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn includes(&self, name: &str) -> bool {
        self.only.as_ref().map_or(true, |only| only.contains(name))
    }
}

/// The migrator
pub struct Migrator {
    config: MigratorConfig,
    repository: MigrationRepository,
}

impl Migrator {
    /// Create a migrator
    pub fn new(config: MigratorConfig) -> Self {
        let repository = MigrationRepository::new(config.clone());
        Self { config, repository }
    }

    /// Tracking-table access used by this migrator
    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    /// Migration files found in `path`, ordered by name
    pub fn migration_files(&self, path: &Path) -> Result<BTreeMap<String, MigrationFile>> {
        file::load_directory(path)
    }

    /// Migration names found in `path`, ordered by name
    pub fn migration_names(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.migration_files(path)?.into_keys().collect())
    }

    /// Apply every pending migration in `path` as one new batch
    pub fn run(
        &self,
        conn: &mut dyn MigrationConnection,
        path: &Path,
        options: &MigrateOptions,
    ) -> Result<MigrationReport> {
        self.check_force(options)?;
        let mut report = MigrationReport::new(Direction::Up);
        let files = self.migration_files(path)?;

        if !options.pretend && self.config.auto_create_table {
            self.repository.ensure_table(conn)?;
        }

        let ran = self.repository.ran(conn)?;
        let pending: Vec<&MigrationFile> = files
            .values()
            .filter(|f| !ran.contains(&f.name) && options.includes(&f.name))
            .collect();

        if pending.is_empty() {
            tracing::info!(path = %path.display(), "nothing to migrate");
            report.complete();
            return Ok(report);
        }

        let batch = self.repository.next_batch_number(conn)?;
        report.batch = Some(batch);

        for migration in pending {
            if options.pretend {
                report.add_pretended(&migration.name, &migration.up_sql);
                continue;
            }
            self.run_up(conn, migration, batch, &mut report)?;
        }

        report.complete();
        Ok(report)
    }

    /// Revert the newest batch, limited to migrations that have a file in `path`
    pub fn rollback(
        &self,
        conn: &mut dyn MigrationConnection,
        path: &Path,
        options: &MigrateOptions,
    ) -> Result<MigrationReport> {
        self.check_force(options)?;
        let mut report = MigrationReport::new(Direction::Down);
        let files = self.migration_files(path)?;

        let last = self.repository.last(conn)?;
        report.batch = last.first().map(|row| row.batch);

        for row in last {
            let Some(migration) = files.get(&row.migration) else {
                tracing::warn!(migration = %row.migration, "migration not found");
                report.add_not_found(row.migration);
                continue;
            };
            if !options.includes(&migration.name) {
                continue;
            }

            if options.pretend {
                report.add_pretended(&migration.name, &migration.down_sql);
                continue;
            }
            self.run_down(conn, migration, &mut report)?;
        }

        if report.is_empty() {
            tracing::info!(path = %path.display(), "nothing to rollback");
        }

        report.complete();
        Ok(report)
    }

    fn check_force(&self, options: &MigrateOptions) -> Result<()> {
        if self.config.protected && !options.force {
            return Err(MigrationError::ForceRequired);
        }
        Ok(())
    }

    fn run_up(
        &self,
        conn: &mut dyn MigrationConnection,
        migration: &MigrationFile,
        batch: i64,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let start = Instant::now();
        tracing::info!(migration = %migration.name, batch, "migrating");

        let apply = |conn: &mut dyn MigrationConnection| -> Result<()> {
            execute_section(conn, migration, &migration.up_sql)?;
            self.repository.log(conn, &migration.name, batch)
        };

        if self.config.transaction_per_migration {
            transaction(conn, apply)?;
        } else {
            apply(conn)?;
        }

        let elapsed = start.elapsed();
        tracing::info!(migration = %migration.name, ?elapsed, "migrated");
        report.add_success(MigrationResult {
            name: migration.name.clone(),
            elapsed,
        });
        Ok(())
    }

    fn run_down(
        &self,
        conn: &mut dyn MigrationConnection,
        migration: &MigrationFile,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let start = Instant::now();
        tracing::info!(migration = %migration.name, "rolling back");

        let revert = |conn: &mut dyn MigrationConnection| -> Result<()> {
            execute_section(conn, migration, &migration.down_sql)?;
            self.repository.delete(conn, &migration.name)
        };

        if self.config.transaction_per_migration {
            transaction(conn, revert)?;
        } else {
            revert(conn)?;
        }

        let elapsed = start.elapsed();
        tracing::info!(migration = %migration.name, ?elapsed, "rolled back");
        report.add_success(MigrationResult {
            name: migration.name.clone(),
            elapsed,
        });
        Ok(())
    }
}

fn execute_section(conn: &mut dyn MigrationConnection, migration: &MigrationFile, sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Ok(());
    }

    conn.execute(sql).map_err(|err| MigrationError::MigrationFailed {
        name: migration.name.clone(),
        message: match err {
            MigrationError::DatabaseError(message) => message,
            other => other.to_string(),
        },
    })
}
