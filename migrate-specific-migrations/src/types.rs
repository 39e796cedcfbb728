//! Common types used throughout the migrator.

use std::time::{Duration, Instant};

/// One row of the migration-tracking table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    /// Store-assigned row identifier
    pub id: i64,
    /// Migration name
    pub migration: String,
    /// Batch the migration was applied in
    pub batch: i64,
}

/// Direction of a migrator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply migrations
    Up,
    /// Revert migrations
    Down,
}

/// Result of a single migration operation
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Migration name
    pub name: String,
    /// Execution time
    pub elapsed: Duration,
}

/// SQL that would have been executed for one migration in pretend mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PretendedMigration {
    /// Migration name
    pub name: String,
    /// SQL of the section that would run
    pub sql: String,
}

/// Report of a `run` or `rollback`
#[derive(Debug)]
pub struct MigrationReport {
    /// Which way the migrator went
    pub direction: Direction,
    /// Batch applied to (up) or reverted from (down)
    pub batch: Option<i64>,
    /// Migrations that were executed
    pub successful: Vec<MigrationResult>,
    /// Tracking rows in the reverted batch that have no file in the given path
    pub not_found: Vec<String>,
    /// Migrations that would have run, in pretend mode
    pub pretended: Vec<PretendedMigration>,
    /// Total execution time
    pub total_time: Duration,
    started: Instant,
}

impl MigrationReport {
    /// Create a new migration report
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            batch: None,
            successful: Vec::new(),
            not_found: Vec::new(),
            pretended: Vec::new(),
            total_time: Duration::ZERO,
            started: Instant::now(),
        }
    }

    /// Add a successful migration result
    pub fn add_success(&mut self, result: MigrationResult) {
        self.successful.push(result);
    }

    /// Add a tracking row whose file could not be found
    pub fn add_not_found(&mut self, name: impl Into<String>) {
        self.not_found.push(name.into());
    }

    /// Add a migration that was only pretended
    pub fn add_pretended(&mut self, name: impl Into<String>, sql: impl Into<String>) {
        self.pretended.push(PretendedMigration {
            name: name.into(),
            sql: sql.into(),
        });
    }

    /// Mark the report as completed
    pub fn complete(&mut self) {
        self.total_time = self.started.elapsed();
    }

    /// Get the number of successful migrations
    pub fn successful_count(&self) -> usize {
        self.successful.len()
    }

    /// Names of the migrations executed, or pretended, in execution order
    pub fn names(&self) -> Vec<String> {
        self.successful
            .iter()
            .map(|r| r.name.clone())
            .chain(self.pretended.iter().map(|p| p.name.clone()))
            .collect()
    }

    /// Whether nothing was executed or pretended
    pub fn is_empty(&self) -> bool {
        self.successful.is_empty() && self.pretended.is_empty()
    }

    /// Get a summary of the report
    pub fn summary(&self) -> String {
        let verb = match self.direction {
            Direction::Up => "applied",
            Direction::Down => "reverted",
        };
        format!(
            "Migration Report: {} {}, {} pretended, {} not found ({}ms)",
            self.successful_count(),
            verb,
            self.pretended.len(),
            self.not_found.len(),
            self.total_time.as_millis()
        )
    }
}
