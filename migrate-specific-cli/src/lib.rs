//! migrate-specific CLI library
//!
//! This crate provides the `migrate-specific` command: it runs, rolls back or
//! refreshes a chosen subset of migration files through the batch-aware
//! migrator in `migrate-specific-migrations`.

use clap::Args;
use std::path::PathBuf;

pub mod bookkeeping;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod mode;
pub mod staging;
pub mod utils;

use confirm::GateFlags;
use error::SpecificError;
use mode::Mode;

#[derive(Args, Debug, Clone)]
pub struct SpecificArgs {
    /// Migration files or directories; defaults to the configured migrations directory
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Execution mode: default, rollback or refresh
    #[arg(short, long, default_value = "default")]
    pub mode: String,

    /// Keep the original batch numbers (refresh mode only)
    #[arg(short, long)]
    pub keep_batch: bool,

    /// Disable foreign key checks while reverting
    #[arg(short = 'f', long)]
    pub skip_foreign_key_checks: bool,

    /// Show the SQL that would run without changing the database
    #[arg(short, long)]
    pub pretend: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub assume_yes: bool,

    /// Skip the confirmation prompt and suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not ask any interactive question
    #[arg(short, long)]
    pub no_interaction: bool,
}

impl Default for SpecificArgs {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            mode: Mode::Default.as_str().to_string(),
            keep_batch: false,
            skip_foreign_key_checks: false,
            pretend: false,
            assume_yes: false,
            quiet: false,
            no_interaction: false,
        }
    }
}

impl SpecificArgs {
    pub fn mode(&self) -> Result<Mode, SpecificError> {
        self.mode.parse()
    }

    pub fn gate_flags(&self) -> GateFlags {
        GateFlags {
            assume_yes: self.assume_yes,
            quiet: self.quiet,
            no_interaction: self.no_interaction,
            pretend: self.pretend,
        }
    }
}
