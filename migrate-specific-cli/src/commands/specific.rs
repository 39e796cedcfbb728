//! Stage the selected migrations, confirm, and run them in the chosen mode

use crate::bookkeeping::{discarded, move_to_head, move_to_head_in, without_foreign_keys, BatchSnapshot};
use crate::config::Config;
use crate::confirm::{confirm_execution, Prompter};
use crate::error::{Result, SpecificError};
use crate::mode::Mode;
use crate::staging::{ignored_files, resolve_sources, stage, ScratchDir};
use crate::utils::{colorize_number, Console};
use crate::SpecificArgs;
use colored::Colorize;
use migrate_specific_migrations::{
    Direction, MigrateOptions, MigrationConnection, MigrationReport, Migrator,
};
use std::io;
use std::path::Path;

/// What a run ended up doing
#[derive(Debug)]
pub enum Outcome {
    /// Pending migrations were applied (`default` mode)
    Applied(MigrationReport),
    /// Migrations were reverted (`rollback` mode)
    Reverted(MigrationReport),
    /// Migrations were reverted and applied again (`refresh` mode)
    Refreshed {
        reverted: MigrationReport,
        applied: MigrationReport,
    },
    /// The operator answered "no"; nothing was executed
    Declined,
}

impl Outcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    /// Print the per-migration result lines
    pub fn print(&self, console: &Console) {
        match self {
            Outcome::Applied(report) | Outcome::Reverted(report) => print_report(report, console),
            Outcome::Refreshed { reverted, applied } => {
                print_report(reverted, console);
                print_report(applied, console);
            }
            Outcome::Declined => {}
        }
    }
}

fn print_report(report: &MigrationReport, console: &Console) {
    let (done, nothing) = match report.direction {
        Direction::Up => ("Migrated", "Nothing to migrate."),
        Direction::Down => ("Rolled back", "Nothing to rollback."),
    };

    for name in &report.not_found {
        console.warning(&format!("Migration not found: {}", name));
    }

    if report.is_empty() {
        console.info(nothing);
        return;
    }

    for pretended in &report.pretended {
        console.line(&format!("{}: {}", pretended.name.cyan(), pretended.sql.trim()));
    }

    for result in &report.successful {
        console.success(&format!("{}: {}", done, result.name));
    }
}

/// Run the command end to end.
///
/// The mode is parsed before anything touches the file system. The scratch
/// directory is removed whether the run succeeds, fails, or is declined.
pub fn execute(
    args: &SpecificArgs,
    config: &Config,
    conn: &mut dyn MigrationConnection,
    prompter: &mut dyn Prompter,
    console: &Console,
) -> anyhow::Result<Outcome> {
    let mode = args.mode()?;
    warn_ignored_flags(args, mode, console);

    let progress = console.progress("Create temporary working directory");
    let scratch = match ScratchDir::create(&config.scratch_parent()) {
        Ok(scratch) => {
            progress.finish();
            scratch
        }
        Err(err) => {
            progress.fail();
            return Err(err.into());
        }
    };
    let scratch_path = scratch.path().to_path_buf();

    let result = run_staged(args, mode, config, conn, prompter, console, &scratch_path);

    let progress = console.progress("Clear temporary working directory");
    let closed = scratch.close();
    if closed.is_ok() {
        progress.finish();
    } else {
        progress.fail();
    }
    settle(result, closed, &scratch_path, console)
}

/// Combine the run result with the cleanup result.
///
/// A failed cleanup after a successful run is the error. After a failed run
/// it is only reported and the run's error is returned.
fn settle(
    result: anyhow::Result<Outcome>,
    closed: io::Result<()>,
    scratch_path: &Path,
    console: &Console,
) -> anyhow::Result<Outcome> {
    match (result, closed) {
        (result, Ok(())) => result,
        (Ok(_), Err(err)) => Err(SpecificError::io(scratch_path, err).into()),
        (Err(err), Err(close_err)) => {
            tracing::warn!(path = %scratch_path.display(), error = %close_err, "scratch directory left behind");
            console.warning(&format!(
                "Failed to remove temporary working directory {}: {}",
                scratch_path.display(),
                close_err
            ));
            Err(err)
        }
    }
}

fn warn_ignored_flags(args: &SpecificArgs, mode: Mode, console: &Console) {
    if args.keep_batch && mode != Mode::Refresh {
        console.warning("Option 'keep-batch' only applies to refresh mode and is ignored.");
    }
    if args.skip_foreign_key_checks && mode == Mode::Default {
        console.warning("Option 'skip-foreign-key-checks' has no effect in default mode and is ignored.");
    }
}

fn run_staged(
    args: &SpecificArgs,
    mode: Mode,
    config: &Config,
    conn: &mut dyn MigrationConnection,
    prompter: &mut dyn Prompter,
    console: &Console,
    scratch: &Path,
) -> anyhow::Result<Outcome> {
    for path in ignored_files(&args.files) {
        tracing::warn!(path = %path.display(), "ignoring file without .sql extension");
        console.warning(&format!("Ignoring {}: not a .sql migration file", path.display()));
    }

    let progress = console.progress("Copy files");
    let staged = resolve_sources(&args.files, Path::new(&config.migrations.directory))
        .and_then(|sources| stage(&sources, scratch));
    match staged {
        Ok(files) => progress.finish_with_message(&colorize_number(files.len(), "file(s)")),
        Err(err) => {
            progress.fail();
            return Err(err.into());
        }
    }

    let migrator = Migrator::new(config.to_migrator_config());
    let names = migrator.migration_names(scratch).map_err(SpecificError::from)?;

    let plan = Plan {
        migrator: &migrator,
        scratch,
        names: &names,
        pretend: args.pretend,
        keep_batch: args.keep_batch && mode == Mode::Refresh,
        skip_foreign_key_checks: args.skip_foreign_key_checks && mode.reverts(),
    };

    if !names.is_empty()
        && !confirm_execution(
            mode,
            &names,
            args.gate_flags(),
            plan.skip_foreign_key_checks,
            console,
            prompter,
        )?
    {
        tracing::info!(%mode, "declined by operator");
        return Ok(Outcome::Declined);
    }

    let outcome = plan.dispatch(mode, conn)?;
    outcome.print(console);
    Ok(outcome)
}

/// One confirmed run over the staged migrations
struct Plan<'a> {
    migrator: &'a Migrator,
    scratch: &'a Path,
    names: &'a [String],
    pretend: bool,
    keep_batch: bool,
    skip_foreign_key_checks: bool,
}

impl Plan<'_> {
    fn dispatch(&self, mode: Mode, conn: &mut dyn MigrationConnection) -> Result<Outcome> {
        tracing::info!(%mode, pretend = self.pretend, migrations = self.names.len(), "dispatching");
        match mode {
            Mode::Default => Ok(Outcome::Applied(self.migrate(conn)?)),
            Mode::Rollback => Ok(Outcome::Reverted(self.rollback(conn)?)),
            Mode::Refresh => {
                let (reverted, applied) = self.refresh(conn)?;
                Ok(Outcome::Refreshed { reverted, applied })
            }
        }
    }

    fn options(&self) -> MigrateOptions {
        MigrateOptions::new().pretend(self.pretend).force(true)
    }

    fn migrate(&self, conn: &mut dyn MigrationConnection) -> Result<MigrationReport> {
        Ok(self.migrator.run(conn, self.scratch, &self.options())?)
    }

    fn rollback(&self, conn: &mut dyn MigrationConnection) -> Result<MigrationReport> {
        if self.pretend {
            return discarded(conn, |conn| self.revert(conn));
        }
        self.revert(conn)
    }

    fn refresh(&self, conn: &mut dyn MigrationConnection) -> Result<(MigrationReport, MigrationReport)> {
        let repository = self.migrator.repository();

        if self.pretend {
            return discarded(conn, |conn| -> Result<(MigrationReport, MigrationReport)> {
                let reverted = self.revert(conn)?;
                for name in reverted.names() {
                    repository.delete(conn, &name)?;
                }
                let applied = self.reapply(conn, reverted.names())?;
                Ok((reverted, applied))
            });
        }

        let snapshot = if self.keep_batch {
            Some(BatchSnapshot::capture(conn, repository, self.names)?)
        } else {
            None
        };

        let reverted = self.revert(conn)?;
        let applied = self.reapply(conn, reverted.names())?;

        if let Some(snapshot) = snapshot {
            snapshot.restore(conn, repository)?;
        }

        Ok((reverted, applied))
    }

    /// Move the selected rows to the head batch and roll that batch back.
    ///
    /// Under pretend the caller already holds the transaction.
    fn revert(&self, conn: &mut dyn MigrationConnection) -> Result<MigrationReport> {
        let repository = self.migrator.repository();

        if repository.rows_for(conn, self.names)?.is_empty() {
            tracing::info!("none of the selected migrations has been applied");
            let mut report = MigrationReport::new(Direction::Down);
            report.complete();
            return Ok(report);
        }

        let options = self.options();
        if self.pretend {
            move_to_head_in(conn, repository, self.names)?;
            return Ok(self.migrator.rollback(conn, self.scratch, &options)?);
        }

        move_to_head(conn, repository, self.names)?;
        without_foreign_keys(conn, self.skip_foreign_key_checks, |conn| {
            Ok(self.migrator.rollback(conn, self.scratch, &options)?)
        })
    }

    /// Apply again exactly the migrations that were reverted
    fn reapply(&self, conn: &mut dyn MigrationConnection, reverted: Vec<String>) -> Result<MigrationReport> {
        if reverted.is_empty() {
            let mut report = MigrationReport::new(Direction::Up);
            report.complete();
            return Ok(report);
        }

        Ok(self.migrator.run(conn, self.scratch, &self.options().only(reverted))?)
    }
}
