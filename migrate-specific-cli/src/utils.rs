//! Utility functions for migrate-specific

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Parse database URL and determine database type
pub fn parse_database_url(url: &str) -> Result<DatabaseType> {
    if url.starts_with("postgresql://") || url.starts_with("postgres://") {
        Ok(DatabaseType::PostgreSQL)
    } else if url.starts_with("sqlite:") || url.ends_with(".db") || url.ends_with(".sqlite") {
        Ok(DatabaseType::SQLite)
    } else {
        anyhow::bail!("Unsupported database URL format. Use postgresql:// or sqlite:")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::SQLite => "SQLite",
        }
    }
}

/// Path part of a SQLite URL
pub fn sqlite_path(url: &str) -> &str {
    url.strip_prefix("sqlite:").unwrap_or(url)
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Console output for one command run.
///
/// Everything except errors is suppressed when `quiet` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    pub quiet: bool,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            print_success(message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            print_info(message);
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            print_warning(message);
        }
    }

    pub fn error(&self, message: &str) {
        print_error(message);
    }

    pub fn line(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn comment(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.yellow());
        }
    }

    pub fn progress(&self, message: &str) -> Progress {
        Progress::new(message, self.quiet)
    }
}

/// Progress indicator for a single step
pub struct Progress {
    start: Instant,
    quiet: bool,
}

impl Progress {
    pub fn new(message: &str, quiet: bool) -> Self {
        if !quiet {
            print!("{} {} ... ", "⟳".cyan().bold(), message);
            // A failed flush only delays the step text
            let _ = io::stdout().flush();
        }

        Self {
            start: Instant::now(),
            quiet,
        }
    }

    pub fn finish(self) {
        if !self.quiet {
            let duration = self.start.elapsed();
            println!("{} ({})", "done".green(), format_duration(duration).dimmed());
        }
    }

    pub fn finish_with_message(self, message: &str) {
        if !self.quiet {
            let duration = self.start.elapsed();
            println!(
                "{} {} ({})",
                "done".green(),
                message,
                format_duration(duration).dimmed()
            );
        }
    }

    pub fn fail(self) {
        if !self.quiet {
            println!("{}", "failed".red());
        }
    }
}

/// Colorize a number with a label
pub fn colorize_number(num: usize, label: &str) -> String {
    format!("{} {}", num.to_string().bold(), label)
}
