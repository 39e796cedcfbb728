//! migrate-specific - run, roll back or refresh specific migration files

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use migrate_specific_cli::commands::{self, Outcome};
use migrate_specific_cli::config::{self, Config};
use migrate_specific_cli::confirm::DialoguerPrompter;
use migrate_specific_cli::utils::{self, Console, DatabaseType};
use migrate_specific_cli::SpecificArgs;
use migrate_specific_migrations::MigrationConnection;
use std::process::ExitCode;

/// Migrate, rollback or refresh specific migration files
#[derive(Parser)]
#[command(name = "migrate-specific", version, author, about, long_about = None)]
struct Cli {
    /// Database URL (can also be set via DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Configuration file path
    #[arg(long, default_value = "migrate-specific.toml")]
    config: String,

    /// Environment name; "production" protects the migrator
    #[arg(long = "env", env = "APP_ENV")]
    environment: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log: String,

    #[command(flatten)]
    specific: SpecificArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let console = Console::new(cli.specific.quiet);
    if !console.quiet {
        print_header();
    }

    match run(&cli, &console) {
        Ok(Outcome::Declined) => {
            console.error("Abort.");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            console.error(&format!("{:#}", err));
            console.error("Abort.");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let fallback = if cli.verbose && cli.log == "warn" {
        "debug"
    } else {
        cli.log.as_str()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_header() {
    println!(
        "{} {}",
        env!("CARGO_PKG_NAME").bright_blue().bold(),
        concat!("v", env!("CARGO_PKG_VERSION")).bright_blue()
    );
    println!("{}\n", env!("CARGO_PKG_REPOSITORY").dimmed());
}

fn run(cli: &Cli, console: &Console) -> Result<Outcome> {
    // Reject a bad mode before connecting
    cli.specific.mode()?;

    let mut config = config::load_config(&cli.config)?;
    if let Some(environment) = &cli.environment {
        config.environment.clone_from(environment);
    }

    let database_url = cli
        .database_url
        .clone()
        .or_else(|| config.database_url.clone())
        .context("Database URL not provided. Use --database-url or set DATABASE_URL env var")?;

    let db_type = utils::parse_database_url(&database_url)?;
    if cli.verbose {
        console.info(&format!("Database: {} ({})", database_url, db_type.name()));
        console.info(&format!("Environment: {}", config.environment));
    }

    match db_type {
        DatabaseType::PostgreSQL => run_postgres(&database_url, cli, &config, console),
        DatabaseType::SQLite => run_sqlite(&database_url, cli, &config, console),
    }
}

fn execute(
    cli: &Cli,
    config: &Config,
    conn: &mut dyn MigrationConnection,
    console: &Console,
) -> Result<Outcome> {
    let mut prompter = DialoguerPrompter;
    commands::execute(&cli.specific, config, conn, &mut prompter, console)
}

#[cfg(feature = "postgres")]
fn run_postgres(database_url: &str, cli: &Cli, config: &Config, console: &Console) -> Result<Outcome> {
    use migrate_specific_migrations::postgres::PostgresConnectionExt;
    use postgres::{Client, NoTls};

    let progress = console.progress("Connecting to PostgreSQL");
    let mut client = match Client::connect(database_url, NoTls) {
        Ok(client) => {
            progress.finish();
            client
        }
        Err(err) => {
            progress.fail();
            return Err(err).context("Failed to connect to PostgreSQL");
        }
    };

    execute(cli, config, &mut client.migration_connection(), console)
}

#[cfg(not(feature = "postgres"))]
fn run_postgres(_: &str, _: &Cli, _: &Config, _: &Console) -> Result<Outcome> {
    anyhow::bail!("PostgreSQL support is not enabled in this build")
}

#[cfg(feature = "sqlite")]
fn run_sqlite(database_url: &str, cli: &Cli, config: &Config, console: &Console) -> Result<Outcome> {
    use migrate_specific_migrations::sqlite::SqliteConnectionExt;
    use rusqlite::Connection;

    let db_path = utils::sqlite_path(database_url);

    let progress = console.progress("Opening SQLite database");
    let mut conn = match Connection::open(db_path) {
        Ok(conn) => {
            progress.finish();
            conn
        }
        Err(err) => {
            progress.fail();
            return Err(err).context("Failed to open SQLite database");
        }
    };

    execute(cli, config, &mut conn.migration_connection(), console)
}

#[cfg(not(feature = "sqlite"))]
fn run_sqlite(_: &str, _: &Cli, _: &Config, _: &Console) -> Result<Outcome> {
    anyhow::bail!("SQLite support is not enabled in this build")
}
