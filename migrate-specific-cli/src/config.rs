//! Configuration handling for migrate-specific

use anyhow::{Context, Result};
use migrate_specific_migrations::{config::DEFAULT_TABLE_NAME, MigratorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment name that makes the migrator protected
pub const PRODUCTION: &str = "production";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub migrations: MigrationConfig,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub scratch: ScratchConfig,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(skip)]
    pub database_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_migrations_dir")]
    pub directory: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default = "default_true")]
    pub transaction_per_migration: bool,

    #[serde(default = "default_true")]
    pub auto_create_table: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Where scratch directories are created
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScratchConfig {
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations: MigrationConfig::default(),
            database: None,
            scratch: ScratchConfig::default(),
            environment: default_environment(),
            database_url: None,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: default_migrations_dir(),
            table_name: default_table_name(),
            transaction_per_migration: true,
            auto_create_table: true,
        }
    }
}

fn default_migrations_dir() -> String {
    "database/migrations".to_string()
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_environment() -> String {
    "local".to_string()
}

fn default_true() -> bool {
    true
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_path = Path::new(path);

    if !config_path.exists() {
        // Return default config if file doesn't exist
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", path))?;

    let mut config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path))?;

    config
        .to_migrator_config()
        .validate()
        .with_context(|| format!("Invalid config file: {}", path))?;

    // If database URL is in config, use it
    if let Some(ref db_config) = config.database {
        config.database_url = Some(db_config.url.clone());
    }

    Ok(config)
}

impl Config {
    pub fn default_with_directory(directory: &str) -> Self {
        let mut config = Self::default();
        config.migrations.directory = directory.to_string();
        config
    }

    /// Parent directory for scratch directories; the OS temp dir unless configured
    pub fn scratch_parent(&self) -> PathBuf {
        self.scratch
            .directory
            .as_ref()
            .map_or_else(std::env::temp_dir, PathBuf::from)
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    pub fn to_migrator_config(&self) -> MigratorConfig {
        MigratorConfig::new()
            .with_table_name(self.migrations.table_name.clone())
            .with_transactions(self.migrations.transaction_per_migration)
            .with_auto_create_table(self.migrations.auto_create_table)
            .protected(self.is_production())
    }
}
