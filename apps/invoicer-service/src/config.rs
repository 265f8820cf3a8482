//! # Service Configuration
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! ## Environment Variables
//! | Variable                   | Default                              |
//! |----------------------------|--------------------------------------|
//! | `INVOICER_DB_PATH`         | `<platform data dir>/invoicer.db`    |
//! | `INVOICER_MAX_CONNECTIONS` | `5` (must be at least 1)             |
//! | `INVOICER_RUN_MIGRATIONS`  | `true`                               |
//!
//! Platform data directories:
//! - **macOS**: `~/Library/Application Support/com.invoicer.invoicer/`
//! - **Windows**: `%APPDATA%\invoicer\invoicer\data\`
//! - **Linux**: `~/.local/share/invoicer/`

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use invoicer_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Connection pool size.
    pub max_connections: u32,

    /// Apply pending migrations on connect.
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        AppConfig::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// `from_env` with the process environment swapped out, so tests never
    /// have to mutate global state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup("INVOICER_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_database_path()?,
        };

        let max_connections: u32 = lookup("INVOICER_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("INVOICER_MAX_CONNECTIONS".to_string()))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "INVOICER_MAX_CONNECTIONS".to_string(),
            ));
        }

        let run_migrations = match lookup("INVOICER_RUN_MIGRATIONS") {
            None => true,
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("INVOICER_RUN_MIGRATIONS".to_string()))?,
        };

        Ok(AppConfig {
            database_path,
            max_connections,
            run_migrations,
        })
    }

    /// Database settings for [`invoicer_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .min_connections(1)
            .run_migrations(self.run_migrations)
    }

    /// Creates the directory the database file lives in.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        match self.database_path.parent() {
            Some(dir) if dir != Path::new("") => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

/// `<platform data dir>/invoicer.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "invoicer", "invoicer")
        .ok_or_else(|| ConfigError::MissingRequired("INVOICER_DB_PATH".to_string()))?;

    Ok(dirs.data_dir().join("invoicer.db"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    /// No platform data directory could be determined and no override was given.
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
