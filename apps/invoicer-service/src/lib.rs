//! # Invoicer Service
//!
//! Command layer for Invoicer. A transport (HTTP handlers, a CLI, a queue
//! consumer) parses its input, calls one command, and serializes either the
//! DTO or the [`ApiError`] it gets back.
//!
//! ## Module Organization
//! ```text
//! invoicer_service/
//! ├── lib.rs          ◄─── You are here (startup: tracing, connect)
//! ├── config.rs       ◄─── AppConfig from INVOICER_* variables
//! ├── error.rs        ◄─── API error type for commands
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports, payload parsing
//! │   ├── invoice.rs  ◄─── Invoice create / status update / get / list
//! │   └── customer.rs ◄─── Customer create / get / list
//! └── bin/seed.rs     ◄─── Demo data
//! ```
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Service Startup                                      │
//! │                                                                         │
//! │  init_tracing()              RUST_LOG or "info,invoicer=debug,..."      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppConfig::from_env()?      INVOICER_DB_PATH, ...                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  connect(&config).await?     data dir + pool + migrations               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commands::create_invoice(&db, draft).await                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use invoicer_db::{Database, DbError};

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorCode};

/// Errors that stop the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot create data directory: {0}")]
    DataDir(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=invoicer=trace` - Show trace for invoicer crates only
/// - Default: INFO, DEBUG for invoicer crates, WARN for sqlx
///
/// Calling it twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,invoicer=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the database described by `config`.
///
/// Creates the parent directory of the database file first, then the pool.
/// Migrations run when `config.run_migrations` is set.
pub async fn connect(config: &AppConfig) -> Result<Database, StartupError> {
    config.ensure_data_dir()?;

    let db = Database::new(config.db_config()).await?;

    info!(path = %config.database_path.display(), "Invoicer database ready");
    Ok(db)
}
