//! # Database Handle
//!
//! Opens the SQLite pool, applies the schema and hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Opening the Database                            │
//! │                                                                         │
//! │  DbConfig::new("invoicer.db")        DbConfig::in_memory()              │
//! │       │  WAL, synchronous=NORMAL          │  one connection that never  │
//! │       │  foreign_keys=ON, busy 5s         │  idles out (it IS the db)   │
//! │       └───────────────┬───────────────────┘                             │
//! │                       ▼                                                 │
//! │              Database::new(config)                                      │
//! │                       │                                                 │
//! │                       ├── SqlitePool                                    │
//! │                       └── migrations (unless run_migrations = false)    │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │       db.customers()          db.invoices()                             │
//! │       CustomerRepository      InvoiceRepository                         │
//! │       (pool clone)            (pool clone; create in a tx)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Foreign keys are off in SQLite unless enabled per connection; the
//! invoice → customer reference and the item → invoice cascade depend on it.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/invoicer/invoicer.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first connect. `:memory:` for a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How long a command waits for a free connection. Default: 30 seconds
    pub connect_timeout: Duration,

    /// How long SQLite retries a locked database before failing a write.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// A fresh, empty, migrated database that disappears with the pool.
    ///
    /// Every call yields a separate database, so tests never see each
    /// other's rows.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the invoicer database.
///
/// Clones share one pool. Commands take `&Database` and ask it for the
/// repository they need:
///
/// ```rust,ignore
/// let invoice = db
///     .invoices()
///     .get_by_id(id)
///     .await?
///     .ok_or_else(|| ApiError::not_found("Invoice", id))?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    ///
    /// ## Errors
    /// * `DbError::ConnectionFailed` - the file cannot be opened or created
    /// * `DbError::MigrationFailed` - a migration failed or an applied one
    ///   was edited
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening invoicer database"
        );

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if config.is_in_memory() {
            // The single connection is the database.
            pool_options = pool_options.max_connections(1).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call on an up-to-date schema.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    /// Every later query fails.
    pub async fn close(&self) {
        info!("Closing invoicer database");
        self.pool.close().await;
    }

    /// `SELECT 1` round trip.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
