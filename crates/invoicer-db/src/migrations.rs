//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the crate and applied
//! on startup.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   customers, invoices, invoice_items
//!                              + unique NOCASE email, CHECKs, cascade
//! ```
//!
//! Applied versions are recorded by sqlx in `_sqlx_migrations`. A file that
//! has been applied anywhere is frozen; schema changes go in a new
//! `NNN_description.sql` with the next number.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded versus applied migration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    /// No embedded migration is left to apply.
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded, in version order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying pending migrations");

    MIGRATOR.run(pool).await?;

    info!(version = latest_version(), "Schema up to date");
    Ok(())
}

/// How far the schema of `pool` is behind the embedded migrations.
///
/// A database that was never migrated has no `_sqlx_migrations` table and
/// reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: applied.max(0) as usize,
    })
}

/// Version number of the newest embedded migration (0 when there are none).
pub fn latest_version() -> i64 {
    MIGRATOR
        .migrations
        .iter()
        .map(|m| m.version)
        .max()
        .unwrap_or(0)
}
