//! # invoicer-db: SQLite Storage for Invoicer
//!
//! Persists what invoicer-core has already validated. Nothing in this crate
//! decides whether an invoice is valid; the schema's constraints only catch
//! writes that went around the rules.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        invoicer-db                                      │
//! │                                                                         │
//! │  Database (pool.rs)                                                     │
//! │  ├── SqlitePool: WAL, foreign keys, busy timeout                       │
//! │  ├── migrations.rs: embedded migrations/sqlite/*.sql                    │
//! │  │                                                                      │
//! │  ├── customers() ──► CustomerRepository                                 │
//! │  │                   insert · get_by_id · email_exists (NOCASE) · list  │
//! │  │                                                                      │
//! │  └── invoices()  ──► InvoiceRepository                                  │
//! │                      create (tx) · get_by_id · list · update_status     │
//! │                      delete (tx) · count                                │
//! │                                                                         │
//! │  sqlx::Error ──► DbError (error.rs)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use invoicer_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("invoicer.db")).await?;
//! let invoices = db.invoices().list().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
