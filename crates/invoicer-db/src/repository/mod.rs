//! # Repository Module
//!
//! Database repository implementations for Invoicer.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service Command                                                       │
//! │       │                                                                 │
//! │       │  db.invoices().get_by_id("…")                                  │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── create(&self, new_invoice)      (one transaction)                 │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self)                                                       │
//! │  ├── update_status(&self, id, status)                                  │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories only persist. Validation happens before, in              │
//! │  invoicer-core; the schema's constraints are the last line.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Insert, lookup by id or email (any case), list
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices with their items

pub mod customer;
pub mod invoice;
