//! # invoicer-core: Pure Business Logic for Invoicer
//!
//! This crate is the **heart** of Invoicer. It contains the invoice domain
//! model, total computation and validation rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoicer Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Transport (HTTP, CLI, ... not here)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON-like values                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              invoicer-service (Command Layer)                   │   │
//! │  │   create_invoice, update_invoice, create_customer, etc.        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ invoicer-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   rules   │  │ validation│  │   │
//! │  │   │ Customer  │  │   Money   │  │  create   │  │  per-field│  │   │
//! │  │   │ Invoice   │  │  parsing  │  │  update   │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 invoicer-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Invoice, InvoiceItem, InvoiceStatus)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`rules`] - Invoice creation, status update and customer creation rules
//! - [`validation`] - Single-field validators
//! - [`error`] - Domain error types and the field error map
//!
//! ## Ground Rules
//!
//! - Nothing here reads the clock, the disk or the network. Today's date and
//!   "does this customer exist" are arguments.
//! - Amounts are `i64` cents end to end; a float never touches a price.
//! - Totals are computed from items on every read and never stored.
//! - A failed rule is recorded and the next one still runs.
//!
//! ## Example Usage
//!
//! ```rust
//! use invoicer_core::Money;
//!
//! // Parse money from its decimal string (never from floats!)
//! let price: Money = "25.50".parse().unwrap();
//! assert_eq!(price.cents(), 2550);
//!
//! // Line amount: quantity × unit price, exact in cents
//! let amount = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(amount.to_string(), "51.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use money::Money;
pub use rules::{
    CreationContext, CustomerDraft, InvoiceDraft, InvoiceUpdate, ItemDraft, NewCustomer,
    NewInvoice, NewInvoiceItem, RawField, StatusChange,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a customer name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of an email address, in characters.
///
/// The practical limit of a forward path in SMTP.
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of an invoice item description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Maximum length of an invoice status, in characters.
pub const MAX_STATUS_LEN: usize = 20;
