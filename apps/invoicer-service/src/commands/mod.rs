//! # Commands Module
//!
//! Every operation the service exposes to a transport.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports, payload parsing)
//! ├── invoice.rs   ◄─── create / update status / get / list invoices
//! └── customer.rs  ◄─── create / get / list customers
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Transport (HTTP handler, CLI, ...)                                     │
//! │  ──────────────────────────────────                                     │
//! │  let draft = parse_payload(body)?;                                      │
//! │  let dto = create_invoice(&db, draft).await?;                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn create_invoice(                                           │
//! │      db: &Database,          ◄── Shared pool handle                     │
//! │      draft: InvoiceDraft,    ◄── Parsed payload                         │
//! │  ) -> Result<InvoiceDto, ApiError>                                      │
//! │         │                                                               │
//! │         ├── reads what the rules need (customer exists? today?)         │
//! │         ├── runs invoicer-core rules (all errors collected)             │
//! │         └── persists through invoicer-db repositories                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Transport serializes InvoiceDto or ApiError                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod customer;
pub mod invoice;

pub use customer::{create_customer, get_customer, list_customers, CustomerDto};
pub use invoice::{
    create_invoice, get_invoice, list_invoices, update_invoice, InvoiceDto, InvoiceItemDto,
};

/// Parses a JSON payload into a command input.
///
/// Shape errors (wrong types, money with three decimals, malformed dates)
/// become a `VALIDATION_ERROR`.
///
/// ```rust
/// use invoicer_core::InvoiceUpdate;
/// use invoicer_service::commands::parse_payload;
///
/// let update: InvoiceUpdate = parse_payload(serde_json::json!({ "status": "paid" })).unwrap();
/// assert_eq!(update.status.as_deref(), Some("paid"));
/// ```
pub fn parse_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use invoicer_db::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }
}
