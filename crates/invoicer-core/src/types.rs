//! # Domain Types
//!
//! Core domain types used throughout Invoicer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Invoice     │   │  InvoiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  customer_id    │   │  id (UUID)      │       │
//! │  │  name           │   │  issue_date     │   │  invoice_id(FK) │       │
//! │  │  email (unique) │   │  due_date       │◆──│  position       │       │
//! │  │  address?       │   │  status         │   │  quantity       │       │
//! │  └─────────────────┘   │  items[1..]     │   │  unit_price     │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  total_amount and amount are DERIVED: Σ quantity × unit_price.         │
//! │  Neither is ever stored or accepted from a caller.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer that invoices are billed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Unique across all customers, compared case-insensitively.
    pub email: String,

    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// The status of an invoice.
///
/// The set is open: the well-known values get their own variants and
/// anything else is carried verbatim in [`InvoiceStatus::Other`].
/// On the wire and in the database it is a plain lowercase string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    /// Issued, awaiting payment.
    #[default]
    Pending,
    Paid,
    Cancelled,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Other(s) => s,
        }
    }
}

impl From<&str> for InvoiceStatus {
    fn from(s: &str) -> Self {
        match s.trim() {
            "pending" => InvoiceStatus::Pending,
            "paid" => InvoiceStatus::Paid,
            "cancelled" => InvoiceStatus::Cancelled,
            other => InvoiceStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(s: String) -> Self {
        InvoiceStatus::from(s.as_str())
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A billable line owned by exactly one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,

    /// Owning invoice; the item is deleted with it.
    pub invoice_id: String,

    /// 0-based line number, the order the caller listed the items in.
    pub position: i64,

    pub description: String,

    /// Always > 0.
    pub quantity: i64,

    /// Always > 0.00.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_price_cents"))]
    pub unit_price: Money,
}

impl InvoiceItem {
    /// Line amount: quantity × unit_price.
    ///
    /// ```rust
    /// use invoicer_core::{InvoiceItem, Money};
    ///
    /// let item = InvoiceItem {
    ///     id: "i-1".into(),
    ///     invoice_id: "inv-1".into(),
    ///     position: 0,
    ///     description: "Product B".into(),
    ///     quantity: 2,
    ///     unit_price: Money::from_cents(2550),
    /// };
    /// assert_eq!(item.amount().to_string(), "51.00");
    /// ```
    #[inline]
    pub fn amount(&self) -> Money {
        line_amount(self.quantity, self.unit_price)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A billing document for one customer, owning one or more items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,

    pub customer_id: String,

    /// Date the invoice was created. Never changes.
    pub issue_date: NaiveDate,

    /// Never before `issue_date`. Never changes.
    pub due_date: NaiveDate,

    /// The only field that can change after creation.
    pub status: InvoiceStatus,

    /// Line items in line order. Never empty.
    pub items: Vec<InvoiceItem>,

    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Sum of the item amounts.
    #[inline]
    pub fn total_amount(&self) -> Money {
        total_amount(&self.items)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// quantity × unit_price for one line.
///
/// Quantities and prices are validated so that every line and every total
/// fits the ten-digit amount limit; saturation only guards rows that were
/// written around the rules.
#[inline]
pub fn line_amount(quantity: i64, unit_price: Money) -> Money {
    Money::from_cents(unit_price.cents().saturating_mul(quantity))
}

/// Invoice total: Σ quantity × unit_price over `items`.
///
/// Exact in cents and independent of item order.
///
/// ```rust
/// use invoicer_core::types::total_amount;
/// use invoicer_core::{InvoiceItem, Money};
///
/// let line = |qty, cents| InvoiceItem {
///     id: String::new(),
///     invoice_id: String::new(),
///     position: 0,
///     description: String::new(),
///     quantity: qty,
///     unit_price: Money::from_cents(cents),
/// };
/// let items = vec![line(1, 10000), line(2, 2550)];
/// assert_eq!(total_amount(&items).to_string(), "151.00");
/// ```
pub fn total_amount(items: &[InvoiceItem]) -> Money {
    items.iter().map(InvoiceItem::amount).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
