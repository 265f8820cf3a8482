//! # Business Rules
//!
//! What makes a new invoice or customer valid, and what an update may change.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Lifecycle                                │
//! │                                                                         │
//! │   InvoiceDraft ──► validate_new_invoice ──► NewInvoice ──► persisted   │
//! │   (raw request)    (ALL checks, collected)   (checked)      Invoice     │
//! │                           │                                   │         │
//! │                           ▼                                   ▼         │
//! │                      FieldErrors                    apply_status_update │
//! │                   (nothing is written)              (status ONLY)       │
//! │                                                                         │
//! │   issue_date  ─ set from the request date, never from the caller       │
//! │   due_date    ─ fixed at creation                                       │
//! │   items       ─ fixed at creation                                       │
//! │   status      ─ the one mutable field                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rules never touch storage or the clock. Whatever they need to know
//! about the outside world (today's date, whether the customer exists, whether
//! an email is taken) is passed in by the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, ValidationError};
use crate::money::{Money, MAX_AMOUNT_CENTS};
use crate::types::{Invoice, InvoiceStatus};
use crate::validation::{
    validate_amount_limit, validate_customer_name, validate_description, validate_due_date,
    validate_email, validate_quantity, validate_status, validate_unit_price,
};

// =============================================================================
// Invoice Creation
// =============================================================================

/// A request value that either has the expected type or is kept verbatim.
///
/// Drafts hold typed fields this way so that `"1.005"` as a price or `1.5`
/// as a quantity becomes a field error at its own path, next to every other
/// failure, instead of rejecting the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField<T> {
    Parsed(T),
    Malformed(serde_json::Value),
}

impl<T> RawField<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            RawField::Parsed(value) => Some(value),
            RawField::Malformed(_) => None,
        }
    }
}

impl<T> From<T> for RawField<T> {
    fn from(value: T) -> Self {
        RawField::Parsed(value)
    }
}

/// An invoice as the caller proposed it.
///
/// Every field is optional at this stage so that a missing value becomes a
/// field error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Customer id.
    #[serde(default, alias = "customer_id")]
    pub customer: Option<String>,

    #[serde(default)]
    pub due_date: Option<RawField<NaiveDate>>,

    /// Defaults to `pending` when absent.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub items: Option<Vec<ItemDraft>>,
}

/// One proposed line of an [`InvoiceDraft`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub quantity: Option<RawField<i64>>,

    #[serde(default)]
    pub unit_price: Option<RawField<Money>>,
}

/// What the rules need to know that only storage and the clock can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationContext {
    /// Today's date; becomes the invoice's issue date.
    pub issue_date: NaiveDate,

    /// Whether the draft's customer id resolves.
    pub customer_exists: bool,
}

/// A draft that passed every creation check, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<NewInvoiceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewInvoiceItem {
    pub fn amount(&self) -> Money {
        crate::types::line_amount(self.quantity, self.unit_price)
    }
}

impl NewInvoice {
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(NewInvoiceItem::amount).sum()
    }
}

/// Checks a proposed invoice against every creation rule.
///
/// Every rule runs; the returned [`FieldErrors`] holds all failures, keyed
/// by field path. Item errors carry the item's index in the draft, so a bad
/// quantity on item 0 never hides a bad price on item 1.
///
/// ## Rules
/// 1. `customer` present and existing
/// 2. `due_date` present, a `YYYY-MM-DD` date, and not before `issue_date`
/// 3. `items` present and non-empty
/// 4. each item: `quantity` a whole number > 0, `unit_price` a decimal with
///    at most two places, > 0 and within the amount limit, `description`
///    within length, line amount within the limit
/// 5. `status`, if given, non-empty and at most 20 characters
/// 6. the total within the amount limit
///
/// ```rust
/// use chrono::NaiveDate;
/// use invoicer_core::rules::{validate_new_invoice, CreationContext, InvoiceDraft, ItemDraft, RawField};
/// use invoicer_core::Money;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let draft = InvoiceDraft {
///     customer: Some("cust-1".into()),
///     due_date: Some(today.into()),
///     status: None,
///     items: Some(vec![
///         ItemDraft { description: "Product A".into(), quantity: Some(RawField::Parsed(1)), unit_price: Some(Money::from_cents(10000).into()) },
///         ItemDraft { description: "Product B".into(), quantity: Some(RawField::Parsed(2)), unit_price: Some(Money::from_cents(2550).into()) },
///     ]),
/// };
/// let ctx = CreationContext { issue_date: today, customer_exists: true };
///
/// let invoice = validate_new_invoice(&draft, &ctx).unwrap();
/// assert_eq!(invoice.total_amount().to_string(), "151.00");
/// ```
pub fn validate_new_invoice(
    draft: &InvoiceDraft,
    ctx: &CreationContext,
) -> Result<NewInvoice, FieldErrors> {
    let mut errors = FieldErrors::new();

    // 1. Customer reference
    let customer_id = draft
        .customer
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    match customer_id {
        None => errors.push(ValidationError::Required {
            field: "customer".to_string(),
        }),
        Some(id) if !ctx.customer_exists => errors.push(ValidationError::UnknownReference {
            field: "customer".to_string(),
            id: id.to_string(),
        }),
        Some(_) => {}
    }

    // 2. Due date
    let due_date = match &draft.due_date {
        None => {
            errors.push(ValidationError::Required {
                field: "due_date".to_string(),
            });
            None
        }
        Some(RawField::Malformed(_)) => {
            errors.push(ValidationError::InvalidFormat {
                field: "due_date".to_string(),
                reason: "expected a date as YYYY-MM-DD".to_string(),
            });
            None
        }
        Some(RawField::Parsed(due)) => {
            errors.check("due_date", validate_due_date(*due, ctx.issue_date));
            Some(*due)
        }
    };

    // 3 + 4. Items
    let mut items = Vec::new();
    match draft.items.as_deref() {
        None | Some([]) => errors.push(ValidationError::EmptyCollection {
            field: "items".to_string(),
            entry: "invoice item".to_string(),
        }),
        Some(drafts) => {
            for (index, item) in drafts.iter().enumerate() {
                if let Some(checked) = check_item(index, item, &mut errors) {
                    items.push(checked);
                }
            }
        }
    }

    // 5. Status
    let status = match draft.status.as_deref() {
        None => InvoiceStatus::default(),
        Some(raw) => {
            errors.check("status", validate_status(raw));
            InvoiceStatus::from(raw)
        }
    };

    // 6. Total, only meaningful once every line is valid
    let all_items_valid = draft
        .items
        .as_ref()
        .is_some_and(|drafts| !drafts.is_empty() && drafts.len() == items.len());
    if all_items_valid {
        let total = items
            .iter()
            .try_fold(Money::zero(), |acc, item: &NewInvoiceItem| {
                item.unit_price
                    .checked_mul_quantity(item.quantity)
                    .and_then(|amount| acc.checked_add(amount))
            });
        let fits = total.is_some_and(|total| total.within_limit());
        if !fits {
            errors.push(ValidationError::ExceedsLimit {
                field: "total_amount".to_string(),
                max: Money::from_cents(MAX_AMOUNT_CENTS),
            });
        }
    }

    let new_invoice = NewInvoice {
        customer_id: customer_id.unwrap_or_default().to_string(),
        issue_date: ctx.issue_date,
        due_date: due_date.unwrap_or(ctx.issue_date),
        status,
        items,
    };
    errors.into_result(new_invoice)
}

/// Checks one item, recording failures under `items[index].<field>`.
fn check_item(index: usize, item: &ItemDraft, errors: &mut FieldErrors) -> Option<NewInvoiceItem> {
    let before = errors.len();

    errors.check(
        FieldErrors::item_path(index, "description"),
        validate_description(&item.description),
    );

    let quantity_check = match &item.quantity {
        None => Err(ValidationError::Required {
            field: "quantity".to_string(),
        }),
        Some(RawField::Malformed(_)) => Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "expected a whole number".to_string(),
        }),
        Some(RawField::Parsed(qty)) => validate_quantity(*qty),
    };
    errors.check(FieldErrors::item_path(index, "quantity"), quantity_check);

    let price_check = match &item.unit_price {
        None => Err(ValidationError::Required {
            field: "unit_price".to_string(),
        }),
        Some(RawField::Malformed(raw)) => Err(ValidationError::InvalidFormat {
            field: "unit_price".to_string(),
            reason: malformed_money_reason(raw),
        }),
        Some(RawField::Parsed(price)) => validate_unit_price(*price),
    };
    errors.check(FieldErrors::item_path(index, "unit_price"), price_check);

    if errors.len() != before {
        return None;
    }

    let quantity = *item.quantity.as_ref()?.parsed()?;
    let unit_price = *item.unit_price.as_ref()?.parsed()?;
    let line_check = match unit_price.checked_mul_quantity(quantity) {
        Some(amount) => validate_amount_limit("amount", amount),
        None => Err(ValidationError::ExceedsLimit {
            field: "amount".to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS),
        }),
    };
    if let Err(error) = line_check {
        errors.add(FieldErrors::item_path(index, "amount"), error);
        return None;
    }

    Some(NewInvoiceItem {
        description: item.description.trim().to_string(),
        quantity,
        unit_price,
    })
}

/// Why a raw price did not parse, e.g. `'1.005' has more than 2 decimal places`.
fn malformed_money_reason(raw: &serde_json::Value) -> String {
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return "expected a decimal amount".to_string(),
    };

    match text.parse::<Money>() {
        Err(e) => e.to_string(),
        Ok(_) => "expected a decimal amount".to_string(),
    }
}

// =============================================================================
// Invoice Update
// =============================================================================

/// An update request against an existing invoice.
///
/// Only `status` is ever applied. Anything else the caller sent lands in
/// `ignored` and is dropped; it never causes an error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvoiceUpdate {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(flatten)]
    pub ignored: serde_json::Map<String, serde_json::Value>,
}

impl InvoiceUpdate {
    /// Status-only update.
    pub fn status(status: impl Into<String>) -> Self {
        InvoiceUpdate {
            status: Some(status.into()),
            ignored: serde_json::Map::new(),
        }
    }

    /// Names of the fields that were sent but will not be applied.
    pub fn ignored_fields(&self) -> Vec<&str> {
        self.ignored.keys().map(String::as_str).collect()
    }
}

/// A status transition applied by [`apply_status_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: InvoiceStatus,
    pub to: InvoiceStatus,
}

impl StatusChange {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Applies an update to an invoice: writes `status`, nothing else.
///
/// A payload without `status` is rejected so that a caller who tried to
/// change another field finds out it had no effect. On error the invoice is
/// left untouched.
///
/// ```rust
/// # use chrono::{NaiveDate, Utc};
/// # use invoicer_core::{Invoice, InvoiceStatus};
/// use invoicer_core::rules::{apply_status_update, InvoiceUpdate};
///
/// # let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// # let mut invoice = Invoice {
/// #     id: "inv-1".into(), customer_id: "c-1".into(), issue_date: today, due_date: today,
/// #     status: InvoiceStatus::Pending, items: vec![], created_at: Utc::now(),
/// # };
/// let change = apply_status_update(&mut invoice, &InvoiceUpdate::status("paid")).unwrap();
/// assert_eq!(change.to, InvoiceStatus::Paid);
/// assert_eq!(invoice.status, InvoiceStatus::Paid);
/// ```
pub fn apply_status_update(
    invoice: &mut Invoice,
    update: &InvoiceUpdate,
) -> Result<StatusChange, FieldErrors> {
    let raw = match update.status.as_deref() {
        Some(raw) => raw,
        None => {
            return Err(ValidationError::NotUpdatable {
                field: "status".to_string(),
            }
            .into())
        }
    };

    validate_status(raw)?;

    let to = InvoiceStatus::from(raw);
    let from = std::mem::replace(&mut invoice.status, to.clone());
    Ok(StatusChange { from, to })
}

// =============================================================================
// Customer Creation
// =============================================================================

/// A customer as the caller proposed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDraft {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub address: Option<String>,
}

/// A draft that passed every customer check, trimmed and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

/// Checks a proposed customer.
///
/// `email_taken` is whether another customer already uses the email,
/// compared case-insensitively. Name and email failures are collected
/// together. A blank address becomes `None`.
pub fn validate_new_customer(
    draft: &CustomerDraft,
    email_taken: bool,
) -> Result<NewCustomer, FieldErrors> {
    let mut errors = FieldErrors::new();
    let email = draft.email.trim();

    errors.check("name", validate_customer_name(&draft.name));

    match validate_email(email) {
        Err(error) => errors.add("email", error),
        Ok(()) if email_taken => errors.push(ValidationError::Duplicate {
            field: "email".to_string(),
            value: email.to_string(),
        }),
        Ok(()) => {}
    }

    let address = draft
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    errors.into_result(NewCustomer {
        name: draft.name.trim().to_string(),
        email: email.to_string(),
        address,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
