//! # Invoice Commands
//!
//! Create invoices, change their status, fetch and list them.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_invoice                                       │
//! │                                                                         │
//! │  InvoiceDraft { customer, due_date, status?, items[] }                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  issue_date = today (UTC)          customer_exists = lookup             │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  validate_new_invoice ── any failure ──► VALIDATION_ERROR, no rows      │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  invoices().create() ── one transaction: header + every item            │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  InvoiceDto { ..., items[ amount ], total_amount }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update Flow
//! Only `status` is ever written. Other fields in the payload are logged and
//! dropped; a payload without `status` is a validation error.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use invoicer_core::rules::{apply_status_update, validate_new_invoice};
use invoicer_core::{
    CoreError, CreationContext, Invoice, InvoiceDraft, InvoiceItem, InvoiceUpdate, Money,
};
use invoicer_db::Database;

// =============================================================================
// DTOs
// =============================================================================

/// Invoice DTO returned to the transport.
///
/// `total_amount` and each item's `amount` are computed from the items
/// every time a DTO is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDto {
    pub id: String,
    /// Customer id.
    pub customer: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub items: Vec<InvoiceItemDto>,
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItemDto {
    pub id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

impl From<InvoiceItem> for InvoiceItemDto {
    fn from(item: InvoiceItem) -> Self {
        InvoiceItemDto {
            amount: item.amount(),
            id: item.id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<Invoice> for InvoiceDto {
    fn from(invoice: Invoice) -> Self {
        let total_amount = invoice.total_amount();
        InvoiceDto {
            id: invoice.id,
            customer: invoice.customer_id,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            status: invoice.status.to_string(),
            items: invoice.items.into_iter().map(InvoiceItemDto::from).collect(),
            total_amount,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Creates an invoice issued today, by the server's local calendar.
///
/// ## Errors
/// * `VALIDATION_ERROR` - every failed rule, keyed by field path
///   (`customer`, `due_date`, `items`, `items[1].unit_price`, ...)
pub async fn create_invoice(db: &Database, draft: InvoiceDraft) -> Result<InvoiceDto, ApiError> {
    create_invoice_on(db, draft, Local::now().date_naive()).await
}

/// Creates an invoice with an explicit issue date.
///
/// [`create_invoice`] passes today's date; this entry point exists for
/// callers that need a fixed clock.
pub async fn create_invoice_on(
    db: &Database,
    draft: InvoiceDraft,
    issue_date: NaiveDate,
) -> Result<InvoiceDto, ApiError> {
    debug!(
        customer = ?draft.customer,
        items = draft.items.as_ref().map_or(0, Vec::len),
        "create_invoice command"
    );

    let customer_exists = match draft.customer.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => db.customers().exists(id).await?,
        _ => false,
    };

    let ctx = CreationContext {
        issue_date,
        customer_exists,
    };
    let new_invoice = validate_new_invoice(&draft, &ctx)?;

    let invoice = db.invoices().create(&new_invoice).await?;

    info!(
        id = %invoice.id,
        customer_id = %invoice.customer_id,
        total = %invoice.total_amount(),
        "Invoice created"
    );
    Ok(InvoiceDto::from(invoice))
}

/// Applies an update to an invoice. Only `status` is written.
///
/// ## Errors
/// * `NOT_FOUND` - unknown id; the payload is not looked at
/// * `VALIDATION_ERROR` - no `status`, or an empty/too long one
pub async fn update_invoice(
    db: &Database,
    id: &str,
    update: InvoiceUpdate,
) -> Result<InvoiceDto, ApiError> {
    debug!(id = %id, "update_invoice command");

    let mut invoice = db
        .invoices()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::InvoiceNotFound(id.to_string()))?;

    let ignored = update.ignored_fields();
    if !ignored.is_empty() {
        debug!(id = %id, ?ignored, "Ignoring fields that cannot be updated");
    }

    let change = apply_status_update(&mut invoice, &update)?;

    if !change.is_noop() {
        db.invoices().update_status(id, &change.to).await?;
        info!(id = %id, from = %change.from, to = %change.to, "Invoice status changed");
    }

    Ok(InvoiceDto::from(invoice))
}

/// Gets a single invoice by id.
pub async fn get_invoice(db: &Database, id: &str) -> Result<InvoiceDto, ApiError> {
    debug!(id = %id, "get_invoice command");

    let invoice = db
        .invoices()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::InvoiceNotFound(id.to_string()))?;

    Ok(InvoiceDto::from(invoice))
}

/// Lists all invoices in creation order.
pub async fn list_invoices(db: &Database) -> Result<Vec<InvoiceDto>, ApiError> {
    let invoices = db.invoices().list().await?;
    Ok(invoices.into_iter().map(InvoiceDto::from).collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::customer::create_customer;
    use crate::commands::parse_payload;
    use crate::commands::test_support::database;
    use crate::error::ErrorCode;
    use invoicer_core::CustomerDraft;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    async fn customer(db: &Database) -> String {
        create_customer(
            db,
            CustomerDraft {
                name: "Acme".to_string(),
                email: "billing@acme.test".to_string(),
                address: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn draft(payload: serde_json::Value) -> InvoiceDraft {
        parse_payload(payload).unwrap()
    }

    async fn item_rows(db: &Database) -> i64 {
        db.invoices().count_items().await.unwrap()
    }

    async fn invoice_rows(db: &Database) -> i64 {
        db.invoices().count().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_invoice_total() {
        let db = database().await;
        let customer_id = customer(&db).await;

        let dto = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "2026-11-17",
                "status": "pending",
                "items": [
                    { "description": "Product A", "quantity": 1, "unit_price": "100.00" },
                    { "description": "Product B", "quantity": 2, "unit_price": 25.50 }
                ]
            })),
            today(),
        )
        .await
        .unwrap();

        assert_eq!(dto.issue_date, today());
        assert_eq!(dto.status, "pending");
        assert_eq!(dto.items.len(), 2);
        assert_eq!(dto.items[1].amount.to_string(), "51.00");
        assert_eq!(dto.total_amount.to_string(), "151.00");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["total_amount"], "151.00");
        assert_eq!(json["issue_date"], "2026-10-18");

        let fetched = get_invoice(&db, &dto.id).await.unwrap();
        assert_eq!(fetched, dto);
    }

    #[tokio::test]
    async fn test_create_uses_today_as_issue_date() {
        let db = database().await;
        let customer_id = customer(&db).await;
        let today = Local::now().date_naive();

        let dto = create_invoice(
            &db,
            draft(json!({
                "customer_id": customer_id,
                "due_date": today.succ_opt().unwrap(),
                "items": [{ "description": "Hosting", "quantity": 1, "unit_price": "9.99" }]
            })),
        )
        .await
        .unwrap();

        assert!(dto.issue_date >= today);
        assert_eq!(dto.status, "pending");
    }

    #[tokio::test]
    async fn test_due_today_succeeds_and_yesterday_fails() {
        let db = database().await;
        let customer_id = customer(&db).await;
        let payload = |due: NaiveDate| {
            draft(json!({
                "customer": customer_id,
                "due_date": due,
                "items": [{ "description": "A", "quantity": 1, "unit_price": "1.00" }]
            }))
        };

        assert!(create_invoice_on(&db, payload(today()), today()).await.is_ok());

        let err = create_invoice_on(&db, payload(today().pred_opt().unwrap()), today())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(
            err.field_messages("due_date"),
            vec!["due_date cannot be before issue date"]
        );
        assert_eq!(invoice_rows(&db).await, 1);
    }

    #[tokio::test]
    async fn test_empty_items_creates_nothing() {
        let db = database().await;
        let customer_id = customer(&db).await;

        let err = create_invoice_on(
            &db,
            draft(json!({ "customer": customer_id, "due_date": "2026-10-20", "items": [] })),
            today(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.field_messages("items").len(), 1);
        assert_eq!(invoice_rows(&db).await, 0);
        assert_eq!(item_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_bad_items_reported_by_index() {
        let db = database().await;
        let customer_id = customer(&db).await;

        let err = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "2026-10-20",
                "items": [
                    { "description": "zero qty", "quantity": 0, "unit_price": "5.00" },
                    { "description": "zero price", "quantity": 1, "unit_price": "0" },
                    { "description": "fine", "quantity": 1, "unit_price": "5.00" }
                ]
            })),
            today(),
        )
        .await
        .unwrap_err();

        let fields = err.fields.as_ref().unwrap();
        assert!(fields.contains("items[0].quantity"));
        assert!(fields.contains("items[1].unit_price"));
        assert!(!fields.contains("items[2].quantity"));
        assert_eq!(invoice_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_field_error() {
        let db = database().await;

        let err = create_invoice_on(
            &db,
            draft(json!({
                "customer": "ghost",
                "due_date": "2026-10-20",
                "items": [{ "description": "A", "quantity": 1, "unit_price": "1.00" }]
            })),
            today(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field_messages("customer"), vec!["customer 'ghost' does not exist"]);
    }

    #[tokio::test]
    async fn test_malformed_item_values_reported_with_other_errors() {
        let db = database().await;
        let customer_id = customer(&db).await;

        let err = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "2026-10-20",
                "items": [
                    { "description": "zero qty", "quantity": 0, "unit_price": "5.00" },
                    { "description": "sub-cent", "quantity": 1, "unit_price": "1.005" },
                    { "description": "half", "quantity": 1.5, "unit_price": "2.00" }
                ]
            })),
            today(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        let fields = err.fields.as_ref().unwrap();
        assert!(fields.contains("items[0].quantity"));
        assert!(fields.contains("items[2].quantity"));
        assert_eq!(
            err.field_messages("items[1].unit_price"),
            vec!["unit_price has invalid format: '1.005' has more than 2 decimal places"]
        );
        assert_eq!(invoice_rows(&db).await, 0);
        assert_eq!(item_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_malformed_due_date_is_field_error() {
        let db = database().await;
        let customer_id = customer(&db).await;

        let err = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "next week",
                "items": [{ "description": "A", "quantity": 1, "unit_price": "1.00" }]
            })),
            today(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.field_messages("due_date"),
            vec!["due_date has invalid format: expected a date as YYYY-MM-DD"]
        );
    }

    #[tokio::test]
    async fn test_update_status_ignores_other_fields() {
        let db = database().await;
        let customer_id = customer(&db).await;
        let created = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "2026-10-25",
                "items": [{ "description": "Original", "quantity": 2, "unit_price": "12.50" }]
            })),
            today(),
        )
        .await
        .unwrap();

        let update: InvoiceUpdate = parse_payload(json!({
            "status": "paid",
            "due_date": "2030-01-01",
            "customer": "someone-else",
            "items": [{ "description": "New", "quantity": 1, "unit_price": "99.00" }]
        }))
        .unwrap();
        let updated = update_invoice(&db, &created.id, update).await.unwrap();

        assert_eq!(updated.status, "paid");
        assert_eq!(updated.items, created.items);
        assert_eq!(updated.customer, created.customer);
        assert_eq!(updated.due_date, created.due_date);
        assert_eq!(updated.issue_date, created.issue_date);
        assert_eq!(updated.total_amount, created.total_amount);

        let fetched = get_invoice(&db, &created.id).await.unwrap();
        assert_eq!(fetched.status, "paid");
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].description, "Original");
        assert_eq!(item_rows(&db).await, 1);
    }

    #[tokio::test]
    async fn test_update_without_status_is_rejected() {
        let db = database().await;
        let customer_id = customer(&db).await;
        let created = create_invoice_on(
            &db,
            draft(json!({
                "customer": customer_id,
                "due_date": "2026-10-25",
                "items": [{ "description": "A", "quantity": 1, "unit_price": "1.00" }]
            })),
            today(),
        )
        .await
        .unwrap();

        let update: InvoiceUpdate = parse_payload(json!({ "due_date": "2030-01-01" })).unwrap();
        let err = update_invoice(&db, &created.id, update).await.unwrap_err();

        assert_eq!(
            err.field_messages("status"),
            vec!["Only the status field can be updated."]
        );
        assert_eq!(get_invoice(&db, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_unknown_invoice_is_not_found() {
        let db = database().await;

        let err = get_invoice(&db, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        // Not found wins over an invalid body.
        let err = update_invoice(&db, "missing", InvoiceUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_invoices() {
        let db = database().await;
        let customer_id = customer(&db).await;
        for price in ["1.00", "2.00"] {
            create_invoice_on(
                &db,
                draft(json!({
                    "customer": customer_id,
                    "due_date": "2026-10-25",
                    "items": [{ "description": "A", "quantity": 3, "unit_price": price }]
                })),
                today(),
            )
            .await
            .unwrap();
        }

        let totals: Vec<String> = list_invoices(&db)
            .await
            .unwrap()
            .iter()
            .map(|i| i.total_amount.to_string())
            .collect();
        assert_eq!(totals, vec!["3.00", "6.00"]);
    }
}
