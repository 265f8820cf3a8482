//! # Invoice Repository
//!
//! Database operations for invoices and their items.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── create() → INSERT invoices                                     │
//! │                  → INSERT invoice_items × N (position 0..N)            │
//! │                  → COMMIT   (any failure: ROLLBACK, zero rows)         │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── get_by_id() / list() → header + items ORDER BY position        │
//! │                                                                         │
//! │  3. UPDATE STATUS                                                      │
//! │     └── update_status() → the only UPDATE this table ever sees         │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── delete() → DELETE invoices; items go by ON DELETE CASCADE      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use invoicer_core::{Invoice, InvoiceItem, InvoiceStatus, NewInvoice};

/// Invoice header as stored; items live in their own table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    customer_id: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl InvoiceRow {
    /// Joins the header with its items, which must not be empty.
    fn into_invoice(self, items: Vec<InvoiceItem>) -> DbResult<Invoice> {
        if items.is_empty() {
            return Err(DbError::Corrupt(format!("invoice {} has no items", self.id)));
        }

        Ok(Invoice {
            id: self.id,
            customer_id: self.customer_id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            status: InvoiceStatus::from(self.status),
            items,
            created_at: self.created_at,
        })
    }
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Persists a validated invoice together with its items.
    ///
    /// ## Atomicity
    /// The header and every item are written in one transaction. If any
    /// statement fails the transaction is dropped uncommitted and rolls back,
    /// leaving no invoice and no items behind.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - the customer does not exist
    pub async fn create(&self, new: &NewInvoice) -> DbResult<Invoice> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, customer_id = %new.customer_id, items = new.items.len(), "Creating invoice");

        let items: Vec<InvoiceItem> = new
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: id.clone(),
                position: position as i64,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, customer_id, issue_date, due_date, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&new.customer_id)
        .bind(new.issue_date)
        .bind(new.due_date)
        .bind(new.status.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, position, description, quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(item.position)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %id, items = items.len(), "Invoice created");

        Ok(Invoice {
            id,
            customer_id: new.customer_id.clone(),
            issue_date: new.issue_date,
            due_date: new.due_date,
            status: new.status.clone(),
            items,
            created_at: now,
        })
    }

    /// Gets an invoice with its items in line order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, customer_id, issue_date, due_date, status, created_at
            FROM invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let items = self.get_items(id).await?;
        row.into_invoice(items).map(Some)
    }

    /// Gets the items of one invoice, ordered by position.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, position, description, quantity, unit_price_cents
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists all invoices in the order they were created, each with its items.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, customer_id, issue_date, due_date, status, created_at
            FROM invoices
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let all_items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, position, description, quantity, unit_price_cents
            FROM invoice_items
            ORDER BY invoice_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_invoice: HashMap<String, Vec<InvoiceItem>> = HashMap::new();
        for item in all_items {
            by_invoice
                .entry(item.invoice_id.clone())
                .or_default()
                .push(item);
        }

        let invoices = rows
            .into_iter()
            .map(|row| {
                let items = by_invoice.remove(&row.id).unwrap_or_default();
                row.into_invoice(items)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = invoices.len(), "Listed invoices");
        Ok(invoices)
    }

    /// Writes a new status. Nothing else on the invoice is touched.
    pub async fn update_status(&self, id: &str, status: &InvoiceStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating invoice status");

        let result = sqlx::query("UPDATE invoices SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Deletes an invoice and all of its items.
    ///
    /// Items are removed by the schema's `ON DELETE CASCADE`, the same as
    /// for any other statement that deletes an invoice row.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        info!(id = %id, "Invoice deleted");
        Ok(())
    }

    /// Whether an invoice with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Number of invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Number of item rows across all invoices.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use invoicer_core::{Money, NewCustomer, NewInvoiceItem};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Acme".to_string(),
                email: "billing@acme.test".to_string(),
                address: None,
            })
            .await
            .unwrap();
        (db, customer.id)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn new_invoice(customer_id: &str, items: &[(&str, i64, i64)]) -> NewInvoice {
        NewInvoice {
            customer_id: customer_id.to_string(),
            issue_date: today(),
            due_date: today(),
            status: InvoiceStatus::Pending,
            items: items
                .iter()
                .map(|(description, quantity, cents)| NewInvoiceItem {
                    description: description.to_string(),
                    quantity: *quantity,
                    unit_price: Money::from_cents(*cents),
                })
                .collect(),
        }
    }

    async fn item_rows(db: &Database) -> i64 {
        db.invoices().count_items().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();

        let created = repo
            .create(&new_invoice(
                &customer_id,
                &[("Product A", 1, 10000), ("Product B", 2, 2550)],
            ))
            .await
            .unwrap();
        assert_eq!(created.total_amount().to_string(), "151.00");

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.items, created.items);
        assert_eq!(fetched.issue_date, today());
        assert_eq!(fetched.status, InvoiceStatus::Pending);
        assert_eq!(fetched.total_amount(), created.total_amount());
        assert_eq!(fetched.items[0].description, "Product A");
        assert_eq!(fetched.items[1].position, 1);
    }

    #[tokio::test]
    async fn test_unknown_customer_writes_nothing() {
        let (db, _) = setup().await;
        let repo = db.invoices();

        let err = repo
            .create(&new_invoice("ghost", &[("A", 1, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(item_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_failing_item_rolls_back_invoice() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();

        // Second item violates CHECK (quantity > 0).
        let err = repo
            .create(&new_invoice(&customer_id, &[("ok", 1, 100), ("bad", 0, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(item_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_update_status_only() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();
        let created = repo
            .create(&new_invoice(&customer_id, &[("A", 3, 999)]))
            .await
            .unwrap();

        repo.update_status(&created.id, &InvoiceStatus::Paid)
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, InvoiceStatus::Paid);
        assert_eq!(fetched.items, created.items);
        assert_eq!(fetched.due_date, created.due_date);
    }

    #[tokio::test]
    async fn test_update_status_unknown_invoice() {
        let (db, _) = setup().await;
        let err = db
            .invoices()
            .update_status("missing", &InvoiceStatus::Paid)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_status_roundtrips() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();
        let mut new = new_invoice(&customer_id, &[("A", 1, 100)]);
        new.status = InvoiceStatus::from("disputed");

        let created = repo.create(&new).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, InvoiceStatus::Other("disputed".to_string()));
    }

    #[tokio::test]
    async fn test_delete_removes_items() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();
        let keep = repo
            .create(&new_invoice(&customer_id, &[("keep", 1, 100)]))
            .await
            .unwrap();
        let gone = repo
            .create(&new_invoice(&customer_id, &[("a", 1, 100), ("b", 2, 200)]))
            .await
            .unwrap();

        repo.delete(&gone.id).await.unwrap();

        assert!(!repo.exists(&gone.id).await.unwrap());
        assert!(repo.exists(&keep.id).await.unwrap());
        assert_eq!(item_rows(&db).await, 1);
        assert!(repo.delete(&gone.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_raw_invoice_delete_cascades_to_items() {
        let (db, customer_id) = setup().await;
        let created = db
            .invoices()
            .create(&new_invoice(&customer_id, &[("a", 1, 100), ("b", 2, 200)]))
            .await
            .unwrap();
        assert_eq!(item_rows(&db).await, 2);

        sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(&created.id)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(item_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let (db, customer_id) = setup().await;
        let repo = db.invoices();
        let first = repo
            .create(&new_invoice(&customer_id, &[("x", 1, 100)]))
            .await
            .unwrap();
        let second = repo
            .create(&new_invoice(&customer_id, &[("y", 1, 200), ("z", 1, 300)]))
            .await
            .unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[1].items.len(), 2);
        assert_eq!(listed[1].total_amount(), Money::from_cents(500));
    }

    #[tokio::test]
    async fn test_missing_invoice_is_none() {
        let (db, _) = setup().await;
        assert!(db.invoices().get_by_id("missing").await.unwrap().is_none());
    }
}
