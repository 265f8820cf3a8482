//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Email Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Two Checks, One Rule                                  │
//! │                                                                         │
//! │  create_customer("Billing@Acme.io")                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  email_exists()  ── COLLATE NOCASE lookup, feeds the validation rules  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT          ── idx_customers_email (UNIQUE, NOCASE) catches the   │
//! │                     race where two requests pass the lookup together   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Both paths end in a duplicate error on `email` and no new row         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use invoicer_core::{Customer, NewCustomer};

/// Repository for customer database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.customers();
///
/// let customer = repo.insert(&new_customer).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a validated customer and returns it with its generated id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - email already used, compared case-insensitively
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        let created = Customer {
            id: Uuid::new_v4().to_string(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            address: customer.address.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %created.id, email = %created.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.email)
        .bind(&created.address)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &created.email),
            other => other,
        })?;

        Ok(created)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, address, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by email, ignoring case.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, address, created_at
            FROM customers
            WHERE email = ?1 COLLATE NOCASE
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Whether a customer with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Whether any customer already uses this email, ignoring case.
    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Lists all customers in the order they were created.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, address, created_at
            FROM customers
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Number of customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================
