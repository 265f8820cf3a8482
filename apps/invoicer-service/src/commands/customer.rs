//! # Customer Commands
//!
//! Create, fetch and list customers.
//!
//! Customers have no update or delete path.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use invoicer_core::rules::validate_new_customer;
use invoicer_core::{CoreError, Customer, CustomerDraft};
use invoicer_db::Database;

/// Customer DTO returned to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        CustomerDto {
            id: c.id,
            name: c.name,
            email: c.email,
            address: c.address,
        }
    }
}

/// Creates a customer.
///
/// ## Errors
/// * `VALIDATION_ERROR` - name/email invalid, or email already used by
///   another customer (any letter case). No row is written.
pub async fn create_customer(db: &Database, draft: CustomerDraft) -> Result<CustomerDto, ApiError> {
    debug!(email = %draft.email, "create_customer command");

    let email = draft.email.trim();
    let email_taken = !email.is_empty() && db.customers().email_exists(email).await?;

    let new_customer = validate_new_customer(&draft, email_taken)?;

    // The unique index still guards a concurrent insert of the same email.
    let customer = db.customers().insert(&new_customer).await?;

    info!(id = %customer.id, "Customer created");
    Ok(CustomerDto::from(customer))
}

/// Gets a single customer by id.
pub async fn get_customer(db: &Database, id: &str) -> Result<CustomerDto, ApiError> {
    debug!(id = %id, "get_customer command");

    let customer = db
        .customers()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;

    Ok(CustomerDto::from(customer))
}

/// Lists all customers in creation order.
pub async fn list_customers(db: &Database) -> Result<Vec<CustomerDto>, ApiError> {
    let customers = db.customers().list().await?;
    Ok(customers.into_iter().map(CustomerDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::database;
    use crate::error::ErrorCode;

    fn draft(name: &str, email: &str) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            email: email.to_string(),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_customer() {
        let db = database().await;
        let created = create_customer(
            &db,
            CustomerDraft {
                address: Some("221B Baker St".to_string()),
                ..draft("Sherlock Ltd", "accounts@sherlock.test")
            },
        )
        .await
        .unwrap();

        let fetched = get_customer(&db, &created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.address.as_deref(), Some("221B Baker St"));
    }

    #[tokio::test]
    async fn test_duplicate_email_any_case() {
        let db = database().await;
        create_customer(&db, draft("Acme", "billing@acme.test"))
            .await
            .unwrap();

        let err = create_customer(&db, draft("Acme 2", "BILLING@ACME.TEST"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field_messages("email").len(), 1);
        assert_eq!(list_customers(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_customer_writes_nothing() {
        let db = database().await;
        let err = create_customer(&db, draft("", "nope")).await.unwrap_err();

        let fields = err.fields.as_ref().unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("email"));
        assert!(list_customers(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let db = database().await;
        let err = get_customer(&db, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let db = database().await;
        for (name, email) in [("B", "b@x.io"), ("A", "a@x.io")] {
            create_customer(&db, draft(name, email)).await.unwrap();
        }

        let names: Vec<String> = list_customers(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
