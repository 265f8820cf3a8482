//! # API Errors
//!
//! Every command returns `Result<T, ApiError>`. The error is what a
//! transport serializes:
//!
//! ```text
//! serde_json::Error (payload shape) ─┐
//! FieldErrors / CoreError (rules) ───┼──► ApiError { code, message, fields? }
//! DbError (storage) ─────────────────┘
//!
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Validation failed: items: at least one invoice item is required",
//!   "fields": { "items": ["at least one invoice item is required"] }
//! }
//! ```
//!
//! Storage details go to the log at `error` level and never into `message`.

use serde::Serialize;
use tracing::error;

use invoicer_core::{CoreError, FieldErrors, ValidationError};
use invoicer_db::DbError;

/// Error returned by every command.
///
/// `fields` is only present for validation failures and maps each field
/// path (`items[1].unit_price`) to its messages.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Serialized as `NOT_FOUND`, `VALIDATION_ERROR`, ...
///
/// An HTTP transport would map these to 404, 400, 500 and 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Validation error carrying every field failure.
    pub fn validation(fields: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: fields.to_string(),
            fields: Some(fields),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Messages recorded for one field path, if this is a validation error.
    pub fn field_messages(&self, path: &str) -> Vec<String> {
        self.fields
            .as_ref()
            .map(|fields| fields.get(path).iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

/// A duplicate email that slipped past the pre-check still reaches the
/// caller as a field error on `email`.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(FieldErrors::from(ValidationError::Duplicate { field, value }))
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                error!("Check constraint violated: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid value")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Corrupt(e) => {
                error!("Corrupt data: {}", e);
                ApiError::internal("Stored data is inconsistent")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvoiceNotFound(id) => ApiError::not_found("Invoice", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::Validation(fields) => ApiError::validation(fields),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        ApiError::validation(fields)
    }
}

/// A payload that does not have the expected shape, e.g. a price with three
/// decimals or a date that is not `YYYY-MM-DD`.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::new(
            ErrorCode::ValidationError,
            format!("Invalid payload: {}", err),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
