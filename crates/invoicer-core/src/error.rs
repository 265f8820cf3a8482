//! # Error Types
//!
//! Domain-specific error types for invoicer-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  invoicer-core errors (this file)                                      │
//! │  ├── ValidationError  - One failed check on one field                  │
//! │  ├── FieldErrors      - Every failed check of a request, by path       │
//! │  └── CoreError        - NotFound + Validation, what a command returns  │
//! │                                                                         │
//! │  invoicer-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Service errors (in app)                                               │
//! │  └── ApiError         - What the transport layer serializes            │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → CoreError → ApiError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Collect, Don't Stop
//! Validation never returns on the first failure. Every rule appends to a
//! [`FieldErrors`] keyed by field path (`due_date`, `items`,
//! `items[1].unit_price`), so a caller can fix every problem in one round
//! trip.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invoice id does not resolve.
    ///
    /// Terminal for the request: an update against an unknown id never
    /// reaches body validation.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Customer id does not resolve on a direct lookup.
    ///
    /// A missing customer *referenced by an invoice* is not this variant; it
    /// is a [`ValidationError::UnknownReference`] on the `customer` field.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// One or more fields failed validation.
    #[error(transparent)]
    Validation(#[from] FieldErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed check on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., an email already in use).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The referenced entity does not exist.
    #[error("{field} '{id}' does not exist")]
    UnknownReference { field: String, id: String },

    /// A collection that must have members is empty or absent.
    #[error("at least one {entry} is required")]
    EmptyCollection { field: String, entry: String },

    /// A date precedes the date it is bounded by.
    #[error("{field} cannot be before {bound}")]
    DateBefore { field: String, bound: String },

    /// Amount does not fit the ten-digit amount limit.
    #[error("{field} must not exceed {max}")]
    ExceedsLimit { field: String, max: Money },

    /// An update carried no value for the only mutable field.
    #[error("Only the {field} field can be updated.")]
    NotUpdatable { field: String },
}

/// Broad category of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request points at something that does not exist.
    Referential,
    /// A scalar field fails a constraint.
    Field,
    /// A collection is empty.
    Collection,
}

impl ValidationError {
    /// Name of the field the error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. }
            | ValidationError::UnknownReference { field, .. }
            | ValidationError::EmptyCollection { field, .. }
            | ValidationError::DateBefore { field, .. }
            | ValidationError::ExceedsLimit { field, .. }
            | ValidationError::NotUpdatable { field } => field,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::UnknownReference { .. } => ErrorKind::Referential,
            ValidationError::EmptyCollection { .. } => ErrorKind::Collection,
            _ => ErrorKind::Field,
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Every validation failure of one request, keyed by field path.
///
/// Paths keep the order in which the checks ran. Item paths use the
/// item's position in the request: `items[0].quantity`.
///
/// ## Serialization
/// ```json
/// {
///   "due_date": ["due_date cannot be before issue date"],
///   "items[1].unit_price": ["unit_price must be positive"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<ValidationError>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    /// Builds the path of a field inside the item at `index`.
    ///
    /// ```rust
    /// use invoicer_core::error::FieldErrors;
    ///
    /// assert_eq!(FieldErrors::item_path(1, "unit_price"), "items[1].unit_price");
    /// ```
    pub fn item_path(index: usize, field: &str) -> String {
        format!("items[{}].{}", index, field)
    }

    /// Records an error under `path`.
    pub fn add(&mut self, path: impl Into<String>, error: ValidationError) {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, errors)) => errors.push(error),
            None => self.entries.push((path, vec![error])),
        }
    }

    /// Records an error under its own field name.
    pub fn push(&mut self, error: ValidationError) {
        let path = error.field().to_string();
        self.add(path, error);
    }

    /// Records the error of a `Result`, if any.
    pub fn check(&mut self, path: impl Into<String>, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.add(path, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct paths with errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == path)
    }

    /// Errors recorded under `path` (empty when none).
    pub fn get(&self, path: &str) -> &[ValidationError] {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, errors)| errors.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.entries
            .iter()
            .map(|(p, errors)| (p.as_str(), errors.as_slice()))
    }

    /// `Ok(value)` when nothing was recorded, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(error);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, (path, errors)) in self.entries.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            write!(f, "{}{}: {}", sep, path, messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, errors) in &self.entries {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            map.serialize_entry(path, &messages)?;
        }
        map.end()
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "due_date".to_string(),
        };
        assert_eq!(err.to_string(), "due_date is required");

        let err = ValidationError::NotUpdatable {
            field: "status".to_string(),
        };
        assert_eq!(err.to_string(), "Only the status field can be updated.");

        let err = ValidationError::ExceedsLimit {
            field: "unit_price".to_string(),
            max: Money::from_cents(crate::money::MAX_AMOUNT_CENTS),
        };
        assert_eq!(err.to_string(), "unit_price must not exceed 99999999.99");
    }

    #[test]
    fn test_error_kinds() {
        let referential = ValidationError::UnknownReference {
            field: "customer".to_string(),
            id: "c-1".to_string(),
        };
        assert_eq!(referential.kind(), ErrorKind::Referential);

        let collection = ValidationError::EmptyCollection {
            field: "items".to_string(),
            entry: "invoice item".to_string(),
        };
        assert_eq!(collection.kind(), ErrorKind::Collection);

        let field = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(field.kind(), ErrorKind::Field);
    }

    #[test]
    fn test_field_errors_group_by_path_in_order() {
        let mut errors = FieldErrors::new();
        errors.add(
            "due_date",
            ValidationError::Required {
                field: "due_date".to_string(),
            },
        );
        errors.add(
            FieldErrors::item_path(0, "quantity"),
            ValidationError::MustBePositive {
                field: "quantity".to_string(),
            },
        );
        errors.add(
            "due_date",
            ValidationError::DateBefore {
                field: "due_date".to_string(),
                bound: "issue date".to_string(),
            },
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("due_date").len(), 2);
        assert!(errors.contains("items[0].quantity"));
        assert!(errors.get("items[1].quantity").is_empty());

        let paths: Vec<&str> = errors.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["due_date", "items[0].quantity"]);
    }

    #[test]
    fn test_field_errors_serialize_as_message_map() {
        let mut errors = FieldErrors::new();
        errors.push(ValidationError::EmptyCollection {
            field: "items".to_string(),
            entry: "invoice item".to_string(),
        });

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "items": ["at least one invoice item is required"] })
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FieldErrors::new().into_result(7).unwrap(), 7);

        let errors: FieldErrors = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors: FieldErrors = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation failed: email: email is required");
    }
}
