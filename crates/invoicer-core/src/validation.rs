//! # Validation Module
//!
//! Field-level validators for customers, invoices and invoice items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (serde)                                            │
//! │  ├── Payload shape (deserialization)                                   │
//! │  └── Typed fields kept raw when malformed (RawField)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Rules (invoicer-core)                                        │
//! │  ├── THIS MODULE: one check per field                                  │
//! │  └── rules.rs: runs every check, collects FieldErrors                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE email (NOCASE)                                             │
//! │  ├── CHECK quantity > 0, unit_price_cents > 0                          │
//! │  └── Foreign keys, ON DELETE CASCADE                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each validator checks exactly one field and returns the first failure
//! for that field. Aggregating across fields is the caller's job.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, MAX_AMOUNT_CENTS};
use crate::{MAX_DESCRIPTION_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_STATUS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 255 characters
///
/// ```rust
/// use invoicer_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Acme Ltd").is_ok());
/// assert!(validate_customer_name("   ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - At most 254 characters
/// - No whitespace, exactly one `@`
/// - Non-empty local part
/// - Domain made of non-empty dot-separated labels, at least two of them,
///   no label starting or ending with `-`
///
/// ```rust
/// use invoicer_core::validation::validate_email;
///
/// assert!(validate_email("billing@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("must contain '@'")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have exactly one '@' with a name before it"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let labels_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        });

    if !labels_ok {
        return Err(invalid("must have a valid domain"));
    }

    Ok(())
}

/// Validates an item description.
///
/// An empty description is allowed; only the length is bounded.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates an invoice status.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 20 characters
///
/// The set of statuses is open: anything passing these checks is accepted.
pub fn validate_status(status: &str) -> ValidationResult<()> {
    let status = status.trim();

    if status.is_empty() {
        return Err(ValidationError::Required {
            field: "status".to_string(),
        });
    }

    if status.chars().count() > MAX_STATUS_LEN {
        return Err(ValidationError::TooLong {
            field: "status".to_string(),
            max: MAX_STATUS_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be strictly positive (> 0)
///
/// ```rust
/// use invoicer_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-1).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an item unit price.
///
/// ## Rules
/// - Must be strictly positive (> 0.00)
/// - Must not exceed 99,999,999.99
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }

    validate_amount_limit("unit_price", price)
}

/// Validates that an amount fits the ten-digit amount limit.
pub fn validate_amount_limit(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.within_limit() {
        return Err(ValidationError::ExceedsLimit {
            field: field.to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS),
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates that a due date is not before the issue date.
///
/// Due today is valid.
///
/// ```rust
/// use chrono::NaiveDate;
/// use invoicer_core::validation::validate_due_date;
///
/// let issue = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// assert!(validate_due_date(issue, issue).is_ok());
/// assert!(validate_due_date(issue.pred_opt().unwrap(), issue).is_err());
/// ```
pub fn validate_due_date(due_date: NaiveDate, issue_date: NaiveDate) -> ValidationResult<()> {
    if due_date < issue_date {
        return Err(ValidationError::DateBefore {
            field: "due_date".to_string(),
            bound: "issue date".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Test Customer").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("  ").is_err());
        assert!(validate_customer_name(&"A".repeat(255)).is_ok());
        assert!(matches!(
            validate_customer_name(&"A".repeat(256)),
            Err(ValidationError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_validate_email_accepts() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.uk").is_ok());
        assert!(validate_email("  padded@example.com  ").is_ok());
        assert!(validate_email("a@b-c.io").is_ok());
    }

    #[test]
    fn test_validate_email_rejects() {
        assert!(matches!(
            validate_email(""),
            Err(ValidationError::Required { .. })
        ));
        for bad in [
            "invalid-email",
            "@example.com",
            "user@",
            "user@localhost",
            "user@@example.com",
            "user@exa mple.com",
            "user@example..com",
            "user@.example.com",
            "user@-example.com",
            "a@b@example.com",
        ] {
            assert!(
                matches!(validate_email(bad), Err(ValidationError::InvalidFormat { .. })),
                "{bad} should be rejected"
            );
        }

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            validate_email(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("").is_ok());
        assert!(validate_description("Service A").is_ok());
        assert!(validate_description(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_status() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("on_hold").is_ok());
        assert!(validate_status("").is_err());
        assert!(validate_status(&"s".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1_000_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::from_cents(1)).is_ok());
        assert!(validate_unit_price(Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(matches!(
            validate_unit_price(Money::zero()),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_unit_price(Money::from_cents(-500)),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_unit_price(Money::from_cents(MAX_AMOUNT_CENTS + 1)),
            Err(ValidationError::ExceedsLimit { .. })
        ));
    }

    #[test]
    fn test_validate_due_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let yesterday = today.pred_opt().unwrap();

        assert!(validate_due_date(tomorrow, today).is_ok());
        assert!(validate_due_date(today, today).is_ok());
        assert_eq!(
            validate_due_date(yesterday, today).unwrap_err().to_string(),
            "due_date cannot be before issue date"
        );
    }
}
