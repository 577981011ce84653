//! # Validation Module
//!
//! Input validation utilities for the PDV engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Terminal surface                                          │
//! │  └── Immediate operator feedback                                    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation, before any I/O    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database                                                  │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  ├── UNIQUE constraints (idempotency key, single open session)      │
//! │  └── Foreign key constraints                                        │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a cash movement or sale amount.
///
/// ## Rules
/// - Must be strictly positive; the movement kind carries the direction.
pub fn validate_movement_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates an opening balance (register float).
///
/// Zero is allowed: a drawer can legitimately start empty.
pub fn validate_opening_balance(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening balance".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a movement reason.
///
/// ## Rules
/// - Must not be blank (every sangria/suprimento is auditable)
/// - Maximum 200 characters
///
/// ## Returns
/// The trimmed reason.
pub fn validate_movement_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 200,
        });
    }

    Ok(reason.to_string())
}

/// Validates an attendant name.
pub fn validate_attendant(attendant: &str) -> ValidationResult<String> {
    let attendant = attendant.trim();

    if attendant.is_empty() {
        return Err(ValidationError::Required {
            field: "attendant".to_string(),
        });
    }

    if attendant.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "attendant".to_string(),
            max: 100,
        });
    }

    Ok(attendant.to_string())
}

/// Validates a store identifier (UUID string).
pub fn validate_store_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "store_id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "store_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_movement_amount() {
        assert!(validate_movement_amount(Money::from_cents(1)).is_ok());
        assert!(validate_movement_amount(Money::from_cents(5000)).is_ok());

        assert!(validate_movement_amount(Money::zero()).is_err());
        assert!(validate_movement_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_opening_balance() {
        assert!(validate_opening_balance(Money::zero()).is_ok());
        assert!(validate_opening_balance(Money::from_cents(10_000)).is_ok());
        assert!(validate_opening_balance(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_movement_reason() {
        assert_eq!(
            validate_movement_reason(" troco cliente ").unwrap(),
            "troco cliente"
        );
        assert!(validate_movement_reason("").is_err());
        assert!(validate_movement_reason("   ").is_err());
        assert!(validate_movement_reason(&"a".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_attendant() {
        assert_eq!(validate_attendant("Maria").unwrap(), "Maria");
        assert!(validate_attendant("  ").is_err());
    }

    #[test]
    fn test_validate_store_id() {
        assert!(validate_store_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_store_id("").is_err());
        assert!(validate_store_id("not-a-uuid").is_err());
    }
}
