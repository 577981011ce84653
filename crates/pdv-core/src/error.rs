//! # Error Types
//!
//! Domain-specific error types for pdv-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  pdv-core errors (this file)                                        │
//! │  ├── CoreError        - Cart and register rule violations           │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  pdv-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  pdv-service errors (separate crate)                                │
//! │  └── ServiceError     - What the terminal surface sees              │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, session id, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations caught before any I/O happens.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No cart line matches the given identity key.
    #[error("Line not found in cart: product {product_id}, note {note:?}")]
    LineNotFound {
        product_id: String,
        note: Option<String>,
    },

    /// Cart has exceeded the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    ///
    /// Prevents accidental over-ordering (typing 1000 instead of 10).
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A sale or movement was attempted against a closed session.
    ///
    /// ## When This Occurs
    /// - Recording a sale after the register was closed
    /// - Registering a sangria/suprimento on a closed session
    ///
    /// Rejected before any counter mutation.
    #[error("Cash session {session_id} is closed, cannot {operation}")]
    SessionClosed {
        session_id: String,
        operation: &'static str,
    },

    /// A session can transition to closed exactly once.
    #[error("Cash session {session_id} is already closed")]
    AlreadyClosed { session_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet requirements. Used for
/// early validation before business logic runs and before any I/O.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must hold at least one element is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Cash tendered does not cover the transaction total.
    ///
    /// Caught before any I/O; the transaction stays intact so the
    /// operator can collect the difference and resubmit.
    #[error("Insufficient cash: received {received}, total {total}")]
    InsufficientCash { received: Money, total: Money },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
