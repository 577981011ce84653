//! # Service Error Types
//!
//! What the terminal surface sees when a command fails.
//!
//! ## Categorization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Service Error Categories                          │
//! │                                                                     │
//! │  Validation          operator input was wrong; fix and resubmit     │
//! │  Invariant           a business rule blocked the command            │
//! │  CheckoutInProgress  double submit; the first attempt is still live │
//! │  Persistence         the database failed; `retryable` says whether  │
//! │                      trying again could help                        │
//! │  OrderStatusUnknown  TERMINAL: retries exhausted mid-checkout, the  │
//! │                      order may or may not exist. Surfaced with the  │
//! │                      idempotency key so the outcome can be checked; │
//! │                      never silently retried into a duplicate.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use pdv_core::{CoreError, ValidationError};
use pdv_db::DbError;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Operator input failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A business rule blocked the command.
    ///
    /// ## Examples
    /// - Opening a second session for a store
    /// - Closing a session that is already closed
    /// - Checking out an empty cart or insufficient cash
    #[error("{0}")]
    Invariant(String),

    /// A checkout for this transaction is already running.
    ///
    /// The terminal should wait for the first attempt to resolve instead
    /// of submitting again.
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// The persistence layer failed.
    #[error("Persistence failed: {source}")]
    Persistence {
        #[source]
        source: DbError,
        /// Whether retrying the same command could plausibly succeed.
        retryable: bool,
    },

    /// Checkout retries were exhausted and the order's fate is unknown.
    ///
    /// The payload carries the idempotency key of the attempt; querying
    /// for it answers whether the order was actually created.
    #[error("Order status unknown after {attempts} attempts (idempotency key {idempotency_key})")]
    OrderStatusUnknown {
        idempotency_key: String,
        attempts: u32,
    },
}

impl ServiceError {
    /// Stable category code for the terminal surface.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Invariant(_) => "invariant",
            ServiceError::CheckoutInProgress => "checkout_in_progress",
            ServiceError::Persistence { .. } => "persistence",
            ServiceError::OrderStatusUnknown { .. } => "order_status_unknown",
        }
    }
}

/// Serialized as `{ code, message }` so the surface can branch on the
/// category without parsing message text.
impl Serialize for ServiceError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ServiceError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ServiceError::Validation(v),
            other => ServiceError::Invariant(other.to_string()),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        let retryable = err.is_transient();
        ServiceError::Persistence {
            source: err,
            retryable,
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ServiceError = CoreError::AlreadyClosed {
            session_id: "s1".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Invariant(_)));

        let err: ServiceError = CoreError::Validation(ValidationError::Required {
            field: "reason".to_string(),
        })
        .into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_db_error_retryability() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(
            err,
            ServiceError::Persistence { retryable: true, .. }
        ));

        let err: ServiceError = DbError::UniqueViolation {
            field: "orders.idempotency_key".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ServiceError::Persistence {
                retryable: false,
                ..
            }
        ));
    }

    #[test]
    fn test_serializes_as_code_and_message() {
        let err = ServiceError::Invariant("Cash session already open".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "invariant");
        assert_eq!(json["message"], "Cash session already open");

        let err = ServiceError::OrderStatusUnknown {
            idempotency_key: "k1".to_string(),
            attempts: 3,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "order_status_unknown");
    }
}
