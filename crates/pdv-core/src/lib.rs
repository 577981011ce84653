//! # pdv-core: Pure Business Logic for the PDV Engine
//!
//! This crate is the heart of the point-of-sale engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        PDV Engine Architecture                      │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │                pdv-service (command handlers)               │    │
//! │  │    checkout, open/close register, sangria/suprimento        │    │
//! │  └─────────────────────────────┬───────────────────────────────┘    │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐    │
//! │  │               ★ pdv-core (THIS CRATE) ★                     │    │
//! │  │                                                             │    │
//! │  │   ┌────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐            │    │
//! │  │   │ money  │ │  cart  │ │ pricing │ │ register │            │    │
//! │  │   │ Money  │ │  Cart  │ │ Charges │ │ Session  │            │    │
//! │  │   └────────┘ └────────┘ └─────────┘ └──────────┘            │    │
//! │  │                                                             │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │    │
//! │  └─────────────────────────────┬───────────────────────────────┘    │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐    │
//! │  │                    pdv-db (SQLite layer)                    │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart engine: ordered lines with merge/split rules
//! - [`pricing`] - Pure pricing calculator (discount/fee/tip/change)
//! - [`register`] - Cash session state machine with balance ledger
//! - [`receipt`] - Receipt value object handed to renderers
//! - [`types`] - Shared domain types (orders, payment methods)
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64)
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod register;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Addon, Cart, CartLine, LineKey, Product};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{ChargeParams, Charges};
pub use receipt::{ReceiptData, ReceiptLine};
pub use register::{CashMovement, CashSession, CloseSummary, MovementKind, SessionStatus};
pub use types::{Discount, Order, OrderItem, OrderStatus, OrderType, PaymentMethod};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transactions printable on one cupom.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
