//! # Domain Types
//!
//! Core domain types used throughout the PDV engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │     Order       │   │   OrderItem     │   │    Discount     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Percent(bps)   │   │
//! │  │  order_code     │   │  order_id (FK)  │   │  Fixed(Money)   │   │
//! │  │  total          │   │  price snapshot │   └─────────────────┘   │
//! │  └─────────────────┘   └─────────────────┘                         │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐                         │
//! │  │ PaymentMethod   │   │   OrderType     │                         │
//! │  │  Cash/Card/Pix  │   │ DineIn/Counter  │                         │
//! │  └─────────────────┘   └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have both a UUID (`id`, used for relations) and a human-readable
//! business code (`order_code`, printed on the receipt).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method that touches the register drawer.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Pix instant transfer.
    Pix,
}

impl PaymentMethod {
    /// Whether this method moves physical cash through the drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Wire name as stored on order records.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "credit_card",
            PaymentMethod::Pix => "pix",
        }
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// Channel the order came through.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Table service (a table number was entered).
    DineIn,
    /// Walk-up counter sale.
    Counter,
}

// =============================================================================
// Discount
// =============================================================================

/// A transaction-level discount.
///
/// ## Example
/// ```rust
/// use pdv_core::{Discount, Money};
///
/// let pct = Discount::Percent(1000); // 10%
/// assert_eq!(pct.amount_on(Money::from_cents(4400)).cents(), 440);
///
/// let fixed = Discount::Fixed(Money::from_cents(500));
/// assert_eq!(fixed.amount_on(Money::from_cents(4400)).cents(), 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, in basis points (1000 = 10%).
    Percent(u32),
    /// Fixed amount off.
    Fixed(Money),
}

impl Discount {
    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount::Fixed(Money::zero())
    }

    /// The discount amount for a given subtotal.
    ///
    /// A fixed discount larger than the subtotal is returned as-is; the
    /// pricing calculator clamps the final total at zero instead of
    /// rejecting the discount.
    pub fn amount_on(&self, subtotal: Money) -> Money {
        match self {
            Discount::Percent(bps) => subtotal.apply_rate(*bps),
            Discount::Fixed(amount) => *amount,
        }
    }

    /// Whether this discount takes anything off.
    pub fn is_none(&self) -> bool {
        match self {
            Discount::Percent(bps) => *bps == 0,
            Discount::Fixed(amount) => amount.is_zero(),
        }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

// =============================================================================
// Order
// =============================================================================

/// Status of a persisted order.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid at the terminal, ready for the kitchen.
    Confirmed,
    /// Cancelled after the fact.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Confirmed
    }
}

/// A persisted order header, created once per successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub store_id: String,
    /// Human-readable code: `MESA-7` for table orders, `PDV-<millis>` otherwise.
    pub order_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub order_type: OrderType,
    pub payment_method: String,
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Client-generated key; unique at the persistence layer so a retried
    /// submission can never create a second order.
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item on a persisted order.
///
/// Snapshot pattern: unit price and addon total are frozen at sale time,
/// decoupled from later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// Sum of addon prices per unit at time of sale (frozen).
    pub addon_total: Money,
    /// (unit_price + addon_total) × quantity.
    pub total_price: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Recomputes the line total from the frozen components.
    #[inline]
    pub fn computed_total(&self) -> Money {
        (self.unit_price + self.addon_total).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
