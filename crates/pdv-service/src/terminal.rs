//! # Terminal Transaction State
//!
//! The in-flight transaction a terminal is building before checkout.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Active Transaction                                 │
//! │                                                                     │
//! │  Terminal                                                           │
//! │    └── Arc<Mutex<PdvTransaction>>   one per terminal, exclusive     │
//! │          ├── Cart                   lines, merge rules              │
//! │          ├── ChargeParams           discount / fee / tip            │
//! │          ├── payment + cash tendered                                │
//! │          └── customer / table metadata                              │
//! │                                                                     │
//! │  clear() resets EVERYTHING at once. A cleared cart with a stale     │
//! │  discount or tip would silently misprice the next customer.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::Mutex;

use pdv_core::pricing::{ChargeParams, Charges};
use pdv_core::{Cart, Discount, Money, PaymentMethod};

// =============================================================================
// Transaction
// =============================================================================

/// Everything the operator has entered for the current sale.
#[derive(Debug, Default)]
pub struct PdvTransaction {
    /// The cart being built.
    pub cart: Cart,

    /// Transaction-level discount.
    pub discount: Discount,

    /// Whether the 10% service fee applies.
    pub service_fee: bool,

    /// Tip rate in basis points.
    pub tip_bps: u32,

    /// Selected payment method. None until the operator picks one.
    pub payment_method: Option<PaymentMethod>,

    /// Cash tendered by the customer (cash payments only).
    pub cash_received: Money,

    /// Customer name; defaults to "Cliente PDV" at checkout when empty.
    pub customer_name: String,

    pub customer_phone: String,

    /// Table number for dine-in orders. None means counter sale.
    pub table_number: Option<String>,
}

impl PdvTransaction {
    /// The pricing parameters currently in force.
    pub fn charge_params(&self) -> ChargeParams {
        ChargeParams {
            discount: self.discount,
            service_fee: self.service_fee,
            tip_bps: self.tip_bps,
        }
    }

    /// The live charge breakdown for the current cart and parameters.
    pub fn charges(&self) -> Charges {
        Charges::compute(&self.cart, &self.charge_params())
    }

    /// Resets the whole transaction to its initial state.
    ///
    /// Cart, discount, fee, tip, payment selection, tendered cash and
    /// customer metadata all reset together.
    pub fn clear(&mut self) {
        *self = PdvTransaction::default();
    }
}

// =============================================================================
// Terminal
// =============================================================================

/// Handle to a terminal's active transaction.
///
/// Cloneable; clones share the same underlying transaction.
#[derive(Debug, Clone, Default)]
pub struct Terminal {
    txn: Arc<Mutex<PdvTransaction>>,
}

impl Terminal {
    /// Creates a terminal with an empty transaction.
    pub fn new() -> Self {
        Terminal::default()
    }

    /// Runs a closure with shared access to the transaction.
    pub async fn with_txn<R>(&self, f: impl FnOnce(&PdvTransaction) -> R) -> R {
        let txn = self.txn.lock().await;
        f(&txn)
    }

    /// Runs a closure with exclusive access to the transaction.
    pub async fn with_txn_mut<R>(&self, f: impl FnOnce(&mut PdvTransaction) -> R) -> R {
        let mut txn = self.txn.lock().await;
        f(&mut txn)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
