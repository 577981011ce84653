//! # Checkout Processor
//!
//! Turns the active transaction into a persisted order and a receipt.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Pipeline                              │
//! │                                                                     │
//! │  submit ──► double-submit guard (AtomicBool)                        │
//! │                │                                                    │
//! │                ├── validate: cart, payment, cash gate, open session │
//! │                ├── freeze: charges, order code, item snapshots      │
//! │                ├── persist: INSERT order+items  ◄─── retry loop     │
//! │                │     │                               (backoff)      │
//! │                │     └── UniqueViolation on the idempotency key     │
//! │                │         means an earlier attempt already landed:   │
//! │                │         fetch that order and continue              │
//! │                ├── record sale on the cash session                  │
//! │                ├── clear the cart        ← success path only        │
//! │                └── assemble ReceiptData                             │
//! │                                                                     │
//! │  retries exhausted ──► OrderStatusUnknown { idempotency_key }       │
//! │                        (terminal; never silently retried into a     │
//! │                         duplicate order)                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One idempotency key is generated per submission and reused across
//! every internal retry, so the pipeline can crash and resume anywhere
//! without creating a second order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::register::RegisterService;
use crate::terminal::{PdvTransaction, Terminal};
use pdv_core::pricing::Charges;
use pdv_core::receipt::{ReceiptData, ReceiptLine};
use pdv_core::{Money, Order, OrderItem, OrderStatus, OrderType, PaymentMethod, ValidationError};
use pdv_db::{Database, DbError};

/// Customer name used when the operator leaves the field empty.
const DEFAULT_CUSTOMER_NAME: &str = "Cliente PDV";

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounded exponential backoff for the persistence step.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (0 = first retry).
    fn delay(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry)
    }
}

// =============================================================================
// Store Info
// =============================================================================

/// The store identity printed on receipts.
#[derive(Debug, Clone)]
pub struct StoreInfo {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Outcome
// =============================================================================

/// What a successful checkout hands back to the terminal surface.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub receipt: ReceiptData,
    /// Change due; zero for non-cash payments.
    pub change: Money,
}

// =============================================================================
// Processor
// =============================================================================

/// Runs checkouts for one store's terminal.
#[derive(Debug, Clone)]
pub struct CheckoutProcessor {
    db: Database,
    register: RegisterService,
    store: StoreInfo,
    retry: RetryPolicy,
    /// Set while a checkout is in flight; a second submit bounces.
    processing: Arc<AtomicBool>,
}

/// Clears the processing flag when the checkout ends, on every path.
struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CheckoutProcessor {
    /// Creates a checkout processor for a store.
    pub fn new(db: Database, register: RegisterService, store: StoreInfo) -> Self {
        CheckoutProcessor {
            db,
            register,
            store,
            retry: RetryPolicy::default(),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overrides the persistence retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Processes the terminal's active transaction.
    ///
    /// On success the cart is cleared and the outcome carries the
    /// persisted order and the frozen receipt payload. On any failure
    /// the transaction is left intact for the operator to fix and
    /// resubmit.
    #[instrument(skip(self, terminal))]
    pub async fn checkout(
        &self,
        terminal: &Terminal,
        attendant: &str,
    ) -> ServiceResult<CheckoutOutcome> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ServiceError::CheckoutInProgress);
        }
        let _guard = ProcessingGuard(self.processing.clone());

        // freeze everything under the transaction lock
        let (order, items, receipt_lines, charges, method, cash_received) =
            terminal.with_txn(|txn| self.freeze(txn, attendant)).await?;

        // selling requires an open register session
        let session = self
            .register
            .current_session(&self.store.id)
            .await?
            .ok_or_else(|| {
                ServiceError::Invariant(format!(
                    "Store {} has no open cash session",
                    self.store.id
                ))
            })?;

        let order = self.persist_with_retry(order, &items).await?;

        self.register
            .record_sale(&self.store.id, method, order.total_amount)
            .await?;

        let change = charges.change_for(method, cash_received);
        let receipt = self.build_receipt(&order, receipt_lines, &charges, attendant, method, cash_received, change);

        terminal.with_txn_mut(|txn| txn.clear()).await;

        info!(
            order_id = %order.id,
            order_code = %order.order_code,
            session_id = %session.id,
            total = %order.total_amount,
            "Checkout complete"
        );

        Ok(CheckoutOutcome {
            order,
            items,
            receipt,
            change,
        })
    }

    /// Validates the transaction and freezes it into persistable values.
    #[allow(clippy::type_complexity)]
    fn freeze(
        &self,
        txn: &PdvTransaction,
        attendant: &str,
    ) -> ServiceResult<(
        Order,
        Vec<OrderItem>,
        Vec<ReceiptLine>,
        Charges,
        PaymentMethod,
        Money,
    )> {
        if txn.cart.is_empty() {
            return Err(ValidationError::Empty {
                field: "cart".to_string(),
            }
            .into());
        }
        let method = txn.payment_method.ok_or_else(|| ValidationError::Required {
            field: "payment method".to_string(),
        })?;

        let charges = txn.charges();
        if !charges.is_payment_sufficient(method, txn.cash_received) {
            return Err(ValidationError::InsufficientCash {
                received: txn.cash_received,
                total: charges.total,
            }
            .into());
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let (order_type, order_code) = match &txn.table_number {
            Some(table) => (OrderType::DineIn, format!("MESA-{table}")),
            None => (OrderType::Counter, format!("PDV-{}", now.timestamp_millis())),
        };

        let customer_name = if txn.customer_name.trim().is_empty() {
            DEFAULT_CUSTOMER_NAME.to_string()
        } else {
            txn.customer_name.trim().to_string()
        };

        let mut items = Vec::with_capacity(txn.cart.line_count());
        let mut receipt_lines = Vec::with_capacity(txn.cart.line_count());

        for line in txn.cart.lines() {
            let addon_total = line.addon_total();
            let total_price = line.line_total();

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                addon_total,
                total_price,
                notes: line.note.clone(),
                created_at: now,
            });
            receipt_lines.push(ReceiptLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                addon_total,
                line_total: total_price,
                note: line.note.clone(),
            });
        }

        let order = Order {
            id: order_id,
            store_id: self.store.id.clone(),
            order_code,
            customer_name,
            customer_phone: txn.customer_phone.trim().to_string(),
            order_type,
            payment_method: method.as_str().to_string(),
            subtotal: charges.subtotal,
            discount: charges.discount,
            total_amount: charges.total,
            status: OrderStatus::Confirmed,
            notes: Some(Self::order_notes(txn, attendant, &charges)),
            idempotency_key: Uuid::new_v4().to_string(),
            created_at: now,
        };

        Ok((order, items, receipt_lines, charges, method, txn.cash_received))
    }

    /// The human-readable summary stored on the order row.
    ///
    /// Mirrors what the kitchen and back office expect to read at a
    /// glance: who sold, where, and which extras moved the price.
    fn order_notes(txn: &PdvTransaction, attendant: &str, charges: &Charges) -> String {
        let mut parts = vec![format!("Atendente: {attendant}")];
        if let Some(table) = &txn.table_number {
            parts.push(format!("Mesa: {table}"));
        }
        if charges.discount.is_positive() {
            parts.push(format!("Desconto: {}", charges.discount));
        }
        if txn.service_fee {
            parts.push(format!("Taxa de serviço: {}", charges.service_fee));
        }
        if charges.tip.is_positive() {
            parts.push(format!("Gorjeta: {}", charges.tip));
        }
        parts.join(" | ")
    }

    /// Persists the order, retrying transient failures with backoff.
    ///
    /// The idempotency key makes every outcome safe:
    /// - a UniqueViolation on the key means a previous attempt landed;
    ///   the existing order is fetched and returned
    /// - exhausted retries end in a final key lookup; only when that
    ///   also fails is the terminal `OrderStatusUnknown` surfaced
    async fn persist_with_retry(&self, order: Order, items: &[OrderItem]) -> ServiceResult<Order> {
        let key = order.idempotency_key.clone();

        for attempt in 0..self.retry.max_attempts {
            match self.db.orders().insert_with_items(&order, items).await {
                Ok(()) => return Ok(order),

                Err(DbError::UniqueViolation { .. }) => {
                    // an earlier attempt committed before its ack was lost
                    if let Some(existing) = self.db.orders().find_by_idempotency_key(&key).await? {
                        return Ok(existing);
                    }
                    return Err(ServiceError::Invariant(
                        "Duplicate order detected".to_string(),
                    ));
                }

                Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Order persistence failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }

                Err(e) if e.is_transient() => {
                    // last attempt failed; the insert may still have landed
                    match self.db.orders().find_by_idempotency_key(&key).await {
                        Ok(Some(existing)) => return Ok(existing),
                        _ => {
                            warn!(error = %e, idempotency_key = %key, "Order fate unknown");
                            return Err(ServiceError::OrderStatusUnknown {
                                idempotency_key: key,
                                attempts: self.retry.max_attempts,
                            });
                        }
                    }
                }

                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::OrderStatusUnknown {
            idempotency_key: key,
            attempts: self.retry.max_attempts,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_receipt(
        &self,
        order: &Order,
        items: Vec<ReceiptLine>,
        charges: &Charges,
        attendant: &str,
        method: PaymentMethod,
        cash_received: Money,
        change: Money,
    ) -> ReceiptData {
        ReceiptData {
            order_code: order.order_code.clone(),
            store_name: self.store.name.clone(),
            store_address: self.store.address.clone(),
            store_phone: self.store.phone.clone(),
            attendant: attendant.to_string(),
            customer_name: Some(order.customer_name.clone()),
            table_number: order
                .order_code
                .strip_prefix("MESA-")
                .map(|t| t.to_string()),
            items,
            subtotal: charges.subtotal,
            discount: charges.discount,
            service_fee: charges.service_fee,
            tip: charges.tip,
            total: charges.total,
            payment_method: method,
            cash_received: method.is_cash().then_some(cash_received),
            change: method.is_cash().then_some(change),
            created_at: order.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
