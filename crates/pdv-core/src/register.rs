//! # Cash Register State Machine
//!
//! Per-store session lifecycle with a balance ledger.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Cash Session Lifecycle                           │
//! │                                                                     │
//! │  CLOSED ──open(opening_balance)──► OPEN                             │
//! │                                      │                              │
//! │                                      ├── record_sale(cash, 50.00)   │
//! │                                      ├── record_movement(sangria)   │
//! │                                      ├── record_movement(suprimento)│
//! │                                      │                              │
//! │  CLOSED ◄──close(counted_balance)────┘                              │
//! │                                                                     │
//! │  expected = opening + cash_sales + deposits − withdrawals           │
//! │  difference = counted − expected   (recorded, never blocks close)   │
//! │                                                                     │
//! │  One full cycle per session instance; close happens exactly once.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Blind Close
//! The operator enters the counted balance without being shown the
//! expected figure first. `close()` takes only the counted amount and
//! computes everything else internally, so a caller cannot accidentally
//! build a "peek then adjust" flow on top of this API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::{validate_movement_amount, validate_movement_reason, validate_opening_balance};

// =============================================================================
// Session Status
// =============================================================================

/// Status of a cash register session.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting sales and movements.
    Open,
    /// Reconciled and frozen.
    Closed,
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Mid-shift cash movement type.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Sangria: cash taken out of the drawer.
    Withdrawal,
    /// Suprimento: cash added to the drawer.
    Deposit,
}

// =============================================================================
// Cash Movement
// =============================================================================

/// A mid-shift cash movement. Append-only; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashMovement {
    pub id: String,
    pub session_id: String,
    pub kind: MovementKind,
    /// Always > 0; the kind carries the direction.
    pub amount: Money,
    pub reason: String,
    pub attendant: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Close Summary
// =============================================================================

/// Result of closing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseSummary {
    pub expected_balance: Money,
    pub counted_balance: Money,
    /// counted − expected. Negative means the drawer is short.
    pub difference: Money,
}

impl CloseSummary {
    /// Whether the drawer matched the ledger exactly.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}

// =============================================================================
// Cash Session
// =============================================================================

/// A per-store cash register session.
///
/// ## Invariants
/// - At most one `Open` session per store at any time (enforced by the
///   service layer and a partial unique index at the persistence layer)
/// - Counters only change while the session is `Open`
/// - `close()` succeeds exactly once and freezes expected/difference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashSession {
    pub id: String,
    pub store_id: String,
    pub attendant: String,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub opening_balance: Money,
    pub cash_sales: Money,
    pub card_sales: Money,
    pub pix_sales: Money,
    pub withdrawals: Money,
    pub deposits: Money,
    pub status: SessionStatus,
    pub closing_balance: Option<Money>,
    pub expected_balance: Option<Money>,
    pub difference: Option<Money>,
}

impl CashSession {
    /// Opens a new session with the given float.
    ///
    /// Counters start at zero. The caller is responsible for the
    /// single-open-session-per-store invariant.
    pub fn open(
        store_id: impl Into<String>,
        attendant: impl Into<String>,
        opening_balance: Money,
    ) -> CoreResult<Self> {
        validate_opening_balance(opening_balance)?;

        Ok(CashSession {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.into(),
            attendant: attendant.into(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_balance,
            cash_sales: Money::zero(),
            card_sales: Money::zero(),
            pix_sales: Money::zero(),
            withdrawals: Money::zero(),
            deposits: Money::zero(),
            status: SessionStatus::Open,
            closing_balance: None,
            expected_balance: None,
            difference: None,
        })
    }

    /// Whether the session is still accepting sales and movements.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    fn ensure_open(&self, operation: &'static str) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::SessionClosed {
                session_id: self.id.clone(),
                operation,
            })
        }
    }

    /// Records a completed sale against this session.
    ///
    /// Only cash sales affect the drawer's expected balance; card and pix
    /// are tracked for shift reporting.
    pub fn record_sale(&mut self, method: PaymentMethod, amount: Money) -> CoreResult<()> {
        self.ensure_open("record sale")?;
        validate_movement_amount(amount)?;

        match method {
            PaymentMethod::Cash => self.cash_sales += amount,
            PaymentMethod::Card => self.card_sales += amount,
            PaymentMethod::Pix => self.pix_sales += amount,
        }
        Ok(())
    }

    /// Records a sangria (withdrawal) or suprimento (deposit).
    ///
    /// Validation happens before any counter mutation; a rejected call
    /// leaves the session untouched.
    pub fn record_movement(
        &mut self,
        kind: MovementKind,
        amount: Money,
        reason: &str,
        attendant: &str,
    ) -> CoreResult<CashMovement> {
        self.ensure_open("record movement")?;
        validate_movement_amount(amount)?;
        let reason = validate_movement_reason(reason)?;

        match kind {
            MovementKind::Withdrawal => self.withdrawals += amount,
            MovementKind::Deposit => self.deposits += amount,
        }

        Ok(CashMovement {
            id: Uuid::new_v4().to_string(),
            session_id: self.id.clone(),
            kind,
            amount,
            reason,
            attendant: attendant.to_string(),
            created_at: Utc::now(),
        })
    }

    /// The cash the drawer should hold right now.
    ///
    /// `opening + cash_sales + deposits − withdrawals`, recomputable
    /// identically at any point before close. Card and pix sales never
    /// enter the drawer.
    pub fn current_expected_balance(&self) -> Money {
        self.opening_balance + self.cash_sales + self.deposits - self.withdrawals
    }

    /// Closes the session against the counted drawer balance.
    ///
    /// Computes and freezes `expected_balance` and `difference`, then
    /// transitions to `Closed`. A non-zero difference is a reportable
    /// fact, never a failure: the session closes either way and the
    /// difference stays on record for audit.
    pub fn close(&mut self, counted_balance: Money) -> CoreResult<CloseSummary> {
        if !self.is_open() {
            return Err(CoreError::AlreadyClosed {
                session_id: self.id.clone(),
            });
        }

        let expected = self.current_expected_balance();
        let difference = counted_balance - expected;

        self.status = SessionStatus::Closed;
        self.closed_at = Some(Utc::now());
        self.closing_balance = Some(counted_balance);
        self.expected_balance = Some(expected);
        self.difference = Some(difference);

        Ok(CloseSummary {
            expected_balance: expected,
            counted_balance,
            difference,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session(opening_cents: i64) -> CashSession {
        CashSession::open("store-1", "Maria", Money::from_cents(opening_cents)).unwrap()
    }

    #[test]
    fn test_open_starts_zeroed() {
        let session = open_session(10_000);
        assert!(session.is_open());
        assert_eq!(session.opening_balance.cents(), 10_000);
        assert_eq!(session.cash_sales, Money::zero());
        assert_eq!(session.card_sales, Money::zero());
        assert_eq!(session.pix_sales, Money::zero());
        assert_eq!(session.withdrawals, Money::zero());
        assert_eq!(session.deposits, Money::zero());
        assert!(session.closed_at.is_none());
    }

    #[test]
    fn test_open_rejects_negative_float() {
        let err = CashSession::open("store-1", "Maria", Money::from_cents(-1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_record_sale_by_method() {
        let mut session = open_session(0);
        session
            .record_sale(PaymentMethod::Cash, Money::from_cents(5000))
            .unwrap();
        session
            .record_sale(PaymentMethod::Card, Money::from_cents(3000))
            .unwrap();
        session
            .record_sale(PaymentMethod::Pix, Money::from_cents(2000))
            .unwrap();

        assert_eq!(session.cash_sales.cents(), 5000);
        assert_eq!(session.card_sales.cents(), 3000);
        assert_eq!(session.pix_sales.cents(), 2000);
        // only cash touches the drawer
        assert_eq!(session.current_expected_balance().cents(), 5000);
    }

    #[test]
    fn test_reference_reconciliation_example() {
        // open(100.00) → sale(cash, 50.00) → sangria(20.00) → suprimento(30.00)
        let mut session = open_session(10_000);
        session
            .record_sale(PaymentMethod::Cash, Money::from_cents(5000))
            .unwrap();
        session
            .record_movement(
                MovementKind::Withdrawal,
                Money::from_cents(2000),
                "troco cliente",
                "Maria",
            )
            .unwrap();
        session
            .record_movement(
                MovementKind::Deposit,
                Money::from_cents(3000),
                "reforço",
                "Maria",
            )
            .unwrap();

        assert_eq!(session.current_expected_balance().cents(), 16_000);

        let summary = session.close(Money::from_cents(16_000)).unwrap();
        assert_eq!(summary.difference, Money::zero());
        assert!(summary.is_balanced());
    }

    #[test]
    fn test_close_with_shortage_still_closes() {
        let mut session = open_session(10_000);
        session
            .record_sale(PaymentMethod::Cash, Money::from_cents(5000))
            .unwrap();
        session
            .record_movement(
                MovementKind::Withdrawal,
                Money::from_cents(2000),
                "troco cliente",
                "Maria",
            )
            .unwrap();
        session
            .record_movement(
                MovementKind::Deposit,
                Money::from_cents(3000),
                "reforço",
                "Maria",
            )
            .unwrap();

        // drawer short R$10.00: a reportable fact, not a failure
        let summary = session.close(Money::from_cents(15_000)).unwrap();
        assert_eq!(summary.difference.cents(), -1000);
        assert!(!summary.is_balanced());
        assert!(!session.is_open());
        assert_eq!(session.difference, Some(Money::from_cents(-1000)));
        assert_eq!(session.expected_balance, Some(Money::from_cents(16_000)));
        assert_eq!(session.closing_balance, Some(Money::from_cents(15_000)));
    }

    #[test]
    fn test_close_twice_rejected() {
        let mut session = open_session(0);
        session.close(Money::zero()).unwrap();
        let err = session.close(Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyClosed { .. }));
    }

    #[test]
    fn test_operations_rejected_after_close() {
        let mut session = open_session(0);
        session.close(Money::zero()).unwrap();

        let err = session
            .record_sale(PaymentMethod::Cash, Money::from_cents(100))
            .unwrap_err();
        assert!(matches!(err, CoreError::SessionClosed { .. }));

        let err = session
            .record_movement(
                MovementKind::Deposit,
                Money::from_cents(100),
                "reforço",
                "Maria",
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::SessionClosed { .. }));

        // counters untouched by the rejected calls
        assert_eq!(session.cash_sales, Money::zero());
        assert_eq!(session.deposits, Money::zero());
    }

    #[test]
    fn test_movement_validation_before_mutation() {
        let mut session = open_session(0);

        let err = session
            .record_movement(MovementKind::Withdrawal, Money::zero(), "motivo", "Maria")
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = session
            .record_movement(
                MovementKind::Withdrawal,
                Money::from_cents(-100),
                "motivo",
                "Maria",
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = session
            .record_movement(MovementKind::Withdrawal, Money::from_cents(100), "  ", "Maria")
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert_eq!(session.withdrawals, Money::zero());
    }

    #[test]
    fn test_expected_balance_recomputable_any_time() {
        let mut session = open_session(10_000);
        assert_eq!(session.current_expected_balance().cents(), 10_000);

        session
            .record_sale(PaymentMethod::Cash, Money::from_cents(2500))
            .unwrap();
        assert_eq!(session.current_expected_balance().cents(), 12_500);

        session
            .record_movement(
                MovementKind::Withdrawal,
                Money::from_cents(500),
                "sangria",
                "Maria",
            )
            .unwrap();
        assert_eq!(session.current_expected_balance().cents(), 12_000);
    }

    #[test]
    fn test_movement_record_fields() {
        let mut session = open_session(0);
        let movement = session
            .record_movement(
                MovementKind::Deposit,
                Money::from_cents(3000),
                "  reforço  ",
                "Maria",
            )
            .unwrap();

        assert_eq!(movement.session_id, session.id);
        assert_eq!(movement.kind, MovementKind::Deposit);
        assert_eq!(movement.amount.cents(), 3000);
        assert_eq!(movement.reason, "reforço"); // trimmed
        assert_eq!(movement.attendant, "Maria");
    }
}
