//! # Cash Register Service
//!
//! Per-store session lifecycle orchestration.
//!
//! ## Serialization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Per-Store Command Serialization                        │
//! │                                                                     │
//! │  Terminal A ──┐                                                     │
//! │               ├──► store lock ──► one command at a time ──► SQLite  │
//! │  Terminal B ──┘         │                                           │
//! │                         │   other stores run concurrently           │
//! │                                                                     │
//! │  The lock removes read-modify-write races inside one process; the   │
//! │  partial unique index on open sessions backs the same invariant     │
//! │  at the database, so a second process cannot break it either.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence First
//! Every command persists before reporting success. There is no in-memory
//! session cache to drift from the database; the database row is the
//! session.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::error::{ServiceError, ServiceResult};
use pdv_core::validation::{validate_attendant, validate_store_id};
use pdv_core::{CashMovement, CashSession, CloseSummary, Money, MovementKind, PaymentMethod};
use pdv_db::{Database, DbError};

/// Orchestrates cash register sessions for all stores on this terminal.
#[derive(Debug, Clone)]
pub struct RegisterService {
    db: Database,
    /// One lock per store; commands for the same store run one at a time.
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl RegisterService {
    /// Creates a register service over the given database.
    pub fn new(db: Database) -> Self {
        RegisterService {
            db,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The lock guarding commands for one store.
    async fn store_lock(&self, store_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(store_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Opens a session for a store.
    ///
    /// Fails with an invariant error if the store already has an open
    /// session, whether detected by the pre-check or by the database's
    /// partial unique index.
    #[instrument(skip(self))]
    pub async fn open_session(
        &self,
        store_id: &str,
        attendant: &str,
        opening_balance: Money,
    ) -> ServiceResult<CashSession> {
        validate_store_id(store_id)?;
        let attendant = validate_attendant(attendant)?;

        let lock = self.store_lock(store_id).await;
        let _guard = lock.lock().await;

        if self.db.cash_sessions().find_open(store_id).await?.is_some() {
            return Err(ServiceError::Invariant(format!(
                "Store {store_id} already has an open cash session"
            )));
        }

        let session = CashSession::open(store_id, attendant, opening_balance)?;

        match self.db.cash_sessions().insert(&session).await {
            Ok(()) => {}
            // second terminal raced past the pre-check; the index caught it
            Err(DbError::UniqueViolation { .. }) => {
                return Err(ServiceError::Invariant(format!(
                    "Store {store_id} already has an open cash session"
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(session_id = %session.id, store_id, "Cash session opened");
        Ok(session)
    }

    /// The open session for a store, if any.
    pub async fn current_session(&self, store_id: &str) -> ServiceResult<Option<CashSession>> {
        Ok(self.db.cash_sessions().find_open(store_id).await?)
    }

    /// The cash the store's drawer should hold right now.
    pub async fn expected_balance(&self, store_id: &str) -> ServiceResult<Money> {
        let session = self.require_open(store_id).await?;
        Ok(session.current_expected_balance())
    }

    /// Records a sangria (withdrawal) or suprimento (deposit).
    ///
    /// Validates against the session state first, then persists the
    /// ledger entry and counter bump atomically.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        store_id: &str,
        kind: MovementKind,
        amount: Money,
        reason: &str,
        attendant: &str,
    ) -> ServiceResult<CashMovement> {
        let lock = self.store_lock(store_id).await;
        let _guard = lock.lock().await;

        let mut session = self.require_open(store_id).await?;
        let movement = session.record_movement(kind, amount, reason, attendant)?;

        self.db.cash_sessions().add_movement(&movement).await?;

        info!(
            session_id = %session.id,
            ?kind,
            amount = %movement.amount,
            "Cash movement recorded"
        );
        Ok(movement)
    }

    /// Adds a completed sale to the store's open session counters.
    pub async fn record_sale(
        &self,
        store_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> ServiceResult<()> {
        let lock = self.store_lock(store_id).await;
        let _guard = lock.lock().await;

        let session = self.require_open(store_id).await?;
        self.db
            .cash_sessions()
            .record_sale(&session.id, method, amount)
            .await?;
        Ok(())
    }

    /// Closes the store's open session against the counted balance.
    ///
    /// Blind close: the caller supplies only what was counted; expected
    /// balance and difference are computed here and frozen. A non-zero
    /// difference never blocks the close.
    #[instrument(skip(self))]
    pub async fn close_session(
        &self,
        store_id: &str,
        counted_balance: Money,
    ) -> ServiceResult<(CashSession, CloseSummary)> {
        let lock = self.store_lock(store_id).await;
        let _guard = lock.lock().await;

        let mut session = self.require_open(store_id).await?;
        let summary = session.close(counted_balance)?;

        self.db.cash_sessions().close(&session).await?;

        info!(
            session_id = %session.id,
            store_id,
            expected = %summary.expected_balance,
            counted = %summary.counted_balance,
            difference = %summary.difference,
            "Cash session closed"
        );
        Ok((session, summary))
    }

    /// Lists a session's movements, most recent first.
    pub async fn list_movements(&self, session_id: &str) -> ServiceResult<Vec<CashMovement>> {
        Ok(self.db.cash_sessions().list_movements(session_id).await?)
    }

    async fn require_open(&self, store_id: &str) -> ServiceResult<CashSession> {
        self.db
            .cash_sessions()
            .find_open(store_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Invariant(format!("Store {store_id} has no open cash session"))
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
