//! # Cash Session Repository
//!
//! Database operations for cash register sessions and their movement ledger.
//!
//! ## Guarded Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                Status-Guarded Updates                               │
//! │                                                                     │
//! │  UPDATE cash_register_sessions                                      │
//! │  SET cash_sales = cash_sales + ?                                    │
//! │  WHERE id = ? AND status = 'open'    ← the guard                    │
//! │                                                                     │
//! │  rows_affected == 0  →  session missing or already closed           │
//! │                                                                     │
//! │  Every counter mutation and the close itself carry the guard, so    │
//! │  a session that closed between read and write cannot be touched.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pdv_core::{CashMovement, CashSession, MovementKind, Money, PaymentMethod};

/// Repository for cash register session operations.
#[derive(Debug, Clone)]
pub struct CashSessionRepository {
    pool: SqlitePool,
}

impl CashSessionRepository {
    /// Creates a new CashSessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashSessionRepository { pool }
    }

    /// Inserts a freshly opened session.
    ///
    /// The partial unique index on `(store_id) WHERE status = 'open'`
    /// rejects a second open session for the same store with
    /// `DbError::UniqueViolation`, no matter how many terminals race.
    pub async fn insert(&self, session: &CashSession) -> DbResult<()> {
        debug!(id = %session.id, store_id = %session.store_id, "Inserting cash session");

        sqlx::query(
            r#"
            INSERT INTO cash_register_sessions (
                id, store_id, attendant, opened_at, closed_at,
                opening_balance, cash_sales, card_sales, pix_sales,
                withdrawals, deposits, status,
                closing_balance, expected_balance, difference
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&session.id)
        .bind(&session.store_id)
        .bind(&session.attendant)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(session.opening_balance)
        .bind(session.cash_sales)
        .bind(session.card_sales)
        .bind(session.pix_sales)
        .bind(session.withdrawals)
        .bind(session.deposits)
        .bind(session.status)
        .bind(session.closing_balance)
        .bind(session.expected_balance)
        .bind(session.difference)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            SELECT id, store_id, attendant, opened_at, closed_at,
                   opening_balance, cash_sales, card_sales, pix_sales,
                   withdrawals, deposits, status,
                   closing_balance, expected_balance, difference
            FROM cash_register_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Finds the open session for a store, if any.
    pub async fn find_open(&self, store_id: &str) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            SELECT id, store_id, attendant, opened_at, closed_at,
                   opening_balance, cash_sales, card_sales, pix_sales,
                   withdrawals, deposits, status,
                   closing_balance, expected_balance, difference
            FROM cash_register_sessions
            WHERE store_id = ?1 AND status = 'open'
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Adds a completed sale to the session's per-method counter.
    ///
    /// Guarded: fails with `NotFound` if the session is missing or no
    /// longer open.
    pub async fn record_sale(
        &self,
        session_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> DbResult<()> {
        debug!(session_id, method = method.as_str(), %amount, "Recording sale on session");

        let column = match method {
            PaymentMethod::Cash => "cash_sales",
            PaymentMethod::Card => "card_sales",
            PaymentMethod::Pix => "pix_sales",
        };

        // column name comes from the match above, never from input
        let sql = format!(
            "UPDATE cash_register_sessions SET {column} = {column} + ?1 \
             WHERE id = ?2 AND status = 'open'"
        );

        let result = sqlx::query(&sql)
            .bind(amount)
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open cash session", session_id));
        }

        Ok(())
    }

    /// Appends a movement to the ledger and bumps the matching counter,
    /// atomically.
    pub async fn add_movement(&self, movement: &CashMovement) -> DbResult<()> {
        debug!(
            session_id = %movement.session_id,
            kind = ?movement.kind,
            amount = %movement.amount,
            "Adding cash movement"
        );

        let counter = match movement.kind {
            MovementKind::Withdrawal => "withdrawals",
            MovementKind::Deposit => "deposits",
        };
        let sql = format!(
            "UPDATE cash_register_sessions SET {counter} = {counter} + ?1 \
             WHERE id = ?2 AND status = 'open'"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&sql)
            .bind(movement.amount)
            .bind(&movement.session_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open cash session", &movement.session_id));
        }

        sqlx::query(
            r#"
            INSERT INTO cash_movements (
                id, session_id, kind, amount, reason, attendant, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.session_id)
        .bind(movement.kind)
        .bind(movement.amount)
        .bind(&movement.reason)
        .bind(&movement.attendant)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persists the close of a session.
    ///
    /// The caller computes the reconciliation on a [`CashSession`] that
    /// has already transitioned to closed; this writes the frozen figures
    /// and flips the status, guarded on the row still being open.
    pub async fn close(&self, session: &CashSession) -> DbResult<()> {
        debug!(id = %session.id, "Closing cash session");

        let result = sqlx::query(
            r#"
            UPDATE cash_register_sessions
            SET status = 'closed',
                closed_at = ?1,
                closing_balance = ?2,
                expected_balance = ?3,
                difference = ?4
            WHERE id = ?5 AND status = 'open'
            "#,
        )
        .bind(session.closed_at)
        .bind(session.closing_balance)
        .bind(session.expected_balance)
        .bind(session.difference)
        .bind(&session.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open cash session", &session.id));
        }

        Ok(())
    }

    /// Lists movements for a session, most recent first.
    pub async fn list_movements(&self, session_id: &str) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(
            r#"
            SELECT id, session_id, kind, amount, reason, attendant, created_at
            FROM cash_movements
            WHERE session_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
