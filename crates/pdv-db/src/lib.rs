//! # PDV Database Layer
//!
//! SQLite persistence for the PDV transaction and cash-register engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      pdv-db Crate                                   │
//! │                                                                     │
//! │   ┌──────────────┐      ┌────────────────────────────────────┐     │
//! │   │   Database   │─────►│  Repositories                      │     │
//! │   │  (pool.rs)   │      │  • OrderRepository                 │     │
//! │   └──────┬───────┘      │  • CashSessionRepository           │     │
//! │          │              └────────────────────────────────────┘     │
//! │          ▼                                                          │
//! │   ┌──────────────┐      ┌────────────────────────────────────┐     │
//! │   │  Migrations  │      │  SQLite (WAL mode)                 │     │
//! │   │  (embedded)  │─────►│  • orders / order_items            │     │
//! │   └──────────────┘      │  • cash_register_sessions          │     │
//! │                         │  • cash_movements                  │     │
//! │                         └────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! - **Monetary integrity**: all money columns are INTEGER centavos
//! - **Guarded transitions**: status checks live in the UPDATE itself
//! - **Constraints as backstop**: idempotency keys and the single-open-
//!   session rule are enforced by the schema, not only by callers
//!
//! ## Usage
//! ```rust,ignore
//! use pdv_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("/var/lib/pdv/pdv.db")).await?;
//! let open = db.cash_sessions().find_open(&store_id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::cash_session::CashSessionRepository;
pub use repository::order::OrderRepository;
