//! # Repository Module
//!
//! Database repository implementations for the PDV engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                               │
//! │                                                                     │
//! │  Service handler                                                    │
//! │       │                                                             │
//! │       │  db.cash_sessions().find_open(store_id)                     │
//! │       ▼                                                             │
//! │  CashSessionRepository                                              │
//! │       │  SQL query                                                  │
//! │       ▼                                                             │
//! │  SQLite database                                                    │
//! │                                                                     │
//! │  Benefits:                                                          │
//! │  • SQL is isolated in one place                                     │
//! │  • Status-guarded UPDATEs keep transitions atomic                   │
//! │  • Easy to exercise against an in-memory database                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`order::OrderRepository`] - Order + item persistence (idempotent)
//! - [`cash_session::CashSessionRepository`] - Session ledger operations

pub mod cash_session;
pub mod order;
