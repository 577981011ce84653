//! # PDV Service Layer
//!
//! Command handlers for the point-of-sale terminal: the active
//! transaction, the checkout pipeline, and the cash register lifecycle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      pdv-service Crate                              │
//! │                                                                     │
//! │   Terminal surface (UI, CLI, IPC)                                   │
//! │        │                                                            │
//! │        ▼                                                            │
//! │   ┌───────────┐   ┌───────────────────┐   ┌───────────────────┐    │
//! │   │ Terminal  │──►│ CheckoutProcessor │   │  RegisterService  │    │
//! │   │ (active   │   │ (persist + retry  │──►│  (per-store       │    │
//! │   │  txn)     │   │  + receipt)       │   │   sessions)       │    │
//! │   └───────────┘   └─────────┬─────────┘   └─────────┬─────────┘    │
//! │                             │                       │              │
//! │                             ▼                       ▼              │
//! │                      pdv-db (SQLite)         pdv-db (SQLite)       │
//! │                                                                     │
//! │   All arithmetic and state-machine rules live in pdv-core; this     │
//! │   crate only sequences them against the database.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use pdv_db::{Database, DbConfig};
//! use pdv_service::{CheckoutProcessor, RegisterService, StoreInfo, Terminal};
//!
//! let db = Database::new(DbConfig::new("/var/lib/pdv/pdv.db")).await?;
//! let register = RegisterService::new(db.clone());
//! let processor = CheckoutProcessor::new(db, register.clone(), store_info);
//!
//! register.open_session(&store_id, "Maria", opening_float).await?;
//! let outcome = processor.checkout(&terminal, "Maria").await?;
//! ```

pub mod checkout;
pub mod error;
pub mod register;
pub mod terminal;

pub use checkout::{CheckoutOutcome, CheckoutProcessor, RetryPolicy, StoreInfo};
pub use error::{ServiceError, ServiceResult};
pub use register::RegisterService;
pub use terminal::{PdvTransaction, Terminal};
