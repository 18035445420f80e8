//! Point Ledger Library
//! # Overview
//!
//! This library provides a per-user point ledger: users charge and spend
//! integer points, balances are capped, and every mutation is recorded in an
//! append-only history.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (UserBalance, TransactionRecord, PointError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::lock_registry`] - One FIFO-fair lock per user, created on first use
//!   - [`core::point_service`] - Validated, per-user serialized point operations
//!   - [`core::traits`] - Ledger and history store contracts
//!   - [`core::batch_processor`] - Concurrent batch execution partitioned by user
//! - [`io`] - CSV request parsing and balance report output
//! - [`strategy`] - Sync and async request replay pipelines
//! - [`cli`] - CLI arguments parsing
//!
//! # Operations
//!
//! - **Balance**: Read a user's balance (zero for new users)
//! - **History**: Read a user's transactions in the order they happened
//! - **Charge**: Add points, failing if the balance would exceed the cap
//! - **Use**: Spend points, failing if the balance is insufficient
//!
//! # Concurrency
//!
//! All operations on one user run under that user's lock, in the order they
//! requested it. Operations on different users never wait for each other.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    HistoryStore, InMemoryHistoryStore, InMemoryLedgerStore, LedgerConfig, LedgerStore,
    PointService, UserLockRegistry,
};
pub use io::write_balances_csv;
pub use types::{
    BalanceSummary, ErrorResponse, PointError, PointOutcome, PointRequest, Points, RequestKind,
    TransactionKind, TransactionRecord, UserBalance, UserId, MAX_BALANCE,
};
