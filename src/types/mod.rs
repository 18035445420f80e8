//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `balance`: Per-user balance record and the balance cap
//! - `transaction`: Identifiers, history records, requests and outcomes
//! - `error`: Error types for the point ledger

pub mod balance;
pub mod error;
pub mod transaction;

pub use balance::{BalanceSummary, UserBalance, MAX_BALANCE};
pub use error::{ErrorResponse, PointError};
pub use transaction::{
    PointOutcome, PointRequest, Points, RequestKind, TransactionId, TransactionKind,
    TransactionRecord, UserId,
};
