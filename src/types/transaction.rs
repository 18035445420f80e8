//! Transaction-related types for the point ledger
//!
//! This module defines identifiers, history records, and the request/outcome
//! types that flow between the request layer and the point service.

use super::balance::UserBalance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identifier
///
/// Signed so that non-positive ids coming from callers can be represented
/// and rejected with `PointError::InvalidUserId`.
pub type UserId = i64;

/// Point amount
pub type Points = i64;

/// History record identifier, unique across all users
pub type TransactionId = u64;

/// Kind of balance mutation recorded in a user's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Points added to the balance
    Charge,

    /// Points spent from the balance
    Use,
}

/// Immutable entry in a user's point history
///
/// Records are appended only while the owning user's lock is held, so the
/// order of a user's records is the order in which their mutations happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Store-assigned identifier
    pub id: TransactionId,

    /// The user whose balance changed
    pub user_id: UserId,

    /// Amount charged or spent (always positive)
    pub amount: Points,

    /// Whether this was a charge or a spend
    pub kind: TransactionKind,

    /// Wall-clock time at which the record was written
    pub timestamp: DateTime<Utc>,
}

/// Operation requested by a caller of the point service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Read the current balance
    Balance,

    /// Read the transaction history
    History,

    /// Add points
    Charge,

    /// Spend points
    Use,
}

/// A single request as received from the request layer
///
/// The amount is optional because balance and history reads don't carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRequest {
    pub kind: RequestKind,
    pub user_id: UserId,
    pub amount: Option<Points>,
}

/// Successful result of executing a `PointRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointOutcome {
    /// Balance after a read, charge or spend
    Balance(UserBalance),

    /// History in append order
    History(Vec<TransactionRecord>),
}
