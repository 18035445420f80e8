//! Balance-related types for the point ledger
//!
//! This module defines the per-user balance record and the balance cap
//! that every mutation must respect.

use super::transaction::{Points, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Maximum number of points a single user may hold
pub const MAX_BALANCE: Points = 1_000_000;

/// Current point balance of a single user
///
/// Represents the ledger state for one user. A record is created with a
/// zero balance the first time a user is seen and is afterwards only
/// replaced while that user's lock is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBalance {
    /// The user this balance belongs to
    pub user_id: UserId,

    /// Points currently held
    ///
    /// Always within `0..=MAX_BALANCE` (or the configured cap).
    pub points: Points,

    /// Wall-clock time of the last write to this record
    pub updated_at: DateTime<Utc>,
}

impl UserBalance {
    /// Create a balance record with the given points, stamped with the current time
    pub fn new(user_id: UserId, points: Points) -> Self {
        UserBalance {
            user_id,
            points,
            updated_at: Utc::now(),
        }
    }

    /// Create the zero-balance record used for users seen for the first time
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, 0)
    }
}

/// One row of the final balance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub user: UserId,
    pub points: Points,
    /// Number of history records appended for this user
    pub transactions: usize,
}
