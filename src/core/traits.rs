//! Store contracts consumed by the point service
//!
//! The point service never owns its storage. Balances and history live
//! behind these traits so that in-memory, database-backed, or test
//! implementations can be injected interchangeably.
//!
//! Both traits take `&self`: implementations handle their own interior
//! mutability. The point service only ever writes a given user's entries
//! while holding that user's lock, so a store needs no per-user
//! coordination of its own.

use crate::types::{Points, TransactionKind, TransactionRecord, UserBalance, UserId};
use chrono::{DateTime, Utc};

/// Current balance per user
pub trait LedgerStore: Send + Sync {
    /// Get the balance of a user
    ///
    /// Never fails. Unknown users get a zero-balance record, which is
    /// stored so that repeated reads return the same record.
    fn select_by_id(&self, user_id: UserId) -> UserBalance;

    /// Replace the balance of a user and return the stored record
    fn insert_or_update(&self, user_id: UserId, points: Points) -> UserBalance;
}

/// Append-only log of balance mutations per user
pub trait HistoryStore: Send + Sync {
    /// Append a record and return it with its assigned id
    fn insert(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> TransactionRecord;

    /// Get every record of a user in append order
    fn select_all_by_user_id(&self, user_id: UserId) -> Vec<TransactionRecord>;
}
