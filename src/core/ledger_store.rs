//! In-memory ledger store
//!
//! This module provides `InMemoryLedgerStore`, the default `LedgerStore`
//! implementation. Balances are kept in a `DashMap`, so lookups for
//! different users never contend on a global lock.

use super::traits::LedgerStore;
use crate::types::{Points, UserBalance, UserId};
use dashmap::DashMap;

/// Thread-safe in-memory balance table
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    /// Current balance record per user
    balances: DashMap<UserId, UserBalance>,
}

impl InMemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Get all balances for final output
    ///
    /// The balances are returned in arbitrary order. Callers that need a
    /// stable order sort the result themselves.
    pub fn all_balances(&self) -> Vec<UserBalance> {
        self.balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of users with a balance record
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no user has been seen yet
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn select_by_id(&self, user_id: UserId) -> UserBalance {
        self.balances
            .entry(user_id)
            .or_insert_with(|| UserBalance::empty(user_id))
            .value()
            .clone()
    }

    fn insert_or_update(&self, user_id: UserId, points: Points) -> UserBalance {
        let balance = UserBalance::new(user_id, points);
        self.balances.insert(user_id, balance.clone());
        balance
    }
}
