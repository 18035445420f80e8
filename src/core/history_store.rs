//! In-memory history store
//!
//! This module provides `InMemoryHistoryStore`, the default `HistoryStore`
//! implementation. Each user's records live in their own `Vec` inside a
//! `DashMap`; record ids come from a single atomic cursor shared by all users.

use super::traits::HistoryStore;
use crate::types::{Points, TransactionId, TransactionKind, TransactionRecord, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe in-memory transaction log
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    /// Records per user, in append order
    records: DashMap<UserId, Vec<TransactionRecord>>,

    /// Next id to hand out
    cursor: AtomicU64,
}

impl InMemoryHistoryStore {
    /// Create an empty store whose first record gets id 1
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            cursor: AtomicU64::new(1),
        }
    }

    /// Number of records appended for a user
    pub fn count_by_user_id(&self, user_id: UserId) -> usize {
        self.records
            .get(&user_id)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    fn next_id(&self) -> TransactionId {
        self.cursor.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn insert(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> TransactionRecord {
        let record = TransactionRecord {
            id: self.next_id(),
            user_id,
            amount,
            kind,
            timestamp,
        };

        self.records
            .entry(user_id)
            .or_default()
            .push(record.clone());

        record
    }

    fn select_all_by_user_id(&self, user_id: UserId) -> Vec<TransactionRecord> {
        self.records
            .get(&user_id)
            .map(|records| records.value().clone())
            .unwrap_or_default()
    }
}
