//! Core business logic module
//!
//! This module contains the point ledger core:
//! - `traits` - Store contracts consumed by the point service
//! - `ledger_store` - In-memory balance store
//! - `history_store` - In-memory transaction history store
//! - `lock_registry` - Per-user FIFO lock registry
//! - `point_service` - Serialized balance reads, history reads, charges and spends
//! - `batch_processor` - Concurrent batch execution partitioned by user

pub mod batch_processor;
pub mod history_store;
pub mod ledger_store;
pub mod lock_registry;
pub mod point_service;
pub mod traits;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use history_store::InMemoryHistoryStore;
pub use ledger_store::InMemoryLedgerStore;
pub use lock_registry::UserLockRegistry;
pub use point_service::{LedgerConfig, PointService};
pub use traits::{HistoryStore, LedgerStore};
