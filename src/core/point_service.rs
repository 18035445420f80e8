//! Serialized point operations
//!
//! This module provides `PointService`, which executes balance reads, history
//! reads, charges and spends against injected ledger and history stores.
//!
//! # Design
//!
//! Every operation validates its input first, then runs its whole
//! read-check-write sequence inside the user's lock from `UserLockRegistry`.
//! Because of that:
//! - operations on the same user are atomic with respect to each other and
//!   applied in the order they queued for the lock
//! - operations on different users never wait for each other
//! - a failed operation never writes anything: all checks happen before the
//!   history append, which is the first write
//!
//! # Architecture
//!
//! ```text
//! PointService
//!     ├── Arc<UserLockRegistry>  (per-user FIFO locks)
//!     ├── Arc<dyn LedgerStore>   (current balances)
//!     └── Arc<dyn HistoryStore>  (append-only history)
//! ```
//!
//! Each operation comes in two flavours: an async one for tasks running on a
//! tokio runtime, and a `_blocking` one for plain threads. Both share the same
//! locks and the same queue order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::debug;

use super::lock_registry::UserLockRegistry;
use super::traits::{HistoryStore, LedgerStore};
use crate::types::{
    PointError, PointOutcome, PointRequest, Points, RequestKind, TransactionKind,
    TransactionRecord, UserBalance, UserId, MAX_BALANCE,
};

/// Ledger-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Highest balance a charge may produce
    pub max_balance: Points,

    /// Bound on async lock waits (`None` waits indefinitely)
    pub lock_timeout: Option<Duration>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_balance: MAX_BALANCE,
            lock_timeout: None,
        }
    }
}

/// Executor of serialized per-user point operations
///
/// Cheap to clone: all state is shared through `Arc`, so clones can be
/// handed to as many threads or tasks as needed.
#[derive(Clone)]
pub struct PointService {
    ledger: Arc<dyn LedgerStore>,
    history: Arc<dyn HistoryStore>,
    locks: Arc<UserLockRegistry>,
    max_balance: Points,
}

impl PointService {
    /// Create a service over the given stores and lock registry
    ///
    /// The balance cap defaults to `MAX_BALANCE`.
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        history: Arc<dyn HistoryStore>,
        locks: Arc<UserLockRegistry>,
    ) -> Self {
        Self {
            ledger,
            history,
            locks,
            max_balance: MAX_BALANCE,
        }
    }

    /// Create a service with a fresh lock registry built from `config`
    pub fn from_config(
        ledger: Arc<dyn LedgerStore>,
        history: Arc<dyn HistoryStore>,
        config: &LedgerConfig,
    ) -> Self {
        let locks = Arc::new(UserLockRegistry::with_timeout(config.lock_timeout));
        Self::new(ledger, history, locks).with_max_balance(config.max_balance)
    }

    /// Override the balance cap
    pub fn with_max_balance(mut self, max_balance: Points) -> Self {
        self.max_balance = max_balance;
        self
    }

    /// The balance cap in force
    pub fn max_balance(&self) -> Points {
        self.max_balance
    }

    /// Get the current balance of a user
    ///
    /// Creates a zero balance for users seen for the first time.
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` if `user_id <= 0`
    /// * `LockTimeout` if a lock timeout is configured and exceeded
    pub async fn get_balance(&self, user_id: UserId) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        self.locks
            .acquire_and_run(user_id, || Ok(self.ledger.select_by_id(user_id)))
            .await
    }

    /// Blocking variant of [`PointService::get_balance`]
    pub fn get_balance_blocking(&self, user_id: UserId) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        self.locks
            .acquire_and_run_blocking(user_id, || Ok(self.ledger.select_by_id(user_id)))
    }

    /// Get the history of a user in append order
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` if `user_id <= 0`
    /// * `LockTimeout` if a lock timeout is configured and exceeded
    pub async fn get_history(&self, user_id: UserId) -> Result<Vec<TransactionRecord>, PointError> {
        validate_user_id(user_id)?;
        self.locks
            .acquire_and_run(user_id, || Ok(self.history.select_all_by_user_id(user_id)))
            .await
    }

    /// Blocking variant of [`PointService::get_history`]
    pub fn get_history_blocking(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, PointError> {
        validate_user_id(user_id)?;
        self.locks
            .acquire_and_run_blocking(user_id, || Ok(self.history.select_all_by_user_id(user_id)))
    }

    /// Add points to a user's balance
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` if `user_id <= 0`
    /// * `InvalidAmount` if `amount <= 0`
    /// * `BalanceCapExceeded` if the new balance would exceed the cap
    /// * `LockTimeout` if a lock timeout is configured and exceeded
    pub async fn charge(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        validate_amount(amount)?;
        self.locks
            .acquire_and_run(user_id, || self.apply_charge(user_id, amount))
            .await
    }

    /// Blocking variant of [`PointService::charge`]
    pub fn charge_blocking(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        validate_amount(amount)?;
        self.locks
            .acquire_and_run_blocking(user_id, || self.apply_charge(user_id, amount))
    }

    /// Spend points from a user's balance
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` if `user_id <= 0`
    /// * `InvalidAmount` if `amount <= 0`
    /// * `InsufficientBalance` if `amount` exceeds the current balance
    /// * `LockTimeout` if a lock timeout is configured and exceeded
    pub async fn spend(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        validate_amount(amount)?;
        self.locks
            .acquire_and_run(user_id, || self.apply_spend(user_id, amount))
            .await
    }

    /// Blocking variant of [`PointService::spend`]
    pub fn spend_blocking(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        validate_user_id(user_id)?;
        validate_amount(amount)?;
        self.locks
            .acquire_and_run_blocking(user_id, || self.apply_spend(user_id, amount))
    }

    /// Execute a request received from the request layer
    ///
    /// Charge and use requests without an amount fail with `InvalidAmount`.
    pub async fn execute(&self, request: &PointRequest) -> Result<PointOutcome, PointError> {
        match request.kind {
            RequestKind::Balance => self.get_balance(request.user_id).await.map(PointOutcome::Balance),
            RequestKind::History => self.get_history(request.user_id).await.map(PointOutcome::History),
            RequestKind::Charge => {
                let amount = required_amount(request)?;
                self.charge(request.user_id, amount).await.map(PointOutcome::Balance)
            }
            RequestKind::Use => {
                let amount = required_amount(request)?;
                self.spend(request.user_id, amount).await.map(PointOutcome::Balance)
            }
        }
    }

    /// Blocking variant of [`PointService::execute`]
    pub fn execute_blocking(&self, request: &PointRequest) -> Result<PointOutcome, PointError> {
        match request.kind {
            RequestKind::Balance => self.get_balance_blocking(request.user_id).map(PointOutcome::Balance),
            RequestKind::History => self.get_history_blocking(request.user_id).map(PointOutcome::History),
            RequestKind::Charge => {
                let amount = required_amount(request)?;
                self.charge_blocking(request.user_id, amount).map(PointOutcome::Balance)
            }
            RequestKind::Use => {
                let amount = required_amount(request)?;
                self.spend_blocking(request.user_id, amount).map(PointOutcome::Balance)
            }
        }
    }

    // Must only be called while holding the user's lock
    fn apply_charge(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        let current = self.ledger.select_by_id(user_id);

        let new_points = current
            .points
            .checked_add(amount)
            .filter(|points| *points <= self.max_balance)
            .ok_or_else(|| {
                PointError::balance_cap_exceeded(user_id, current.points, amount, self.max_balance)
            })?;

        self.history
            .insert(user_id, amount, TransactionKind::Charge, Utc::now());
        let updated = self.ledger.insert_or_update(user_id, new_points);

        debug!(
            "Charged {} points to user {} (balance {} -> {})",
            amount, user_id, current.points, updated.points
        );
        Ok(updated)
    }

    // Must only be called while holding the user's lock
    fn apply_spend(&self, user_id: UserId, amount: Points) -> Result<UserBalance, PointError> {
        let current = self.ledger.select_by_id(user_id);

        if amount > current.points {
            return Err(PointError::insufficient_balance(
                user_id,
                current.points,
                amount,
            ));
        }

        self.history
            .insert(user_id, amount, TransactionKind::Use, Utc::now());
        let updated = self.ledger.insert_or_update(user_id, current.points - amount);

        debug!(
            "User {} spent {} points (balance {} -> {})",
            user_id, amount, current.points, updated.points
        );
        Ok(updated)
    }
}

fn validate_user_id(user_id: UserId) -> Result<(), PointError> {
    if user_id <= 0 {
        return Err(PointError::invalid_user_id(user_id));
    }
    Ok(())
}

fn validate_amount(amount: Points) -> Result<(), PointError> {
    if amount <= 0 {
        return Err(PointError::invalid_amount(Some(amount)));
    }
    Ok(())
}

fn required_amount(request: &PointRequest) -> Result<Points, PointError> {
    // A non-positive user id is reported before a missing amount
    validate_user_id(request.user_id)?;
    request
        .amount
        .ok_or_else(|| PointError::invalid_amount(None))
}
