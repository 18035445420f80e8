//! Error types for the point ledger
//!
//! This module defines every failure a point operation can report.
//! Errors carry enough context for the request layer to build a
//! user-facing response.
//!
//! # Error Categories
//!
//! - **Validation Errors**: non-positive user id or amount
//! - **Business Rule Errors**: balance cap exceeded, insufficient balance
//! - **Concurrency Errors**: per-user lock not acquired within the configured bound

use super::transaction::{Points, UserId};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the point ledger
///
/// Every business failure is detected before any store is written, so an
/// error always means the user's balance and history are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    /// User id is zero or negative
    ///
    /// Detected before the user's lock is requested; no store is read.
    #[error("Invalid user id {user_id}: user ids must be positive")]
    InvalidUserId {
        /// The rejected user id
        user_id: UserId,
    },

    /// Charge or spend amount is zero, negative or missing
    ///
    /// Detected before the user's lock is requested; no store is read.
    #[error("Invalid amount {}: amounts must be positive", amount.map(|a| a.to_string()).unwrap_or_else(|| "<missing>".to_string()))]
    InvalidAmount {
        /// The rejected amount (`None` when the request carried no amount)
        amount: Option<Points>,
    },

    /// Charging would push the balance over the cap
    #[error("Balance cap exceeded for user {user_id}: balance {balance} + charge {amount} exceeds {cap}")]
    BalanceCapExceeded {
        /// User id
        user_id: UserId,
        /// Balance before the charge
        balance: Points,
        /// Requested charge
        amount: Points,
        /// Cap in force
        cap: Points,
    },

    /// Spend amount exceeds the current balance
    #[error("Insufficient balance for user {user_id}: balance {balance}, requested {amount}")]
    InsufficientBalance {
        /// User id
        user_id: UserId,
        /// Balance before the spend
        balance: Points,
        /// Requested spend
        amount: Points,
    },

    /// The user's lock could not be acquired in time
    ///
    /// Only produced when a lock timeout is configured. The operation was
    /// never started, so retrying is safe.
    #[error("Timed out after {waited_ms}ms waiting for the lock of user {user_id}")]
    LockTimeout {
        /// User id
        user_id: UserId,
        /// How long the caller waited
        waited_ms: u64,
    },
}

// Helper functions for creating common errors

impl PointError {
    /// Create an InvalidUserId error
    pub fn invalid_user_id(user_id: UserId) -> Self {
        PointError::InvalidUserId { user_id }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Option<Points>) -> Self {
        PointError::InvalidAmount { amount }
    }

    /// Create a BalanceCapExceeded error
    pub fn balance_cap_exceeded(user_id: UserId, balance: Points, amount: Points, cap: Points) -> Self {
        PointError::BalanceCapExceeded {
            user_id,
            balance,
            amount,
            cap,
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user_id: UserId, balance: Points, amount: Points) -> Self {
        PointError::InsufficientBalance {
            user_id,
            balance,
            amount,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(user_id: UserId, waited_ms: u64) -> Self {
        PointError::LockTimeout { user_id, waited_ms }
    }

    /// HTTP-style status code a request layer should answer with
    ///
    /// Business-rule failures are the caller's fault (400). A lock timeout
    /// means the service was too busy for this user (503).
    pub fn status_code(&self) -> u16 {
        match self {
            PointError::InvalidUserId { .. }
            | PointError::InvalidAmount { .. }
            | PointError::BalanceCapExceeded { .. }
            | PointError::InsufficientBalance { .. } => 400,
            PointError::LockTimeout { .. } => 503,
        }
    }

    /// Whether retrying the same request unchanged can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PointError::LockTimeout { .. })
    }
}

/// Request-layer view of a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl From<&PointError> for ErrorResponse {
    fn from(error: &PointError) -> Self {
        ErrorResponse {
            code: error.status_code(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_user_id(
        PointError::InvalidUserId { user_id: -1 },
        "Invalid user id -1: user ids must be positive"
    )]
    #[case::invalid_amount(
        PointError::InvalidAmount { amount: Some(0) },
        "Invalid amount 0: amounts must be positive"
    )]
    #[case::missing_amount(
        PointError::InvalidAmount { amount: None },
        "Invalid amount <missing>: amounts must be positive"
    )]
    #[case::balance_cap_exceeded(
        PointError::BalanceCapExceeded { user_id: 1, balance: 999_999, amount: 2, cap: 1_000_000 },
        "Balance cap exceeded for user 1: balance 999999 + charge 2 exceeds 1000000"
    )]
    #[case::insufficient_balance(
        PointError::InsufficientBalance { user_id: 3, balance: 60, amount: 1000 },
        "Insufficient balance for user 3: balance 60, requested 1000"
    )]
    #[case::lock_timeout(
        PointError::LockTimeout { user_id: 9, waited_ms: 250 },
        "Timed out after 250ms waiting for the lock of user 9"
    )]
    fn test_error_display(#[case] error: PointError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_user_id(PointError::invalid_user_id(0), PointError::InvalidUserId { user_id: 0 })]
    #[case::invalid_amount(PointError::invalid_amount(Some(-5)), PointError::InvalidAmount { amount: Some(-5) })]
    #[case::balance_cap_exceeded(
        PointError::balance_cap_exceeded(1, 10, 20, 25),
        PointError::BalanceCapExceeded { user_id: 1, balance: 10, amount: 20, cap: 25 }
    )]
    #[case::insufficient_balance(
        PointError::insufficient_balance(2, 5, 6),
        PointError::InsufficientBalance { user_id: 2, balance: 5, amount: 6 }
    )]
    #[case::lock_timeout(PointError::lock_timeout(4, 100), PointError::LockTimeout { user_id: 4, waited_ms: 100 })]
    fn test_helper_functions(#[case] result: PointError, #[case] expected: PointError) {
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case::invalid_user_id(PointError::invalid_user_id(-3), 400, false)]
    #[case::invalid_amount(PointError::invalid_amount(None), 400, false)]
    #[case::balance_cap_exceeded(PointError::balance_cap_exceeded(1, 1, 1_000_000, 1_000_000), 400, false)]
    #[case::insufficient_balance(PointError::insufficient_balance(1, 0, 1), 400, false)]
    #[case::lock_timeout(PointError::lock_timeout(1, 10), 503, true)]
    fn test_status_mapping(
        #[case] error: PointError,
        #[case] expected_code: u16,
        #[case] retryable: bool,
    ) {
        assert_eq!(error.status_code(), expected_code);
        assert_eq!(error.is_retryable(), retryable);
    }

    #[test]
    fn test_error_response_from_error() {
        let error = PointError::insufficient_balance(1, 60, 1000);
        let response = ErrorResponse::from(&error);

        assert_eq!(response.code, 400);
        assert_eq!(response.message, error.to_string());
    }
}
