//! Per-user lock registry
//!
//! This module provides `UserLockRegistry`, which hands out one exclusive lock
//! per user id and runs operations while that lock is held.
//!
//! # Design
//!
//! Locks live in a `DashMap<UserId, Arc<Mutex<()>>>`. The first lookup for a
//! user creates its lock through `entry().or_insert_with()`, which holds the
//! shard write lock for the duration of the insert, so concurrent first
//! lookups for the same user always converge on a single `Arc`. Entries are
//! never removed; the registry grows with the number of distinct users seen.
//!
//! # Fairness
//!
//! The per-user lock is a `tokio::sync::Mutex`, which queues waiters and
//! grants the lock in the order their acquisition started. Requests for the
//! same user are therefore applied in arrival order, and no waiter can be
//! starved by later arrivals.
//!
//! # Thread Safety
//!
//! The shard guard of the map is always released before the user lock is
//! awaited. Holding a user lock never blocks lookups for other users.

use crate::types::{PointError, UserId};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Registry of FIFO-fair locks keyed by user id
#[derive(Debug, Default)]
pub struct UserLockRegistry {
    /// One lock per user id ever seen
    locks: DashMap<UserId, Arc<Mutex<()>>>,

    /// Upper bound on async lock waits (`None` waits indefinitely)
    lock_timeout: Option<Duration>,
}

impl UserLockRegistry {
    /// Create a registry whose async waits never time out
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Create a registry with an optional bound on async lock waits
    pub fn with_timeout(lock_timeout: Option<Duration>) -> Self {
        Self {
            locks: DashMap::new(),
            lock_timeout,
        }
    }

    /// Get the lock for a user, creating it on first use
    fn lock_for(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(user_id).or_insert_with(|| {
            debug!("Registered lock for user {}", user_id);
            Arc::new(Mutex::new(()))
        });
        Arc::clone(entry.value())
    }

    /// Run `operation` while holding the user's lock
    ///
    /// Waits in FIFO order behind earlier callers for the same user. The
    /// lock is released when `operation` returns, whether it succeeded,
    /// failed, or panicked.
    ///
    /// # Returns
    ///
    /// * The result of `operation`
    /// * `Err(PointError::LockTimeout)` if a timeout is configured and the
    ///   lock was not acquired in time; `operation` is not run in that case
    pub async fn acquire_and_run<F, T>(&self, user_id: UserId, operation: F) -> Result<T, PointError>
    where
        F: FnOnce() -> Result<T, PointError>,
    {
        let lock = self.lock_for(user_id);

        let _guard = match self.lock_timeout {
            Some(limit) => tokio::time::timeout(limit, lock.lock())
                .await
                .map_err(|_| PointError::lock_timeout(user_id, limit.as_millis() as u64))?,
            None => lock.lock().await,
        };

        operation()
    }

    /// Run `operation` while holding the user's lock, blocking the current thread
    ///
    /// Shares the same queue as `acquire_and_run`, so blocking and async
    /// callers are served in one FIFO order. Blocking waits are never bounded
    /// by the configured timeout.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn acquire_and_run_blocking<F, T>(&self, user_id: UserId, operation: F) -> Result<T, PointError>
    where
        F: FnOnce() -> Result<T, PointError>,
    {
        let lock = self.lock_for(user_id);
        let _guard = lock.blocking_lock();

        operation()
    }

    /// Number of distinct users that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been created yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_lock_is_created_once_per_user() {
        let registry = UserLockRegistry::new();

        let first = registry.lock_for(1);
        let second = registry.lock_for(1);
        registry.lock_for(2);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_first_lookup_converges_on_one_lock() {
        let registry = Arc::new(UserLockRegistry::new());
        let mut handles = vec![];

        for _ in 0..16 {
            let registry_clone = Arc::clone(&registry);
            handles.push(thread::spawn(move || registry_clone.lock_for(42)));
        }

        let locks: Vec<Arc<Mutex<()>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        assert!(locks.iter().all(|lock| Arc::ptr_eq(lock, &locks[0])));
    }

    #[test]
    fn test_blocking_run_returns_operation_result() {
        let registry = UserLockRegistry::new();

        let ok = registry.acquire_and_run_blocking(1, || Ok(7));
        let err: Result<(), PointError> =
            registry.acquire_and_run_blocking(1, || Err(PointError::invalid_amount(Some(0))));

        assert_eq!(ok, Ok(7));
        assert_eq!(err, Err(PointError::invalid_amount(Some(0))));
    }

    #[test]
    fn test_lock_is_released_after_error() {
        let registry = UserLockRegistry::new();

        let _ = registry.acquire_and_run_blocking(1, || -> Result<(), PointError> {
            Err(PointError::insufficient_balance(1, 0, 1))
        });

        assert!(registry.lock_for(1).try_lock().is_ok());
    }

    #[test]
    fn test_lock_is_released_after_panic() {
        let registry = Arc::new(UserLockRegistry::new());

        let registry_clone = Arc::clone(&registry);
        let result = thread::spawn(move || {
            registry_clone.acquire_and_run_blocking(1, || -> Result<(), PointError> {
                panic!("operation failed")
            })
        })
        .join();

        assert!(result.is_err());
        assert!(registry.lock_for(1).try_lock().is_ok());
    }

    #[test]
    fn test_blocking_runs_are_mutually_exclusive() {
        let registry = Arc::new(UserLockRegistry::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..8 {
            let registry_clone = Arc::clone(&registry);
            let inside_clone = Arc::clone(&inside);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    registry_clone
                        .acquire_and_run_blocking(1, || {
                            let concurrent = inside_clone.fetch_add(1, Ordering::SeqCst);
                            assert_eq!(concurrent, 0, "two holders inside the same user lock");
                            inside_clone.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[tokio::test]
    async fn test_waiters_are_served_in_arrival_order() {
        let registry = Arc::new(UserLockRegistry::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let queued = Arc::new(AtomicUsize::new(0));

        // Hold the lock so every task below has to queue
        let lock = registry.lock_for(1);
        let guard = lock.lock().await;

        let mut tasks = vec![];
        for i in 0..10 {
            let registry_clone = Arc::clone(&registry);
            let order_clone = Arc::clone(&order);
            let queued_clone = Arc::clone(&queued);
            tasks.push(tokio::spawn(async move {
                queued_clone.fetch_add(1, Ordering::SeqCst);
                registry_clone
                    .acquire_and_run(1, || {
                        order_clone.lock().unwrap().push(i);
                        Ok(())
                    })
                    .await
            }));

            // Let task i reach the lock queue before spawning task i + 1
            while queued.load(Ordering::SeqCst) <= i {
                tokio::task::yield_now().await;
            }
        }

        drop(guard);
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_timeout_skips_operation() {
        let registry = UserLockRegistry::with_timeout(Some(Duration::from_millis(20)));
        let ran = AtomicUsize::new(0);

        let lock = registry.lock_for(1);
        let _guard = lock.lock().await;

        let result = registry
            .acquire_and_run(1, || {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(result, Err(PointError::lock_timeout(1, 20)));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_users_are_not_blocked() {
        let registry = UserLockRegistry::new();

        let lock = registry.lock_for(1);
        let _guard = lock.lock().await;

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            registry.acquire_and_run(2, || Ok("done")),
        )
        .await
        .expect("user 2 was blocked by user 1's lock");

        assert_eq!(result, Ok("done"));
    }
}
