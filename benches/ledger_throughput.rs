//! Benchmark suite for point service throughput
//!
//! Compares contended (single user) and uncontended (many users) workloads,
//! for both the blocking and the async API.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use point_ledger::{InMemoryHistoryStore, InMemoryLedgerStore, PointService, UserLockRegistry};
use std::sync::Arc;
use std::thread;

fn main() {
    divan::main();
}

fn service() -> PointService {
    PointService::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(UserLockRegistry::new()),
    )
}

/// Sequential charges on a single user from one thread
#[divan::bench]
fn blocking_single_thread_single_user() {
    let service = service();
    for _ in 0..1_000 {
        service.charge_blocking(1, 1).expect("charge failed");
    }
}

/// Charges from several threads, all on the same user
#[divan::bench(args = [2, 4, 8])]
fn blocking_contended_single_user(threads: usize) {
    let service = service();
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..1_000 / threads {
                    service.charge_blocking(1, 1).expect("charge failed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

/// Charges from several threads, each on its own user
#[divan::bench(args = [2, 4, 8])]
fn blocking_uncontended_many_users(threads: usize) {
    let service = service();
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..1_000 / threads {
                    service.charge_blocking(i as i64 + 1, 1).expect("charge failed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

/// Async charges spread over 100 users on a multi-threaded runtime
#[divan::bench]
fn async_many_users() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .build()
        .expect("Failed to create tokio runtime");
    let service = service();

    runtime.block_on(async {
        let tasks: Vec<_> = (0..1_000)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.charge(i % 100 + 1, 1).await })
            })
            .collect();

        for task in tasks {
            task.await.expect("task panicked").expect("charge failed");
        }
    });
}
