//! Batch processing with user-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which executes batches of
//! point requests concurrently while keeping each user's requests in order.
//!
//! # Design
//!
//! A batch is partitioned by user id. Each partition is processed sequentially
//! in its own tokio task, so a user's requests reach the per-user lock in file
//! order, while partitions for different users run in parallel.
//!
//! Spawning one task per request would not be enough: tasks for the same user
//! could reach the lock queue in any order, and the FIFO lock would faithfully
//! apply them in that wrong order.

use std::collections::HashMap;

use log::error;

use super::point_service::PointService;
use crate::types::{PointError, PointOutcome, PointRequest, UserId};

/// Result of executing a single request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request that was executed
    pub request: PointRequest,

    /// The outcome of executing it
    pub result: Result<PointOutcome, PointError>,
}

/// Batch processor with user-based partitioning
#[derive(Clone)]
pub struct BatchProcessor {
    service: PointService,
}

impl BatchProcessor {
    /// Create a new BatchProcessor over a point service
    pub fn new(service: PointService) -> Self {
        Self { service }
    }

    /// Partition a batch of requests by user id
    ///
    /// Every request lands in exactly one partition, and each partition keeps
    /// the original relative order of its requests.
    pub fn partition_by_user(
        &self,
        batch: Vec<PointRequest>,
    ) -> HashMap<UserId, Vec<PointRequest>> {
        let mut user_batches: HashMap<UserId, Vec<PointRequest>> = HashMap::new();

        for request in batch {
            user_batches
                .entry(request.user_id)
                .or_default()
                .push(request);
        }

        user_batches
    }

    /// Execute all requests of one user sequentially
    ///
    /// Failed requests are recorded in the results; they don't stop the
    /// remaining requests.
    pub async fn process_user_requests(&self, requests: Vec<PointRequest>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.service.execute(&request).await;
            results.push(ProcessingResult { request, result });
        }

        results
    }

    /// Execute a batch of requests, one task per user
    ///
    /// Waits for every task before returning. Results are grouped per user;
    /// the order between users is unspecified.
    pub async fn process_batch(&self, batch: Vec<PointRequest>) -> Vec<ProcessingResult> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (_user_id, requests) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_user_requests(requests).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => error!("Task panicked: {:?}", e),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history_store::InMemoryHistoryStore;
    use crate::core::ledger_store::InMemoryLedgerStore;
    use crate::core::lock_registry::UserLockRegistry;
    use crate::core::traits::LedgerStore;
    use crate::types::{Points, RequestKind};
    use std::sync::Arc;

    fn charge(user_id: UserId, amount: Points) -> PointRequest {
        PointRequest {
            kind: RequestKind::Charge,
            user_id,
            amount: Some(amount),
        }
    }

    fn spend(user_id: UserId, amount: Points) -> PointRequest {
        PointRequest {
            kind: RequestKind::Use,
            user_id,
            amount: Some(amount),
        }
    }

    fn processor() -> (BatchProcessor, Arc<InMemoryLedgerStore>) {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let service = PointService::new(
            ledger.clone(),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(UserLockRegistry::new()),
        );
        (BatchProcessor::new(service), ledger)
    }

    #[test]
    fn test_partition_keeps_per_user_order() {
        let (processor, _) = processor();
        let batch = vec![charge(1, 10), charge(2, 20), spend(1, 5), charge(1, 7)];

        let partitions = processor.partition_by_user(batch);

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[&1], vec![charge(1, 10), spend(1, 5), charge(1, 7)]);
        assert_eq!(partitions[&2], vec![charge(2, 20)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_applies_requests_in_order() {
        let (processor, ledger) = processor();
        // Spending before the charge arrives would fail, so order matters
        let batch = vec![
            charge(1, 100),
            charge(2, 50),
            spend(1, 100),
            charge(1, 30),
            spend(2, 60),
        ];

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 5);
        assert_eq!(ledger.select_by_id(1).points, 30);
        assert_eq!(ledger.select_by_id(2).points, 50);

        let failures: Vec<&ProcessingResult> = results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].request, spend(2, 60));
    }

    #[tokio::test]
    async fn test_process_user_requests_continues_after_failure() {
        let (processor, ledger) = processor();

        let results = processor
            .process_user_requests(vec![spend(1, 10), charge(1, 10), spend(1, 10)])
            .await;

        assert!(results[0].result.is_err());
        assert!(results[1].result.is_ok());
        assert!(results[2].result.is_ok());
        assert_eq!(ledger.select_by_id(1).points, 0);
    }
}
