//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Requests are read in batches and each batch is
//! executed with one task per user on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── LedgerConfig (max_balance, lock_timeout)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (user partitioning + tasks)
//!     └── PointService (per-user locked execution)
//!         ├── UserLockRegistry
//!         ├── InMemoryLedgerStore
//!         └── InMemoryHistoryStore
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another, and within a batch each user's
//! requests run sequentially in one task. A user's requests are therefore
//! applied in file order even when they span several batches, and the output
//! matches the sync strategy exactly.

use crate::core::{
    BatchProcessor, InMemoryHistoryStore, InMemoryLedgerStore, LedgerConfig, PointService,
};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{log_outcome, summarize, ProcessingStrategy};
use log::warn;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of requests per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let worker_threads = if worker_threads == 0 {
            warn!(
                "Invalid worker_threads ({}), using default ({})",
                worker_threads, default.worker_threads
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    batch_config: BatchConfig,
    ledger_config: LedgerConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    pub fn new(batch_config: BatchConfig, ledger_config: LedgerConfig) -> Self {
        Self {
            batch_config,
            ledger_config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay requests from input file and write the balance report to output
    ///
    /// 1. Creates a tokio multi-threaded runtime with the configured workers
    /// 2. Builds the stores and the point service
    /// 3. Reads requests in batches using AsyncReader
    /// 4. Executes each batch through the BatchProcessor, waiting for it to
    ///    finish before reading the next one
    /// 5. Writes the balance report
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Timers are needed for the optional lock timeout
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch_config.worker_threads)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = Arc::new(InMemoryLedgerStore::new());
            let history = Arc::new(InMemoryHistoryStore::new());
            let service =
                PointService::from_config(ledger.clone(), history.clone(), &self.ledger_config);

            let processor = BatchProcessor::new(service);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.batch_config.batch_size).await;

                if batch.is_empty() {
                    break;
                }

                for result in processor.process_batch(batch).await {
                    log_outcome(&result.request, &result.result);
                }
            }

            write_balances_csv(&summarize(&ledger, &history), output)
        })
    }
}
