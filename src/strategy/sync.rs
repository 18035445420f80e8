//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. Requests are streamed from the CSV file and
//! executed one at a time through the blocking point service API, in file order.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Request execution to `PointService` (business logic)
//! - CSV output to `csv_format::write_balances_csv` (format handling)

use crate::core::{InMemoryHistoryStore, InMemoryLedgerStore, LedgerConfig, PointService};
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_outcome, summarize, ProcessingStrategy};
use log::warn;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use point_ledger::core::LedgerConfig;
/// use point_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(LedgerConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("requests.csv"), &mut output)
///     .expect("Processing failed");
/// ```
///
/// # Panics
///
/// `process` uses blocking lock acquisition and must not be called from
/// within an async runtime.
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: LedgerConfig,
}

impl SyncProcessingStrategy {
    /// Create a new SyncProcessingStrategy with the given ledger settings
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let service = PointService::from_config(ledger.clone(), history.clone(), &self.config);

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(request) => {
                    let outcome = service.execute_blocking(&request);
                    log_outcome(&request, &outcome);
                }
                Err(e) => warn!("{}", e),
            }
        }

        write_balances_csv(&summarize(&ledger, &history), output)
    }
}
