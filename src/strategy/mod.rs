//! Processing strategy module for replaying point requests
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! covering CSV parsing, request execution and report output. This allows
//! different execution models (single-threaded, concurrent batches) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::{InMemoryHistoryStore, InMemoryLedgerStore, LedgerConfig};
use crate::types::{BalanceSummary, ErrorResponse, PointError, PointOutcome, PointRequest};
use log::{debug, warn};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete request processing pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay requests from input file and write the balance report to output
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed (rejected requests included)
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The processing runtime cannot be started
    /// - The report cannot be written
    ///
    /// Malformed rows and rejected requests are logged and do not cause this
    /// method to fail.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch_config` - Optional batch configuration (ignored for sync)
/// * `ledger_config` - Balance cap and lock timeout for the point service
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    ledger_config: LedgerConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(ledger_config)),
        StrategyType::Async => {
            let batch_config = batch_config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(batch_config, ledger_config))
        }
    }
}

/// Build one report row per user known to the ledger
pub(crate) fn summarize(
    ledger: &InMemoryLedgerStore,
    history: &InMemoryHistoryStore,
) -> Vec<BalanceSummary> {
    ledger
        .all_balances()
        .into_iter()
        .map(|balance| BalanceSummary {
            user: balance.user_id,
            points: balance.points,
            transactions: history.count_by_user_id(balance.user_id),
        })
        .collect()
}

/// Log the outcome of one request
pub(crate) fn log_outcome(request: &PointRequest, result: &Result<PointOutcome, PointError>) {
    match result {
        Ok(PointOutcome::Balance(balance)) => debug!(
            "{:?} for user {}: balance {}",
            request.kind, balance.user_id, balance.points
        ),
        Ok(PointOutcome::History(records)) => debug!(
            "History for user {}: {} records",
            request.user_id,
            records.len()
        ),
        Err(e) => {
            let response = ErrorResponse::from(e);
            warn!(
                "Rejected {:?} for user {} ({}): {}",
                request.kind, request.user_id, response.code, response.message
            );
        }
    }
}
