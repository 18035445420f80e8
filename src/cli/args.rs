use crate::core::LedgerConfig;
use crate::strategy::BatchConfig;
use crate::types::{Points, MAX_BALANCE};
use clap::{Parser, ValueEnum};
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

/// Replay point charge/use requests and report final balances
#[derive(Parser, Debug)]
#[command(name = "point-ledger")]
#[command(about = "Replay point charge/use requests and report final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing point requests
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Upper bound on waiting for a user's lock
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Fail a request after waiting this long for its user's lock (async mode only, default: wait indefinitely)"
    )]
    pub lock_timeout_ms: Option<u64>,

    /// Highest balance a charge may produce
    #[arg(
        long = "max-balance",
        value_name = "POINTS",
        allow_negative_numbers = true,
        help = "Balance cap per user (default: 1000000)"
    )]
    pub max_balance: Option<Points>,
}

/// Available processing strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.workers.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.workers.unwrap_or(default.worker_threads),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments
    ///
    /// A non-positive balance cap falls back to the default with a warning.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        let max_balance = match self.max_balance {
            Some(cap) if cap <= 0 => {
                warn!("Invalid max_balance ({}), using default ({})", cap, MAX_BALANCE);
                MAX_BALANCE
            }
            Some(cap) => cap,
            None => MAX_BALANCE,
        };

        LedgerConfig {
            max_balance,
            lock_timeout: self.lock_timeout_ms.map(Duration::from_millis),
        }
    }
}
