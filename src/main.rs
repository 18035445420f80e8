//! Point Ledger CLI
//!
//! Replays a CSV file of point requests through the ledger and prints the
//! final per-user balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- requests.csv > balances.csv
//! cargo run -- --strategy sync requests.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --workers 8 requests.csv > balances.csv
//! cargo run -- --max-balance 50000 --lock-timeout-ms 500 requests.csv > balances.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use point_ledger::cli;
use point_ledger::strategy;
use std::process;

fn main() {
    env_logger::init();

    let args = cli::parse_args();

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), batch_config, args.to_ledger_config())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
