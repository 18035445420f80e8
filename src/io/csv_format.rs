//! CSV format handling for point requests and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to point requests
//! - Balance report serialization
//!
//! All functions are pure (no I/O beyond the given writer) for easy testing.

use crate::types::{BalanceSummary, PointRequest, Points, RequestKind, UserId};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, user, amount.
/// The amount field is optional because balance and history reads
/// don't carry one.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: UserId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a PointRequest
///
/// This function:
/// - Parses the request type string into a RequestKind
/// - Parses the amount string into points (if present)
/// - Validates that amounts are present for charge/use
///
/// User ids and amounts are not range-checked here: non-positive values are
/// passed through so the point service can reject them with a typed error.
///
/// # Returns
///
/// * `Ok(PointRequest)` - Successfully converted record
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<PointRequest, String> {
    let kind = match csv_record.kind.to_lowercase().as_str() {
        "balance" => RequestKind::Balance,
        "history" => RequestKind::History,
        "charge" => RequestKind::Charge,
        "use" => RequestKind::Use,
        _ => {
            return Err(format!(
                "Invalid request type: '{}' for user {}",
                csv_record.kind, csv_record.user
            ))
        }
    };

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match amount_str.trim().parse::<Points>() {
                Ok(points) => Some(points),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for user {}",
                        amount_str, csv_record.user
                    ))
                }
            }
        }
        _ => None,
    };

    match kind {
        RequestKind::Charge | RequestKind::Use => {
            if amount.is_none() {
                return Err(format!(
                    "{:?} request for user {} requires an amount",
                    kind, csv_record.user
                ));
            }
        }
        // Reads ignore any amount provided
        RequestKind::Balance | RequestKind::History => {}
    }

    Ok(PointRequest {
        kind,
        user_id: csv_record.user,
        amount,
    })
}

/// Write the balance report in CSV format
///
/// Writes rows with columns: user, points, transactions.
/// Rows are sorted by user id for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances_csv(summaries: &[BalanceSummary], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    let mut sorted = summaries.to_vec();
    sorted.sort_by_key(|summary| summary.user);

    if sorted.is_empty() {
        // serialize() only emits the header alongside the first row
        writer
            .write_record(["user", "points", "transactions"])
            .map_err(|e| format!("Failed to write CSV header: {}", e))?;
    }

    for summary in &sorted {
        writer
            .serialize(summary)
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
