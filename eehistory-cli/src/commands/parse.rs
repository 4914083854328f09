//! Parse command - reconstruct transactions from an export

use std::path::Path;

use anyhow::{anyhow, Result};
use colored::Colorize;

use super::{get_logger, log_event, resolve_config};
use crate::output;
use eehistory_core::adapters::open_source;
use eehistory_core::{
    HistoryService, LogEvent, OperationResult, ParsedHistory, TransactionRecord,
};

/// Skipped line numbers listed before eliding
const SKIPPED_LINES_SHOWN: usize = 10;

pub fn run(file: &Path, sheet: Option<String>, cutoff: Option<&str>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("parse"));

    let config = resolve_config(sheet, cutoff)?;
    let result = open_source(file, &config).and_then(|source| {
        HistoryService::new(config.parse_options()).parse(source.as_ref())
    });

    let event = match &result {
        Ok(parsed) => LogEvent::parse_completed(&parsed.report),
        Err(e) => LogEvent::parse_failed(e),
    };
    log_event(&logger, event.with_command("parse"));

    if json {
        let envelope: OperationResult<ParsedHistory> = result.into();
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return match envelope.error {
            Some(error) => Err(anyhow!(error)),
            None => Ok(()),
        };
    }

    let parsed = result?;
    print_records(&parsed.records);

    println!();
    output::success(&format!(
        "Parsed {} transactions from {} ({} rows read)",
        parsed.report.records,
        file.display(),
        parsed.report.rows_read
    ));

    let skipped = &parsed.report.skipped_lines;
    if !skipped.is_empty() {
        output::warning(&format!(
            "Skipped {} unrecognized rows (lines {})",
            skipped.len(),
            output::format_lines(skipped, SKIPPED_LINES_SHOWN)
        ));
    }

    Ok(())
}

fn print_records(records: &[TransactionRecord]) {
    if records.is_empty() {
        output::info("No transactions found.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "Date", "Type", "Action", "Fund", "Units", "Price", "Net Amount", "Fees",
    ]);

    for record in records {
        let trade = record.trade();
        let kind = match record.action_type() {
            Some(action_type) => action_type.cyan().to_string(),
            None => "trade".to_string(),
        };

        table.add_row(vec![
            trade.date.to_string(),
            kind,
            trade.action.as_str().to_string(),
            trade.fund_name.clone(),
            trade.units_delta.to_string(),
            output::format_amount(trade.price),
            output::format_amount(trade.net_amount),
            output::format_amount(record.total_fees()),
        ]);
    }

    println!("{}", table);
}
