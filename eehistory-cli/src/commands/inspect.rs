//! Inspect command - show how each row of an export is classified

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{get_logger, log_event, resolve_config};
use crate::output;
use eehistory_core::adapters::open_source;
use eehistory_core::{HistoryService, LogEvent, RowInspection};

pub fn run(file: &Path, sheet: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("inspect"));

    let config = resolve_config(sheet, None)?;
    let source = open_source(file, &config)?;
    let rows = HistoryService::new(config.parse_options()).inspect(source.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::info("No rows found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Line", "Date", "Category", "Amount", "Fields", "Problem"]);

    let mut problems = 0;
    for row in &rows {
        let category = match row.category {
            Some(category) => category.to_string(),
            None => "unrecognized".dimmed().to_string(),
        };
        let problem = match &row.problem {
            Some(problem) => {
                problems += 1;
                problem.red().to_string()
            }
            None => String::new(),
        };

        table.add_row(vec![
            row.line.to_string(),
            row.date.to_string(),
            category,
            output::format_amount(row.amount),
            describe_fields(row),
            problem,
        ]);
    }

    println!("{}", table);

    let unrecognized = rows.iter().filter(|row| row.category.is_none()).count();
    println!();
    println!(
        "{} rows, {} unrecognized, {} with problems",
        rows.len(),
        unrecognized,
        problems
    );

    Ok(())
}

/// Extracted fields as a short `key=value` list
fn describe_fields(row: &RowInspection) -> String {
    let mut fields = Vec::new();
    if let Some(action) = row.action {
        fields.push(format!("action={}", action.as_str()));
    }
    if let Some(units) = row.units_delta {
        fields.push(format!("units={}", units));
    }
    if let Some(price) = row.price {
        fields.push(format!("price={}", price));
    }
    if let Some(rate) = row.commission_rate {
        fields.push(format!("rate={}", rate));
    }
    if let Some(id) = row.instruction_id {
        fields.push(format!("instruction={}", id));
    }
    if let Some(fund) = &row.fund_name {
        fields.push(format!("fund={}", fund));
    }
    fields.join(" ")
}
