//! Integration tests for eehistory-core
//!
//! These tests run full parses through the public API: in-memory rows for
//! the assembly rules and temporary CSV files for the file path.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use eehistory_core::adapters::csv::CsvRowSource;
use eehistory_core::adapters::memory::InMemoryRowSource;
use eehistory_core::config::Config;
use eehistory_core::domain::{classify, extract, ClassifiedRow, RawRow};
use eehistory_core::{
    parse_file, Error, FeeName, HistoryService, LogEvent, LoggingService, OperationResult,
    ParseOptions, ParsedHistory, TradeAction, TransactionRecord,
};

// ============================================================================
// Test Helpers
// ============================================================================

const RELEASE: &str = "RELEASE Reserved funds for Buying Instruction: 48213";
const RECURRING_FEE: &str = "Recurring Investment Fee";
const COMMISSION: &str = "Broker Commission ACME FUND @ 0.25";
const SETTLEMENT: &str = "Settlement and administration";
const LEVY: &str = "Investor protection levy (IPL) and administration";
const VAT: &str = "Value Added Tax on costs (VAT)";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Amount in cents, e.g. -1234 = -12.34
fn cents(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

/// Push the four trade fee rows in export order
fn push_fee_tail(source: &mut InMemoryRowSource, d: NaiveDate) {
    source
        .push(Some(d), COMMISSION, cents(-25))
        .push(Some(d), SETTLEMENT, cents(-10))
        .push(Some(d), LEVY, cents(-1))
        .push(Some(d), VAT, cents(-5));
}

fn parse(source: &InMemoryRowSource) -> Result<Vec<TransactionRecord>, Error> {
    HistoryService::default().parse(source).map(|parsed| parsed.records)
}

fn fee_names(record: &TransactionRecord) -> Vec<FeeName> {
    record.fees().iter().map(|fee| fee.name).collect()
}

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Group Templates
// ============================================================================

/// A simple trade keeps the raw amount and carries exactly the four trade fees
#[test]
fn test_simple_trade_group() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source.push(Some(d), "Sold ACME FUND 3 @ 1,234.56", cents(370368));
    push_fee_tail(&mut source, d);

    let records = parse(&source).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert!(!record.is_recurring());
    assert_eq!(record.action_type(), None);

    let trade = record.trade();
    assert_eq!(trade.date, d);
    assert_eq!(trade.action, TradeAction::Sell);
    assert_eq!(trade.units_delta, Decimal::new(3, 0));
    assert_eq!(trade.price, Decimal::new(123456, 2));
    assert_eq!(trade.fund_name, "ACME FUND");
    assert_eq!(trade.net_amount, cents(370368));

    assert_eq!(
        fee_names(record),
        vec![
            FeeName::BrokerCommission,
            FeeName::SettlementAndAdministration,
            FeeName::InvestorProtectionLevyAndAdministration,
            FeeName::VatOnCosts,
        ]
    );
    assert_eq!(record.fees()[0].rate, Some(Decimal::new(25, 2)));
    assert_eq!(record.total_fees(), cents(-41));
}

/// Post-cutoff recurring purchases carry the recurring fee as their fifth, last fee
#[test]
fn test_post_cutoff_recurring_group() {
    let d = date(2019, 6, 1);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-50000))
        .push(Some(d), "Bought ACME FUND 2 @ 250.00", cents(-50000))
        .push(Some(d), RECURRING_FEE, cents(-150));
    push_fee_tail(&mut source, d);

    let records = parse(&source).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.action_type(), Some("recurring"));
    assert_eq!(record.instruction_id(), Some(48213));
    assert_eq!(record.fees().len(), 5);
    assert_eq!(record.fees()[4].name, FeeName::RecurringInvestmentFee);
    assert_eq!(record.fees()[4].amount, cents(-150));
}

/// Pre-cutoff recurring purchases have no recurring fee row
#[test]
fn test_pre_cutoff_recurring_group() {
    let d = date(2017, 11, 20);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-50000))
        .push(Some(d), "Bought ACME FUND 2 @ 250.00", cents(-50000));
    push_fee_tail(&mut source, d);

    let records = parse(&source).unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], TransactionRecord::RecurringPreCutoff { .. }));
    assert_eq!(records[0].action_type(), Some("recurring"));
    assert_eq!(records[0].fees().len(), 4);
}

/// The cutoff date itself is post-cutoff, the day before is pre-cutoff
#[test]
fn test_era_boundary() {
    let cutoff = date(2018, 1, 1);

    let mut on_cutoff = InMemoryRowSource::new();
    on_cutoff
        .push(Some(cutoff), RELEASE, cents(-100))
        .push(Some(cutoff), "Bought ACME FUND 1 @ 1.00", cents(-100))
        .push(Some(cutoff), RECURRING_FEE, cents(-1));
    push_fee_tail(&mut on_cutoff, cutoff);
    let records = parse(&on_cutoff).unwrap();
    assert!(matches!(records[0], TransactionRecord::RecurringPostCutoff { .. }));

    let before = date(2017, 12, 31);
    let mut day_before = InMemoryRowSource::new();
    day_before
        .push(Some(before), RELEASE, cents(-100))
        .push(Some(before), "Bought ACME FUND 1 @ 1.00", cents(-100));
    push_fee_tail(&mut day_before, before);
    let records = parse(&day_before).unwrap();
    assert!(matches!(records[0], TransactionRecord::RecurringPreCutoff { .. }));
}

/// A configured cutoff moves the era boundary
#[test]
fn test_custom_cutoff_date() {
    let d = date(2019, 6, 1);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-100))
        .push(Some(d), "Bought ACME FUND 1 @ 1.00", cents(-100));
    push_fee_tail(&mut source, d);

    let service = HistoryService::new(ParseOptions {
        cutoff_date: date(2020, 1, 1),
    });
    let parsed = service.parse(&source).unwrap();
    assert!(matches!(parsed.records[0], TransactionRecord::RecurringPreCutoff { .. }));
}

/// The reference scenario: release, trade, recurring fee and four fees on 2019-01-01
#[test]
fn test_end_to_end_recurring_scenario() {
    let d = date(2019, 1, 1);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-10000))
        .push(Some(d), "Bought 1 FUND @ 1 @ 100.0", cents(10000))
        .push(Some(d), RECURRING_FEE, cents(-100))
        .push(Some(d), "Broker Commission FUND @ 0.5", cents(-50))
        .push(Some(d), SETTLEMENT, cents(-10))
        .push(Some(d), LEVY, cents(-1))
        .push(Some(d), VAT, cents(-8));

    let records = parse(&source).unwrap();
    assert_eq!(records.len(), 1);

    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["action_type"], "recurring");
    assert_eq!(json["date"], "2019-01-01");
    assert_eq!(json["net_amount"], "100.00");

    let fees = json["fees"].as_array().unwrap();
    assert_eq!(fees.len(), 5);
    assert_eq!(fees[0]["name"], "broker_commission");
    assert_eq!(fees[0]["type"], "percentage");
    assert_eq!(fees[4]["name"], "recurring_investment_fee");
    assert_eq!(fees[4]["type"], "fixed");
}

/// Groups come out in export order with unrelated rows skipped in between
#[test]
fn test_multiple_groups_and_skipped_rows() {
    let first = date(2019, 2, 1);
    let second = date(2019, 2, 8);
    let mut source = InMemoryRowSource::new();
    source.push(Some(first), "Deposit", cents(100000));
    source.push(Some(first), "Bought ACME FUND 1 @ 10.00", cents(-1000));
    push_fee_tail(&mut source, first);
    source
        .push(Some(second), "Dividend ACME FUND", cents(12))
        .push(None, "", Decimal::ZERO)
        .push(Some(second), "Sold ACME FUND 1 @ 12.00", cents(1200));
    push_fee_tail(&mut source, second);

    let parsed = HistoryService::default().parse(&source).unwrap();
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.records[0].trade().action, TradeAction::Buy);
    assert_eq!(parsed.records[1].trade().action, TradeAction::Sell);

    assert_eq!(parsed.report.rows_read, 13);
    assert_eq!(parsed.report.empty_rows, 1);
    assert_eq!(parsed.report.skipped_lines, vec![2, 8]);
    assert_eq!(parsed.report.records, 2);
}

// ============================================================================
// Fatal Conditions
// ============================================================================

/// One fee row on another day aborts the parse without emitting anything
#[test]
fn test_date_mismatch_is_fatal() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), "Bought ACME FUND 1 @ 10.00", cents(-1000))
        .push(Some(d), COMMISSION, cents(-25))
        .push(Some(d), SETTLEMENT, cents(-10))
        .push(Some(date(2020, 3, 5)), LEVY, cents(-1))
        .push(Some(d), VAT, cents(-5));

    let err = parse(&source).unwrap_err();
    assert_eq!(err.kind(), "date_consistency");
    match err {
        Error::DateMismatch { start_line, line, .. } => {
            assert_eq!(start_line, 2);
            assert_eq!(line, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A release on one day followed by the rest of its group on the next
#[test]
fn test_recurring_release_on_another_day_is_fatal() {
    let release_day = date(2019, 1, 1);
    let d = date(2019, 1, 2);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(release_day), RELEASE, cents(-1000))
        .push(Some(d), "Bought ACME FUND 1 @ 10.00", cents(-1000))
        .push(Some(d), RECURRING_FEE, cents(-100));
    push_fee_tail(&mut source, d);

    let err = parse(&source).unwrap_err();
    assert_eq!(err.kind(), "date_consistency");
    assert!(matches!(
        err,
        Error::DateMismatch { start_line: 2, line: 3, expected, found }
            if expected == release_day && found == d
    ));
}

#[test]
fn test_recurring_fee_on_another_day_is_fatal() {
    let d = date(2019, 1, 1);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-1000))
        .push(Some(d), "Bought ACME FUND 1 @ 10.00", cents(-1000))
        .push(Some(date(2019, 1, 2)), RECURRING_FEE, cents(-100));
    push_fee_tail(&mut source, d);

    assert!(matches!(
        parse(&source),
        Err(Error::DateMismatch { start_line: 2, line: 4, .. })
    ));
}

#[test]
fn test_header_mismatch_is_fatal() {
    let source = InMemoryRowSource::new().with_header(&["Date", "Description", "Amount"]);
    let err = parse(&source).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch { .. }));
    assert_eq!(err.kind(), "schema");
}

#[test]
fn test_running_out_of_rows_mid_group_is_fatal() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), "Bought ACME FUND 1 @ 10.00", cents(-1000))
        .push(Some(d), COMMISSION, cents(-25))
        .push(Some(d), SETTLEMENT, cents(-10));

    let err = parse(&source).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEnd { start_line: 2, .. }));
}

#[test]
fn test_fee_rows_out_of_order_are_fatal() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), "Bought ACME FUND 1 @ 10.00", cents(-1000))
        .push(Some(d), SETTLEMENT, cents(-10))
        .push(Some(d), COMMISSION, cents(-25))
        .push(Some(d), LEVY, cents(-1))
        .push(Some(d), VAT, cents(-5));

    let err = parse(&source).unwrap_err();
    assert!(matches!(err, Error::UnexpectedRow { line: 3, .. }));
    assert!(err.to_string().contains("3"));
}

/// A post-cutoff release must be followed by its recurring fee row
#[test]
fn test_missing_recurring_fee_after_cutoff_is_fatal() {
    let d = date(2019, 1, 1);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), RELEASE, cents(-100))
        .push(Some(d), "Bought ACME FUND 1 @ 1.00", cents(-100));
    push_fee_tail(&mut source, d);

    assert!(matches!(parse(&source), Err(Error::UnexpectedRow { line: 4, .. })));
}

/// A failed parse leaves only the row and category in the event log
#[test]
fn test_failed_parse_log_omits_comment_text() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source.push(Some(d), "Bought Secret Fund Name 1 @ ten", cents(-1000));
    push_fee_tail(&mut source, d);

    let err = parse(&source).unwrap_err();
    assert!(err.to_string().contains("Secret Fund Name"));

    let dir = TempDir::new().unwrap();
    let logger = LoggingService::new(dir.path(), "test").unwrap();
    logger
        .log(LogEvent::parse_failed(&err).with_command("parse"))
        .unwrap();

    let errors = logger.get_errors(10).unwrap();
    assert_eq!(errors.len(), 1);
    let entry = &errors[0];
    let message = entry.error_message.as_deref().unwrap_or_default();
    assert!(message.contains("Row 2"));
    for field in [&entry.error_message, &entry.error_details, &entry.details] {
        let text = field.as_deref().unwrap_or_default();
        assert!(!text.contains("Secret Fund Name"), "leaked: {text}");
        assert!(!text.contains("ten"), "leaked: {text}");
    }
}

/// An unusable price inside a group is a text-pattern failure
#[test]
fn test_bad_price_is_text_pattern_error() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source.push(Some(d), "Bought ACME FUND 1 @ 1O.00", cents(-1000));
    push_fee_tail(&mut source, d);

    let err = parse(&source).unwrap_err();
    assert_eq!(err.kind(), "text_pattern");
}

// ============================================================================
// Rows and Extraction
// ============================================================================

#[test]
fn test_trade_comment_without_separator_is_not_a_trade() {
    assert_eq!(classify("Bought ACME FUND 10 250.50"), None);

    let mut source = InMemoryRowSource::new();
    source.push(Some(date(2020, 1, 1)), "Bought ACME FUND 10 250.50", cents(-1));
    let parsed = HistoryService::default().parse(&source).unwrap();
    assert!(parsed.records.is_empty());
    assert_eq!(parsed.report.skipped_lines, vec![2]);
}

#[test]
fn test_extraction_round_trip() {
    let row = |comment: &str| {
        ClassifiedRow::from_raw(RawRow::new(2, Some(date(2020, 1, 1)), comment, cents(-1)))
            .unwrap()
    };

    let trade = row("Bought 10 ACME FUND @ 10 @ 250.50");
    assert_eq!(extract::action(&trade).unwrap(), TradeAction::Buy);
    assert_eq!(extract::units_delta(&trade).unwrap(), Decimal::new(10, 0));
    assert_eq!(extract::price(&trade).unwrap(), Decimal::new(25050, 2));

    let separated = row("Sold ACME FUND 2 @ 1,234.56");
    assert_eq!(extract::price(&separated).unwrap(), Decimal::new(123456, 2));
    assert_eq!(extract::fund_name(&separated).unwrap(), "ACME FUND");
}

/// Non-breaking spaces in exported comments classify like plain spaces
#[test]
fn test_non_breaking_spaces_are_normalized() {
    let d = date(2020, 3, 4);
    let mut source = InMemoryRowSource::new();
    source
        .push(Some(d), "Bought\u{a0}ACME\u{a0}FUND 1\u{a0}@\u{a0}10.00", cents(-1000))
        .push(Some(d), "Broker\u{a0}Commission ACME FUND @ 0.25", cents(-25))
        .push(Some(d), "Settlement\u{a0}and administration", cents(-10))
        .push(Some(d), LEVY, cents(-1))
        .push(Some(d), "Value Added Tax on\u{a0}costs (VAT)", cents(-5));

    let records = parse(&source).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].trade().fund_name, "ACME FUND");
}

// ============================================================================
// CSV Exports
// ============================================================================

const CSV_EXPORT: &str = "\
Date,Comment,Debit/Credit
2019-01-01,RELEASE Reserved funds for Buying Instruction: 7,-100.00
,,
2019-01-01,Bought ACME FUND 1 @ 100.00,-100.00
2019-01-01,Recurring Investment Fee,-1.00
2019-01-01,Broker Commission ACME FUND @ 0.25,-0.25
2019-01-01,Settlement and administration,-0.10
2019-01-01,Investor protection levy (IPL) and administration,-0.01
2019-01-01,Value Added Tax on costs (VAT),-0.05
2019-01-02,Deposit,\"1,000.00\"
";

#[test]
fn test_csv_export_feeds_the_same_engine() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "history.csv", CSV_EXPORT);

    let parsed = HistoryService::default()
        .parse(&CsvRowSource::new(&path))
        .unwrap();

    assert_eq!(parsed.report.source, "csv");
    assert_eq!(parsed.report.rows_read, 9);
    assert_eq!(parsed.report.empty_rows, 1);
    assert_eq!(parsed.report.skipped_lines, vec![10]);
    assert_eq!(parsed.records.len(), 1);

    let record = &parsed.records[0];
    assert_eq!(record.instruction_id(), Some(7));
    assert_eq!(record.fees().len(), 5);
    assert_eq!(record.fees()[4].name, FeeName::RecurringInvestmentFee);
}

#[test]
fn test_parse_file_picks_adapter_from_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "history.csv", CSV_EXPORT);

    let parsed = parse_file(&path, &Config::default()).unwrap();
    assert_eq!(parsed.records.len(), 1);

    let unsupported = write_csv(&dir, "history.txt", CSV_EXPORT);
    assert!(matches!(
        parse_file(&unsupported, &Config::default()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_csv_with_invalid_amount_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "history.csv",
        "Date,Comment,Debit/Credit\n2019-01-01,Deposit,lots\n",
    );

    let err = HistoryService::default()
        .parse(&CsvRowSource::new(&path))
        .unwrap_err();
    assert_eq!(err.kind(), "schema");
}

#[test]
fn test_failed_parse_as_operation_result() {
    let mut source = InMemoryRowSource::new();
    source.push(Some(date(2020, 1, 1)), "Bought ACME FUND 1 @ 10.00", cents(-1000));

    let result: OperationResult<ParsedHistory> = HistoryService::default().parse(&source).into();
    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.context.unwrap()["kind"], "schema");
}
