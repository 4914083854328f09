//! Field extractors
//!
//! Positional parsing of comment text for rows whose category is already
//! known. Every extractor checks the category first and fails with a
//! text-pattern error when handed the wrong kind of row.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::category::RowCategory;
use super::fee::{Fee, FeeName};
use super::result::{Error, Result};
use super::row::ClassifiedRow;
use super::transaction::TradeAction;

/// Unsigned decimal, used for unit counts and prices
static UNSIGNED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid unsigned pattern"));
static RATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid rate pattern"));

/// Tokens of a trade row, checked for the `<units> @ <price>` tail
fn trade_tokens(row: &ClassifiedRow) -> Result<Vec<&str>> {
    row.require(RowCategory::BuyOrSell)?;
    let tokens = row.tokens();
    if tokens.len() < 3 || tokens[tokens.len() - 2] != "@" {
        return Err(Error::text_pattern(row.line, &row.comment, "missing '@' separator"));
    }
    Ok(tokens)
}

fn positive_decimal(row: &ClassifiedRow, text: &str, what: &str) -> Result<Decimal> {
    let value = Decimal::from_str(text).map_err(|_| {
        Error::text_pattern(row.line, &row.comment, format!("invalid {} {:?}", what, text))
    })?;
    if value <= Decimal::ZERO {
        return Err(Error::text_pattern(
            row.line,
            &row.comment,
            format!("{} must be positive, got {}", what, value),
        ));
    }
    Ok(value)
}

/// `Bought` → buy, `Sold` → sell
pub fn action(row: &ClassifiedRow) -> Result<TradeAction> {
    let tokens = trade_tokens(row)?;
    match tokens[0] {
        "Bought" => Ok(TradeAction::Buy),
        "Sold" => Ok(TradeAction::Sell),
        other => Err(Error::text_pattern(
            row.line,
            &row.comment,
            format!("unknown action word {:?}", other),
        )),
    }
}

/// Unit count: the token before `@`
pub fn units_delta(row: &ClassifiedRow) -> Result<Decimal> {
    let tokens = trade_tokens(row)?;
    let units = tokens[tokens.len() - 3];
    if !UNSIGNED_RE.is_match(units) {
        return Err(Error::text_pattern(
            row.line,
            &row.comment,
            format!("invalid unit count {:?}", units),
        ));
    }
    positive_decimal(row, units, "unit count")
}

/// Unit price: the token after `@`, thousands separators stripped
pub fn price(row: &ClassifiedRow) -> Result<Decimal> {
    let tokens = trade_tokens(row)?;
    let text = tokens[tokens.len() - 1];
    let price = text.replace(',', "");
    if !UNSIGNED_RE.is_match(&price) {
        return Err(Error::text_pattern(
            row.line,
            &row.comment,
            format!("invalid price {:?}", text),
        ));
    }
    positive_decimal(row, &price, "price")
}

/// Every token between the action word and the unit count
pub fn fund_name(row: &ClassifiedRow) -> Result<String> {
    let tokens = trade_tokens(row)?;
    let end = tokens.len().saturating_sub(3);
    match tokens.get(1..end) {
        Some(name) if !name.is_empty() => Ok(name.join(" ")),
        _ => Err(Error::text_pattern(row.line, &row.comment, "missing fund name")),
    }
}

/// Commission rate: the last token
pub fn broker_commission_rate(row: &ClassifiedRow) -> Result<Decimal> {
    row.require(RowCategory::BrokerCommission)?;
    let tokens = row.tokens();
    let rate = tokens.last().copied().unwrap_or_default();
    if !RATE_RE.is_match(rate) {
        return Err(Error::text_pattern(
            row.line,
            &row.comment,
            format!("invalid commission rate {:?}", rate),
        ));
    }
    Decimal::from_str(rate).map_err(|_| {
        Error::text_pattern(row.line, &row.comment, format!("invalid commission rate {:?}", rate))
    })
}

/// Fund name on a commission row: third token up to the second-to-last
pub fn broker_commission_fund_name(row: &ClassifiedRow) -> Result<String> {
    row.require(RowCategory::BrokerCommission)?;
    let tokens = row.tokens();
    let end = tokens.len().saturating_sub(2);
    match tokens.get(2..end) {
        Some(name) if !name.is_empty() => Ok(name.join(" ")),
        _ => Err(Error::text_pattern(row.line, &row.comment, "missing fund name")),
    }
}

/// Buying instruction id: the integer after the last `": "`
pub fn recurring_instruction_id(row: &ClassifiedRow) -> Result<u64> {
    row.require(RowCategory::RecurringRelease)?;
    let id = row.comment.rsplit(": ").next().unwrap_or_default().trim();
    id.parse().map_err(|_| {
        Error::text_pattern(
            row.line,
            &row.comment,
            format!("invalid buying instruction id {:?}", id),
        )
    })
}

/// Broker commission fee with its rate
pub fn broker_commission_fee(row: &ClassifiedRow) -> Result<Fee> {
    let rate = broker_commission_rate(row)?;
    Ok(Fee::percentage(FeeName::BrokerCommission, rate, row.amount))
}

/// Fixed fee rows carry nothing beyond their signed amount
pub fn fixed_fee(row: &ClassifiedRow, category: RowCategory) -> Result<Fee> {
    let name = match category {
        RowCategory::SettlementAndAdministration => FeeName::SettlementAndAdministration,
        RowCategory::InvestorProtectionLevy => FeeName::InvestorProtectionLevyAndAdministration,
        RowCategory::VatOnCosts => FeeName::VatOnCosts,
        RowCategory::RecurringInvestmentFee => FeeName::RecurringInvestmentFee,
        other => {
            return Err(Error::text_pattern(
                row.line,
                &row.comment,
                format!("{} is not a fixed fee", other),
            ))
        }
    };
    row.require(category)?;
    Ok(Fee::fixed(name, row.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fee::FeeKind;
    use crate::domain::row::RawRow;
    use chrono::NaiveDate;

    fn row(comment: &str, amount: Decimal) -> ClassifiedRow {
        let raw = RawRow::new(4, NaiveDate::from_ymd_opt(2021, 6, 1), comment, amount);
        ClassifiedRow::from_raw(raw).unwrap()
    }

    #[test]
    fn test_trade_fields_round_trip() {
        let trade = row("Bought 10 ACME FUND @ 10 @ 250.50", Decimal::new(-250500, 2));
        assert_eq!(action(&trade).unwrap(), TradeAction::Buy);
        assert_eq!(units_delta(&trade).unwrap(), Decimal::from_str("10").unwrap());
        assert_eq!(price(&trade).unwrap(), Decimal::from_str("250.50").unwrap());
        assert_eq!(fund_name(&trade).unwrap(), "10 ACME FUND @");
    }

    #[test]
    fn test_price_thousands_separator_is_stripped() {
        let trade = row("Sold Satrix 40 ETF 3.5 @ 1,234.56", Decimal::new(432096, 2));
        assert_eq!(action(&trade).unwrap(), TradeAction::Sell);
        assert_eq!(price(&trade).unwrap(), Decimal::from_str("1234.56").unwrap());
        assert_eq!(units_delta(&trade).unwrap(), Decimal::from_str("3.5").unwrap());
        assert_eq!(fund_name(&trade).unwrap(), "Satrix 40 ETF");
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let trade = row("Bought ACME abc @ 10.00", Decimal::ONE);
        assert!(matches!(units_delta(&trade), Err(Error::TextPattern { .. })));

        let trade = row("Bought ACME 1 @ ten", Decimal::ONE);
        assert!(matches!(price(&trade), Err(Error::TextPattern { .. })));

        let trade = row("Bought ACME 0 @ 10.00", Decimal::ONE);
        assert!(matches!(units_delta(&trade), Err(Error::TextPattern { .. })));

        let trade = row("Bought ACME 1 @ 1,2.3.4", Decimal::ONE);
        assert!(price(&trade).is_err());
    }

    #[test]
    fn test_every_comma_in_price_is_stripped() {
        let trade = row("Bought ACME 1 @ 12,34.00", Decimal::ONE);
        assert_eq!(price(&trade).unwrap(), Decimal::new(123400, 2));

        let trade = row("Sold ACME 1 @ 1,234,567.5", Decimal::ONE);
        assert_eq!(price(&trade).unwrap(), Decimal::new(12345675, 1));
    }

    #[test]
    fn test_missing_fund_name() {
        let trade = row("Bought 1 @ 10", Decimal::ONE);
        assert!(fund_name(&trade).is_err());
        assert_eq!(units_delta(&trade).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_extractors_reject_wrong_category() {
        let vat = row("Value Added Tax on costs (VAT)", Decimal::new(-12, 2));
        assert!(matches!(action(&vat), Err(Error::TextPattern { .. })));
        assert!(broker_commission_rate(&vat).is_err());
        assert!(recurring_instruction_id(&vat).is_err());
        assert!(fixed_fee(&vat, RowCategory::SettlementAndAdministration).is_err());
    }

    #[test]
    fn test_broker_commission_fields() {
        let commission = row("Broker Commission Satrix 40 ETF @ 0.25", Decimal::new(-1050, 2));
        assert_eq!(
            broker_commission_rate(&commission).unwrap(),
            Decimal::from_str("0.25").unwrap()
        );
        assert_eq!(broker_commission_fund_name(&commission).unwrap(), "Satrix 40 ETF");

        let fee = broker_commission_fee(&commission).unwrap();
        assert_eq!(fee.name, FeeName::BrokerCommission);
        assert_eq!(fee.kind, FeeKind::Percentage);
        assert_eq!(fee.amount, Decimal::new(-1050, 2));
    }

    #[test]
    fn test_broker_commission_rate_must_be_numeric() {
        let commission = row("Broker Commission Satrix 40 ETF @ n/a", Decimal::ONE);
        assert!(broker_commission_rate(&commission).is_err());
    }

    #[test]
    fn test_recurring_instruction_id() {
        let release = row(
            "RELEASE Reserved funds for Buying Instruction: 48213",
            Decimal::new(50000, 2),
        );
        assert_eq!(recurring_instruction_id(&release).unwrap(), 48213);

        let release = row("RELEASE Reserved funds for Buying Instruction: n/a", Decimal::ONE);
        assert!(recurring_instruction_id(&release).is_err());
    }

    #[test]
    fn test_fixed_fee_takes_signed_amount() {
        let levy = row(
            "Investor protection levy (IPL) and administration",
            Decimal::new(-3, 2),
        );
        let fee = fixed_fee(&levy, RowCategory::InvestorProtectionLevy).unwrap();
        assert_eq!(fee.name, FeeName::InvestorProtectionLevyAndAdministration);
        assert_eq!(fee.kind, FeeKind::Fixed);
        assert_eq!(fee.amount, Decimal::new(-3, 2));
        assert!(fee.rate.is_none());
    }
}
