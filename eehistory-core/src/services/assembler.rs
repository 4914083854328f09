//! Transaction assembler - groups classified rows into records
//!
//! The assembler scans for a group start (a recurring release row or a trade
//! row), then pulls the fixed tail of rows the detected template needs.
//! Every pulled row must have the expected category and the group's date.

use chrono::NaiveDate;

use crate::domain::extract;
use crate::domain::result::{Error, Result};
use crate::domain::{
    ClassifiedRow, RowCategory, SchemaEra, Trade, TradeFees, TransactionRecord,
};

/// Fee rows that follow every trade, in export order
const TRADE_FEE_TAIL: [RowCategory; 4] = [
    RowCategory::BrokerCommission,
    RowCategory::SettlementAndAdministration,
    RowCategory::InvestorProtectionLevy,
    RowCategory::VatOnCosts,
];

/// Forward-only cursor over classified rows
pub struct RowCursor<I: Iterator<Item = ClassifiedRow>> {
    rows: I,
    consumed: usize,
}

impl<I: Iterator<Item = ClassifiedRow>> RowCursor<I> {
    pub fn new(rows: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            rows: rows.into_iter(),
            consumed: 0,
        }
    }

    /// Take the next row, if any
    pub fn advance(&mut self) -> Option<ClassifiedRow> {
        let row = self.rows.next()?;
        self.consumed += 1;
        Some(row)
    }

    /// Rows taken so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Outcome of one scanning step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A complete group was consumed
    Record(TransactionRecord),
    /// The row at this line opened no group and was discarded
    Skipped(usize),
    /// The stream is exhausted
    End,
}

/// Row templates a group can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    Trade,
    Recurring(SchemaEra),
}

impl Template {
    fn name(&self) -> &'static str {
        match self {
            Template::Trade => "trade",
            Template::Recurring(SchemaEra::PreCutoff) => "pre-cutoff recurring purchase",
            Template::Recurring(SchemaEra::PostCutoff) => "post-cutoff recurring purchase",
        }
    }
}

/// Rows of one group being collected
struct Group<'c, I: Iterator<Item = ClassifiedRow>> {
    cursor: &'c mut RowCursor<I>,
    template: Template,
    start_line: usize,
    rows: Vec<ClassifiedRow>,
}

impl<'c, I: Iterator<Item = ClassifiedRow>> Group<'c, I> {
    fn start(cursor: &'c mut RowCursor<I>, template: Template, first: ClassifiedRow) -> Self {
        Self {
            cursor,
            template,
            start_line: first.line,
            rows: vec![first],
        }
    }

    /// Pull the next row, which must be of `expected`
    fn pull(&mut self, expected: RowCategory) -> Result<ClassifiedRow> {
        let row = self.cursor.advance().ok_or(Error::UnexpectedEnd {
            start_line: self.start_line,
            template: self.template.name(),
            expected,
        })?;

        if !row.is(expected) {
            return Err(Error::UnexpectedRow {
                line: row.line,
                expected,
                found: row.category_name(),
            });
        }

        self.rows.push(row.clone());
        Ok(row)
    }

    /// Every row of the group must share the first row's date
    fn check_dates(&self) -> Result<NaiveDate> {
        let expected = self.rows[0].date;
        match self.rows.iter().find(|row| row.date != expected) {
            Some(row) => Err(Error::DateMismatch {
                start_line: self.start_line,
                line: row.line,
                expected,
                found: row.date,
            }),
            None => Ok(expected),
        }
    }
}

/// Groups classified rows into transaction records
#[derive(Debug, Clone)]
pub struct Assembler {
    cutoff_date: NaiveDate,
}

impl Assembler {
    pub fn new(cutoff_date: NaiveDate) -> Self {
        Self { cutoff_date }
    }

    pub fn cutoff_date(&self) -> NaiveDate {
        self.cutoff_date
    }

    /// Run the scanning state once: consume one group or discard one row
    pub fn step<I: Iterator<Item = ClassifiedRow>>(
        &self,
        cursor: &mut RowCursor<I>,
    ) -> Result<Step> {
        let Some(row) = cursor.advance() else {
            return Ok(Step::End);
        };

        match row.category {
            Some(RowCategory::RecurringRelease) => self.recurring(cursor, row).map(Step::Record),
            Some(RowCategory::BuyOrSell) => {
                let mut group = Group::start(cursor, Template::Trade, row.clone());
                let fees = pull_trade_fees(&mut group)?;
                group.check_dates()?;
                Ok(Step::Record(TransactionRecord::Trade(build_trade(&row, fees)?)))
            }
            _ => Ok(Step::Skipped(row.line)),
        }
    }

    fn recurring<I: Iterator<Item = ClassifiedRow>>(
        &self,
        cursor: &mut RowCursor<I>,
        release: ClassifiedRow,
    ) -> Result<TransactionRecord> {
        let era = SchemaEra::for_date(release.date, self.cutoff_date);
        let instruction_id = extract::recurring_instruction_id(&release).ok();

        let mut group = Group::start(cursor, Template::Recurring(era), release);
        let trade_row = group.pull(RowCategory::BuyOrSell)?;
        let recurring_fee_row = match era {
            SchemaEra::PostCutoff => Some(group.pull(RowCategory::RecurringInvestmentFee)?),
            SchemaEra::PreCutoff => None,
        };
        let fees = pull_trade_fees(&mut group)?;
        group.check_dates()?;

        let trade = build_trade(&trade_row, fees)?;
        match recurring_fee_row {
            Some(fee_row) => Ok(TransactionRecord::RecurringPostCutoff {
                instruction_id,
                trade,
                recurring_fee: extract::fixed_fee(
                    &fee_row,
                    RowCategory::RecurringInvestmentFee,
                )?,
            }),
            None => Ok(TransactionRecord::RecurringPreCutoff {
                instruction_id,
                trade,
            }),
        }
    }
}

/// Commission, settlement, levy and VAT rows, in that order
fn pull_trade_fees<I: Iterator<Item = ClassifiedRow>>(
    group: &mut Group<'_, I>,
) -> Result<[ClassifiedRow; 4]> {
    let [commission, settlement, levy, vat] = TRADE_FEE_TAIL;
    Ok([
        group.pull(commission)?,
        group.pull(settlement)?,
        group.pull(levy)?,
        group.pull(vat)?,
    ])
}

fn build_trade(trade_row: &ClassifiedRow, fee_rows: [ClassifiedRow; 4]) -> Result<Trade> {
    let [commission, settlement, levy, vat] = fee_rows;
    let fees = TradeFees {
        broker_commission: extract::broker_commission_fee(&commission)?,
        settlement_and_administration: extract::fixed_fee(
            &settlement,
            RowCategory::SettlementAndAdministration,
        )?,
        investor_protection_levy: extract::fixed_fee(&levy, RowCategory::InvestorProtectionLevy)?,
        vat_on_costs: extract::fixed_fee(&vat, RowCategory::VatOnCosts)?,
    };

    Ok(Trade {
        date: trade_row.date,
        action: extract::action(trade_row)?,
        units_delta: extract::units_delta(trade_row)?,
        price: extract::price(trade_row)?,
        fund_name: extract::fund_name(trade_row)?,
        net_amount: trade_row.amount,
        fees,
    })
}
