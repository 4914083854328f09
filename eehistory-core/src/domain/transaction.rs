//! Reconstructed transaction records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::fee::{Fee, TradeFees};

/// Boundary between the two export schema eras
pub const SCHEMA_CUTOFF_DATE: (i32, u32, u32) = (2018, 1, 1);

/// Default cutoff as a date
pub fn default_cutoff_date() -> NaiveDate {
    let (y, m, d) = SCHEMA_CUTOFF_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

/// Which row template a recurring purchase was exported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaEra {
    /// No explicit recurring investment fee row
    PreCutoff,
    /// Recurring investment fee row after the trade row
    PostCutoff,
}

impl SchemaEra {
    /// The cutoff itself belongs to the post-cutoff era
    pub fn for_date(date: NaiveDate, cutoff: NaiveDate) -> Self {
        if date >= cutoff {
            SchemaEra::PostCutoff
        } else {
            SchemaEra::PreCutoff
        }
    }
}

/// A single buy or sell and the fees charged with it
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    /// Always positive, direction is carried by `action`
    pub units_delta: Decimal,
    /// Always positive
    pub price: Decimal,
    pub fund_name: String,
    /// Signed amount of the trade row
    pub net_amount: Decimal,
    pub fees: TradeFees,
}

/// One reconstructed transaction group
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionRecord {
    /// Trade row followed by its four fee rows
    Trade(Trade),
    /// Recurring purchase exported before the cutoff
    RecurringPreCutoff {
        instruction_id: Option<u64>,
        trade: Trade,
    },
    /// Recurring purchase exported on or after the cutoff
    RecurringPostCutoff {
        instruction_id: Option<u64>,
        trade: Trade,
        recurring_fee: Fee,
    },
}

impl TransactionRecord {
    pub fn trade(&self) -> &Trade {
        match self {
            TransactionRecord::Trade(trade)
            | TransactionRecord::RecurringPreCutoff { trade, .. }
            | TransactionRecord::RecurringPostCutoff { trade, .. } => trade,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, TransactionRecord::Trade(_))
    }

    /// `"recurring"` for recurring purchases
    pub fn action_type(&self) -> Option<&'static str> {
        self.is_recurring().then_some("recurring")
    }

    pub fn instruction_id(&self) -> Option<u64> {
        match self {
            TransactionRecord::Trade(_) => None,
            TransactionRecord::RecurringPreCutoff { instruction_id, .. }
            | TransactionRecord::RecurringPostCutoff { instruction_id, .. } => *instruction_id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.trade().date
    }

    /// Fees in catalog order, recurring investment fee last
    pub fn fees(&self) -> Vec<&Fee> {
        let mut fees: Vec<&Fee> = self.trade().fees.iter().collect();
        if let TransactionRecord::RecurringPostCutoff { recurring_fee, .. } = self {
            fees.push(recurring_fee);
        }
        fees
    }

    pub fn total_fees(&self) -> Decimal {
        self.fees().iter().map(|fee| fee.amount).sum()
    }
}

/// Flat serialized shape shared by all record variants
#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    action_type: Option<&'static str>,
    date: NaiveDate,
    action: TradeAction,
    units_delta: Decimal,
    price: Decimal,
    fund_name: &'a str,
    net_amount: Decimal,
    fees: Vec<&'a Fee>,
}

impl Serialize for TransactionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let trade = self.trade();
        RecordView {
            action_type: self.action_type(),
            date: trade.date,
            action: trade.action,
            units_delta: trade.units_delta,
            price: trade.price,
            fund_name: &trade.fund_name,
            net_amount: trade.net_amount,
            fees: self.fees(),
        }
        .serialize(serializer)
    }
}
