//! Row classification by comment text

use std::fmt;

use serde::{Deserialize, Serialize};

const RECURRING_RELEASE_MARKER: &str = "RELEASE Reserved funds for Buying Instruction:";
const RECURRING_INVESTMENT_FEE_MARKER: &str = "Recurring Investment Fee";
const INVESTOR_PROTECTION_LEVY_MARKER: &str = "Investor protection levy (IPL) and administration";
const BROKER_COMMISSION_MARKER: &str = "Broker Commission";
const SETTLEMENT_MARKER: &str = "Settlement and administration";
const VAT_MARKER: &str = "Value Added Tax on costs (VAT)";

/// Closed set of row categories the assembler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCategory {
    RecurringRelease,
    BuyOrSell,
    RecurringInvestmentFee,
    InvestorProtectionLevy,
    BrokerCommission,
    SettlementAndAdministration,
    VatOnCosts,
}

impl RowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::RecurringRelease => "recurring-release",
            RowCategory::BuyOrSell => "buy-or-sell",
            RowCategory::RecurringInvestmentFee => "recurring-investment-fee",
            RowCategory::InvestorProtectionLevy => "investor-protection-levy",
            RowCategory::BrokerCommission => "broker-commission",
            RowCategory::SettlementAndAdministration => "settlement-and-administration",
            RowCategory::VatOnCosts => "vat-on-costs",
        }
    }
}

impl fmt::Display for RowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a normalized comment. First match wins, in catalog order.
pub fn classify(comment: &str) -> Option<RowCategory> {
    if comment.contains(RECURRING_RELEASE_MARKER) {
        Some(RowCategory::RecurringRelease)
    } else if is_buy_or_sell(comment) {
        Some(RowCategory::BuyOrSell)
    } else if comment.contains(RECURRING_INVESTMENT_FEE_MARKER) {
        Some(RowCategory::RecurringInvestmentFee)
    } else if comment.contains(INVESTOR_PROTECTION_LEVY_MARKER) {
        Some(RowCategory::InvestorProtectionLevy)
    } else if comment.contains(BROKER_COMMISSION_MARKER) {
        Some(RowCategory::BrokerCommission)
    } else if comment.contains(SETTLEMENT_MARKER) {
        Some(RowCategory::SettlementAndAdministration)
    } else if comment.contains(VAT_MARKER) {
        Some(RowCategory::VatOnCosts)
    } else {
        None
    }
}

/// `Bought|Sold ... <units> @ <price>`
fn is_buy_or_sell(comment: &str) -> bool {
    let tokens: Vec<&str> = comment.split_whitespace().collect();
    let has_action = matches!(tokens.first(), Some(&"Bought") | Some(&"Sold"));
    let has_separator = tokens.len() > 2 && tokens[tokens.len() - 2] == "@";
    has_action && has_separator
}
