//! Fee catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed catalog of fee line items charged alongside a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeName {
    BrokerCommission,
    SettlementAndAdministration,
    InvestorProtectionLevyAndAdministration,
    VatOnCosts,
    RecurringInvestmentFee,
}

impl FeeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeName::BrokerCommission => "broker_commission",
            FeeName::SettlementAndAdministration => "settlement_and_administration",
            FeeName::InvestorProtectionLevyAndAdministration => {
                "investor_protection_levy_and_administration"
            }
            FeeName::VatOnCosts => "vat_on_costs",
            FeeName::RecurringInvestmentFee => "recurring_investment_fee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    Fixed,
    Percentage,
}

/// A fee line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub name: FeeName,
    #[serde(rename = "type")]
    pub kind: FeeKind,
    /// Signed amount as it appears in the export
    pub amount: Decimal,
    /// Only set for percentage fees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
}

impl Fee {
    pub fn fixed(name: FeeName, amount: Decimal) -> Self {
        Self {
            name,
            kind: FeeKind::Fixed,
            amount,
            rate: None,
        }
    }

    pub fn percentage(name: FeeName, rate: Decimal, amount: Decimal) -> Self {
        Self {
            name,
            kind: FeeKind::Percentage,
            amount,
            rate: Some(rate),
        }
    }
}

/// The four fees every trade carries, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFees {
    pub broker_commission: Fee,
    pub settlement_and_administration: Fee,
    pub investor_protection_levy: Fee,
    pub vat_on_costs: Fee,
}

impl TradeFees {
    pub fn iter(&self) -> impl Iterator<Item = &Fee> {
        [
            &self.broker_commission,
            &self.settlement_and_administration,
            &self.investor_protection_levy,
            &self.vat_on_costs,
        ]
        .into_iter()
    }
}
