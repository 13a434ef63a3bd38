use crate::lenders::LogicalField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_LOAN_TERM_MONTHS: u32 = 12;
pub const DEFAULT_GEOGRAPHY: &str = "England";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Purchase,
    Refinance,
}

impl TransactionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Purchase => "Purchase",
            Self::Refinance => "Refinance",
        }
    }
}

/// Whether the loan is stated directly or derived from the available deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Loan,
    Deposit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Residential,
    SemiCommercial,
    Commercial,
    LandWithPp,
    LandNoPp,
}

impl PropertyType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Residential,
            Self::SemiCommercial,
            Self::Commercial,
            Self::LandWithPp,
            Self::LandNoPp,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::SemiCommercial => "semi_commercial",
            Self::Commercial => "commercial",
            Self::LandWithPp => "land_with_pp",
            Self::LandNoPp => "land_no_pp",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::SemiCommercial => "Semi-Commercial / Mixed Use",
            Self::Commercial => "Fully Commercial",
            Self::LandWithPp => "Land (With Planning)",
            Self::LandNoPp => "Land (Without Planning)",
        }
    }
}

/// Seniority of the security taken over the subject property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargePosition {
    #[default]
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd_supporting")]
    SecondSupporting,
    #[serde(rename = "2nd_standalone")]
    SecondStandalone,
    #[serde(rename = "equitable")]
    Equitable,
}

impl ChargePosition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "1st charge",
            Self::SecondSupporting => "Supporting 2nd charge",
            Self::SecondStandalone => "Standalone 2nd charge",
            Self::Equitable => "Equitable charge",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[default]
    Individual,
    LtdSpv,
    LtdTrading,
    Llp,
    Trust,
    SippSsas,
    Charity,
    Overseas,
}

impl EntityType {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Individual,
            Self::LtdSpv,
            Self::LtdTrading,
            Self::Llp,
            Self::Trust,
            Self::SippSsas,
            Self::Charity,
            Self::Overseas,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::LtdSpv => "ltd_spv",
            Self::LtdTrading => "ltd_trading",
            Self::Llp => "llp",
            Self::Trust => "trust",
            Self::SippSsas => "sipp_ssas",
            Self::Charity => "charity",
            Self::Overseas => "overseas",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::LtdSpv => "Limited Company (SPV)",
            Self::LtdTrading => "Limited Company (Trading)",
            Self::Llp => "LLP",
            Self::Trust => "Trust",
            Self::SippSsas => "SIPP / SSAS",
            Self::Charity => "Charity",
            Self::Overseas => "Overseas Entity",
        }
    }

    /// Questionnaire field answering whether the lender accepts this borrower entity.
    pub const fn acceptance_field(self) -> Option<LogicalField> {
        match self {
            Self::Charity => Some(LogicalField::LendsToCharities),
            Self::Trust => Some(LogicalField::LendsToTrusts),
            Self::Llp => Some(LogicalField::LendsToLlps),
            Self::SippSsas => Some(LogicalField::LendsToPensions),
            Self::Overseas => Some(LogicalField::LendsToOverseas),
            Self::Individual | Self::LtdSpv | Self::LtdTrading => None,
        }
    }
}

/// Deal value object evaluated against the catalogue. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealParameters {
    pub loan_amount: f64,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    pub market_value: f64,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub input_mode: InputMode,
    #[serde(default)]
    pub deposit_available: Option<f64>,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default = "default_geography")]
    pub geography: String,
    #[serde(default)]
    pub charge_position: ChargePosition,
    #[serde(default)]
    pub is_regulated: bool,
    #[serde(default)]
    pub is_refurb: bool,
    #[serde(default)]
    pub cost_of_works: Option<f64>,
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(default = "default_loan_term")]
    pub loan_term_months: u32,
    #[serde(default)]
    pub active_refiners: BTreeSet<String>,
}

fn default_geography() -> String {
    DEFAULT_GEOGRAPHY.to_string()
}

fn default_loan_term() -> u32 {
    DEFAULT_LOAN_TERM_MONTHS
}

impl DealParameters {
    pub fn new(loan_amount: f64, market_value: f64) -> Self {
        Self {
            loan_amount,
            purchase_price: None,
            market_value,
            transaction_type: TransactionType::default(),
            input_mode: InputMode::default(),
            deposit_available: None,
            property_type: PropertyType::default(),
            geography: default_geography(),
            charge_position: ChargePosition::default(),
            is_regulated: false,
            is_refurb: false,
            cost_of_works: None,
            entity_type: EntityType::default(),
            loan_term_months: DEFAULT_LOAN_TERM_MONTHS,
            active_refiners: BTreeSet::new(),
        }
    }

    /// Loan amount used for every rule; deposit-driven deals derive it from the purchase price.
    pub fn effective_loan_amount(&self) -> f64 {
        match (self.input_mode, self.purchase_price, self.deposit_available) {
            (InputMode::Deposit, Some(price), Some(deposit)) => (price - deposit).max(0.0),
            _ => self.loan_amount,
        }
    }

    /// Loan-to-value as a plain percentage; 0 when the market value is not positive.
    pub fn ltv(&self) -> f64 {
        if self.market_value > 0.0 {
            self.effective_loan_amount() / self.market_value * 100.0
        } else {
            0.0
        }
    }

    /// Cost of works over market value as a percentage; 0 outside refurbishment deals.
    pub fn works_ratio(&self) -> f64 {
        match self.cost_of_works {
            Some(works) if self.is_refurb && works > 0.0 && self.market_value > 0.0 => {
                works / self.market_value * 100.0
            }
            _ => 0.0,
        }
    }

    pub fn is_refiner_active(&self, key: &str) -> bool {
        self.active_refiners.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltv_is_zero_without_positive_market_value() {
        let deal = DealParameters::new(500_000.0, 0.0);
        assert_eq!(deal.ltv(), 0.0);

        let deal = DealParameters::new(500_000.0, 1_000_000.0);
        assert_eq!(deal.ltv(), 50.0);
    }

    #[test]
    fn deposit_mode_derives_the_loan() {
        let deal = DealParameters {
            input_mode: InputMode::Deposit,
            purchase_price: Some(400_000.0),
            deposit_available: Some(100_000.0),
            ..DealParameters::new(0.0, 400_000.0)
        };
        assert_eq!(deal.effective_loan_amount(), 300_000.0);
        assert_eq!(deal.ltv(), 75.0);
    }

    #[test]
    fn works_ratio_only_applies_to_refurbishment() {
        let mut deal = DealParameters {
            cost_of_works: Some(400_000.0),
            ..DealParameters::new(500_000.0, 1_000_000.0)
        };
        assert_eq!(deal.works_ratio(), 0.0);

        deal.is_refurb = true;
        assert_eq!(deal.works_ratio(), 40.0);
    }

    #[test]
    fn deserializes_wire_spellings_with_defaults() {
        let deal: DealParameters = serde_json::from_str(
            r#"{"loan_amount": 300000, "market_value": 500000, "charge_position": "2nd_supporting",
                "property_type": "land_with_pp", "entity_type": "sipp_ssas",
                "active_refiners": ["serviced_interest"]}"#,
        )
        .expect("deal parses");

        assert_eq!(deal.charge_position, ChargePosition::SecondSupporting);
        assert_eq!(deal.property_type, PropertyType::LandWithPp);
        assert_eq!(deal.entity_type, EntityType::SippSsas);
        assert_eq!(deal.geography, "England");
        assert_eq!(deal.loan_term_months, 12);
        assert!(deal.is_refiner_active("serviced_interest"));
    }
}
