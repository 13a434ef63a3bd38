use super::super::deal::{ChargePosition, DealParameters, EntityType, PropertyType};
use crate::lenders::values::format_currency;
use crate::lenders::LogicalField;
use serde::{Serialize, Serializer};
use std::fmt;

pub const VERY_HEAVY_WORKS_RATIO: f64 = 100.0;
pub const HEAVY_WORKS_RATIO: f64 = 50.0;
pub const MEDIUM_WORKS_RATIO: f64 = 30.0;

/// Refurbishment intensity bands by cost of works against market value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorksTier {
    Medium,
    Heavy,
    VeryHeavy,
}

impl WorksTier {
    /// Tier for a works ratio; `None` at or below the medium threshold.
    pub fn from_ratio(works_ratio: f64) -> Option<Self> {
        if works_ratio > VERY_HEAVY_WORKS_RATIO {
            Some(Self::VeryHeavy)
        } else if works_ratio > HEAVY_WORKS_RATIO {
            Some(Self::Heavy)
        } else if works_ratio > MEDIUM_WORKS_RATIO {
            Some(Self::Medium)
        } else {
            None
        }
    }

    pub const fn field(self) -> LogicalField {
        match self {
            Self::Medium => LogicalField::MediumWorks,
            Self::Heavy => LogicalField::HeavyWorks,
            Self::VeryHeavy => LogicalField::VeryHeavyWorks,
        }
    }
}

/// Product a lender does not offer for the deal's property type or charge position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableProduct {
    LandWithPlanning,
    LandWithoutPlanning,
    StandaloneSecondCharge,
    SupportingSecondCharge,
    EquitableCharge,
    Property(PropertyType),
}

/// Single failed knockout rule, rendered as a human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    BelowMinimumLoan(f64),
    AboveMaximumLoan(f64),
    RegulatedNotOffered,
    GeographyExcluded(String),
    RefurbishmentNotOffered,
    WorksNotFunded(WorksTier),
    EntityNotAccepted(EntityType),
    Unavailable(UnavailableProduct),
    NetAdvanceShortfall,
}

impl ExclusionReason {
    pub fn summary(&self) -> String {
        match self {
            Self::BelowMinimumLoan(minimum) => {
                format!("Below minimum loan ({})", format_currency(*minimum))
            }
            Self::AboveMaximumLoan(maximum) => {
                format!("Above maximum loan ({})", format_currency(*maximum))
            }
            Self::RegulatedNotOffered => "Doesn't offer regulated bridging".to_string(),
            Self::GeographyExcluded(geography) => format!("Doesn't lend in {geography}"),
            Self::RefurbishmentNotOffered => "Doesn't offer refurbishment bridging".to_string(),
            Self::WorksNotFunded(WorksTier::VeryHeavy) => {
                "Doesn't fund very heavy works (>100% ratio)".to_string()
            }
            Self::WorksNotFunded(WorksTier::Heavy) => {
                "Doesn't fund heavy works (50-100% ratio)".to_string()
            }
            Self::WorksNotFunded(WorksTier::Medium) => {
                "Doesn't fund medium works (30-50% ratio)".to_string()
            }
            Self::EntityNotAccepted(entity) => format!("Doesn't lend to {}", entity.label()),
            Self::Unavailable(product) => match product {
                UnavailableProduct::LandWithPlanning => {
                    "Doesn't lend on land with planning".to_string()
                }
                UnavailableProduct::LandWithoutPlanning => {
                    "Doesn't lend on land without planning".to_string()
                }
                UnavailableProduct::StandaloneSecondCharge => {
                    "Doesn't offer standalone 2nd charge".to_string()
                }
                UnavailableProduct::SupportingSecondCharge => {
                    "Doesn't offer supporting 2nd charge".to_string()
                }
                UnavailableProduct::EquitableCharge => "Doesn't offer equitable charges".to_string(),
                UnavailableProduct::Property(property) => {
                    format!("Doesn't lend on {}", property.label().to_lowercase())
                }
            },
            Self::NetAdvanceShortfall => {
                "Net advance after fees and retained interest unlikely to meet required LTV"
                    .to_string()
            }
        }
    }

    /// Whether the reason reflects insufficient leverage rather than a categorical mismatch.
    pub fn is_leverage_shortfall(&self) -> bool {
        matches!(self, Self::NetAdvanceShortfall)
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl Serialize for ExclusionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// LTV column governing the deal, chosen by regulation, property type and charge position.
pub fn ltv_field(deal: &DealParameters) -> LogicalField {
    if deal.is_regulated {
        return LogicalField::RegulatedLtv;
    }

    match deal.property_type {
        PropertyType::LandWithPp => LogicalField::LandWithPlanningLtv,
        PropertyType::LandNoPp => LogicalField::LandWithoutPlanningLtv,
        PropertyType::Commercial => LogicalField::CommercialLtv,
        PropertyType::SemiCommercial => LogicalField::SemiCommercialLtv,
        PropertyType::Residential => match deal.charge_position {
            ChargePosition::First => LogicalField::StandardResidentialLtv,
            ChargePosition::SecondSupporting => LogicalField::SupportingSecondChargeLtv,
            ChargePosition::SecondStandalone => LogicalField::StandaloneSecondChargeLtv,
            ChargePosition::Equitable => LogicalField::EquitableChargeLtv,
        },
    }
}

/// Context-specific reason used when the governing LTV column says the product is not offered.
pub fn unavailable_reason(deal: &DealParameters) -> ExclusionReason {
    let product = match (deal.property_type, deal.charge_position) {
        (PropertyType::LandWithPp, _) => UnavailableProduct::LandWithPlanning,
        (PropertyType::LandNoPp, _) => UnavailableProduct::LandWithoutPlanning,
        (_, ChargePosition::SecondStandalone) => UnavailableProduct::StandaloneSecondCharge,
        (_, ChargePosition::SecondSupporting) => UnavailableProduct::SupportingSecondCharge,
        (_, ChargePosition::Equitable) => UnavailableProduct::EquitableCharge,
        (property, ChargePosition::First) => UnavailableProduct::Property(property),
    };
    ExclusionReason::Unavailable(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal() -> DealParameters {
        DealParameters::new(500_000.0, 1_000_000.0)
    }

    #[test]
    fn regulated_deals_read_the_regulated_column_first() {
        let regulated = DealParameters {
            is_regulated: true,
            property_type: PropertyType::Commercial,
            ..deal()
        };
        assert_eq!(ltv_field(&regulated), LogicalField::RegulatedLtv);
    }

    #[test]
    fn residential_column_follows_charge_position() {
        let second = DealParameters {
            charge_position: ChargePosition::SecondStandalone,
            ..deal()
        };
        assert_eq!(ltv_field(&deal()), LogicalField::StandardResidentialLtv);
        assert_eq!(ltv_field(&second), LogicalField::StandaloneSecondChargeLtv);

        let semi = DealParameters {
            property_type: PropertyType::SemiCommercial,
            charge_position: ChargePosition::SecondStandalone,
            ..deal()
        };
        assert_eq!(ltv_field(&semi), LogicalField::SemiCommercialLtv);
    }

    #[test]
    fn unavailable_reason_prefers_land_then_charge_position() {
        let land = DealParameters {
            property_type: PropertyType::LandNoPp,
            charge_position: ChargePosition::Equitable,
            ..deal()
        };
        assert_eq!(
            unavailable_reason(&land).summary(),
            "Doesn't lend on land without planning"
        );

        let equitable = DealParameters {
            charge_position: ChargePosition::Equitable,
            ..deal()
        };
        assert_eq!(
            unavailable_reason(&equitable).summary(),
            "Doesn't offer equitable charges"
        );

        let commercial = DealParameters {
            property_type: PropertyType::Commercial,
            ..deal()
        };
        assert_eq!(
            unavailable_reason(&commercial).summary(),
            "Doesn't lend on fully commercial"
        );
    }

    #[test]
    fn works_tiers_use_strict_thresholds() {
        assert_eq!(WorksTier::from_ratio(30.0), None);
        assert_eq!(WorksTier::from_ratio(30.5), Some(WorksTier::Medium));
        assert_eq!(WorksTier::from_ratio(50.0), Some(WorksTier::Medium));
        assert_eq!(WorksTier::from_ratio(100.0), Some(WorksTier::Heavy));
        assert_eq!(WorksTier::from_ratio(100.1), Some(WorksTier::VeryHeavy));
    }

    #[test]
    fn reasons_serialize_as_their_summary() {
        let reason = ExclusionReason::BelowMinimumLoan(100_000.0);
        assert_eq!(
            serde_json::to_string(&reason).expect("serialize"),
            "\"Below minimum loan (£100,000)\""
        );
    }
}
