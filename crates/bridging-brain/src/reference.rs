//! Static option lists served to deal-entry clients.

use crate::matching::{EntityType, PropertyType};
use serde::Serialize;

pub const UK_GEOGRAPHIES: [&str; 10] = [
    "England",
    "Wales",
    "Scotland",
    "Scottish Highlands",
    "Scottish Islands",
    "Northern Ireland",
    "Isle of Man",
    "Isle of Wight",
    "Channel Islands",
    "London",
];

/// Deal scenarios scored on the 0-3 appetite scale, in questionnaire column order.
/// `column` is the suffix of the repeated appetite header; `0` is the unsuffixed first column.
pub const DEAL_SCENARIOS: [(&str, &str, u8); 15] = [
    ("auction", "Auction Purchase", 0),
    ("business_stabilisation", "Business Stabilisation", 1),
    ("insolvency", "Insolvency Solution", 2),
    ("hmo_conversion", "HMO Conversion", 3),
    ("comm_to_resi", "Commercial to Residential", 4),
    ("airspace", "Airspace Development", 5),
    ("pre_planning", "Pre-Planning Acquisition", 6),
    ("subsidence", "Subsidence History", 7),
    ("sitting_tenant", "Sitting Tenant", 8),
    ("probate", "Probate", 9),
    ("fire_flood", "Fire/Flood Damage", 10),
    ("barn_church", "Barn/Church Conversion", 11),
    ("developer_exit", "Developer Exit", 12),
    ("lease_extension", "Lease Extension", 13),
    ("refinance_btl", "Refinance to BTL", 14),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealScenario {
    pub key: &'static str,
    pub label: &'static str,
    pub appetite_column: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub geographies: Vec<&'static str>,
    pub entity_types: Vec<OptionItem>,
    pub property_types: Vec<OptionItem>,
    pub deal_scenarios: Vec<DealScenario>,
}

impl ReferenceData {
    pub fn standard() -> Self {
        Self {
            geographies: UK_GEOGRAPHIES.to_vec(),
            entity_types: EntityType::ordered()
                .into_iter()
                .map(|entity| OptionItem {
                    key: entity.key(),
                    label: entity.label(),
                })
                .collect(),
            property_types: PropertyType::ordered()
                .into_iter()
                .map(|property| OptionItem {
                    key: property.key(),
                    label: property.label(),
                })
                .collect(),
            deal_scenarios: DEAL_SCENARIOS
                .into_iter()
                .map(|(key, label, appetite_column)| DealScenario {
                    key,
                    label,
                    appetite_column,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_reference_lists_every_option() {
        let reference = ReferenceData::standard();
        assert_eq!(reference.geographies.first(), Some(&"England"));
        assert_eq!(reference.entity_types.len(), 8);
        assert_eq!(reference.property_types[1].key, "semi_commercial");
        assert_eq!(reference.deal_scenarios[9].key, "probate");
        assert_eq!(reference.deal_scenarios[9].appetite_column, 9);
    }
}
