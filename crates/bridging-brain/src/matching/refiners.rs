//! Faceted refiners: optional secondary filters with remaining-lender counts.

use super::deal::{DealParameters, EntityType, PropertyType};
use crate::lenders::schema::folded;
use crate::lenders::values::{is_affirmative, parse_appetite};
use crate::lenders::{LenderRecord, LogicalField};
use serde::Serialize;

/// Appetite score at which a lender "will consider" a scenario.
pub const WILL_CONSIDER_APPETITE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinerCategory {
    Borrower,
    Deal,
    Product,
}

/// Declarative refiner definition.
pub struct Refiner {
    pub key: &'static str,
    pub category: RefinerCategory,
    pub label: &'static str,
    applies: fn(&DealParameters) -> bool,
    predicate: fn(&LenderRecord) -> bool,
}

impl Refiner {
    pub fn applies_to(&self, deal: &DealParameters) -> bool {
        (self.applies)(deal)
    }

    pub fn matches(&self, lender: &LenderRecord) -> bool {
        (self.predicate)(lender)
    }
}

pub const REFINERS: [Refiner; 20] = [
    Refiner {
        key: "foreign_national",
        category: RefinerCategory::Borrower,
        label: "Foreign National",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::ForeignNationals),
    },
    Refiner {
        key: "expat",
        category: RefinerCategory::Borrower,
        label: "Expat",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::Expats),
    },
    Refiner {
        key: "adverse_credit",
        category: RefinerCategory::Borrower,
        label: "Adverse Credit",
        applies: always,
        predicate: |lender| {
            yes(lender, LogicalField::HeavyAdverse) || yes(lender, LogicalField::Bankruptcy)
        },
    },
    Refiner {
        key: "bankruptcy",
        category: RefinerCategory::Borrower,
        label: "Bankruptcy/IVA",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::Bankruptcy),
    },
    Refiner {
        key: "ftb",
        category: RefinerCategory::Borrower,
        label: "First Time Buyer",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::FirstTimeBuyers),
    },
    Refiner {
        key: "ftl",
        category: RefinerCategory::Borrower,
        label: "First Time Landlord",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::FirstTimeLandlords),
    },
    Refiner {
        key: "trust",
        category: RefinerCategory::Borrower,
        label: "Trust Lending",
        applies: |deal| deal.entity_type == EntityType::Trust,
        predicate: |lender| yes(lender, LogicalField::LendsToTrusts),
    },
    Refiner {
        key: "sipp",
        category: RefinerCategory::Borrower,
        label: "SIPP/SSAS",
        applies: |deal| deal.entity_type == EntityType::SippSsas,
        predicate: |lender| yes(lender, LogicalField::LendsToPensions),
    },
    Refiner {
        key: "charity",
        category: RefinerCategory::Borrower,
        label: "Charity",
        applies: |deal| deal.entity_type == EntityType::Charity,
        predicate: |lender| yes(lender, LogicalField::LendsToCharities),
    },
    Refiner {
        key: "auction",
        category: RefinerCategory::Deal,
        label: "Auction",
        applies: always,
        predicate: |lender| will_consider(lender, LogicalField::AppetiteAuction),
    },
    Refiner {
        key: "hmo",
        category: RefinerCategory::Deal,
        label: "HMO Conversion",
        applies: always,
        predicate: |lender| will_consider(lender, LogicalField::AppetiteHmoConversion),
    },
    Refiner {
        key: "probate",
        category: RefinerCategory::Deal,
        label: "Probate",
        applies: always,
        predicate: |lender| will_consider(lender, LogicalField::AppetiteProbate),
    },
    Refiner {
        key: "comm_to_resi",
        category: RefinerCategory::Deal,
        label: "Comm to Resi",
        applies: always,
        predicate: |lender| will_consider(lender, LogicalField::AppetiteCommercialToResidential),
    },
    Refiner {
        key: "staged_funding",
        category: RefinerCategory::Deal,
        label: "Staged Funding",
        applies: |deal| deal.is_refurb,
        predicate: |lender| yes(lender, LogicalField::StagedFunding),
    },
    Refiner {
        key: "first_time_dev",
        category: RefinerCategory::Deal,
        label: "First-Time Developer OK",
        applies: |deal| deal.is_refurb,
        predicate: accepts_first_time_developers,
    },
    Refiner {
        key: "speed",
        category: RefinerCategory::Product,
        label: "Speed Critical",
        applies: always,
        predicate: |lender| {
            yes(lender, LogicalField::DualLegalRep)
                || matches!(
                    folded(lender, LogicalField::MinimumInterestMonths).as_str(),
                    "1" | "1 month"
                )
        },
    },
    Refiner {
        key: "serviced_interest",
        category: RefinerCategory::Product,
        label: "Serviced Interest",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::ServicedInterest),
    },
    Refiner {
        key: "dual_legal",
        category: RefinerCategory::Product,
        label: "Dual Legal Rep",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::DualLegalRep),
    },
    Refiner {
        key: "flexible",
        category: RefinerCategory::Product,
        label: "Flexible Facility",
        applies: always,
        predicate: |lender| yes(lender, LogicalField::FlexibleFacility),
    },
    Refiner {
        key: "avm",
        category: RefinerCategory::Product,
        label: "AVM/Desktop Val",
        applies: |deal| deal.property_type == PropertyType::Residential,
        predicate: |lender| yes(lender, LogicalField::AvmDesktop),
    },
];

pub fn refiner(key: &str) -> Option<&'static Refiner> {
    REFINERS.iter().find(|refiner| refiner.key == key)
}

fn always(_: &DealParameters) -> bool {
    true
}

fn yes(lender: &LenderRecord, logical: LogicalField) -> bool {
    is_affirmative(&folded(lender, logical))
}

fn will_consider(lender: &LenderRecord, logical: LogicalField) -> bool {
    parse_appetite(&folded(lender, logical)).is_some_and(|score| score >= WILL_CONSIDER_APPETITE)
}

/// No minimum refurbishment experience. An unanswered question counts as none.
pub(crate) fn accepts_first_time_developers(lender: &LenderRecord) -> bool {
    matches!(
        folded(lender, LogicalField::RefurbExperience).as_str(),
        "" | "none" | "0" | "no minimum"
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinerFacet {
    pub key: String,
    pub category: RefinerCategory,
    pub label: String,
    pub remaining: usize,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefinerFacets {
    pub base_count: usize,
    pub refined_count: usize,
    pub borrower: Vec<RefinerFacet>,
    pub deal: Vec<RefinerFacet>,
    pub product: Vec<RefinerFacet>,
}

impl RefinerFacets {
    pub fn all(&self) -> impl Iterator<Item = &RefinerFacet> {
        self.borrower.iter().chain(&self.deal).chain(&self.product)
    }
}

/// Lenders from `eligible` that satisfy every active refiner. Unknown keys are ignored.
pub fn apply_active_refiners<'a>(
    deal: &DealParameters,
    eligible: impl IntoIterator<Item = &'a LenderRecord>,
) -> Vec<&'a LenderRecord> {
    let active: Vec<&Refiner> = REFINERS
        .iter()
        .filter(|refiner| deal.is_refiner_active(refiner.key))
        .collect();

    eligible
        .into_iter()
        .filter(|lender| active.iter().all(|refiner| refiner.matches(lender)))
        .collect()
}

/// Remaining-lender counts for every applicable or active refiner over the refined subset.
pub fn refiner_facets<'a>(
    deal: &DealParameters,
    eligible: impl IntoIterator<Item = &'a LenderRecord>,
) -> RefinerFacets {
    let eligible: Vec<&LenderRecord> = eligible.into_iter().collect();
    let refined = apply_active_refiners(deal, eligible.iter().copied());

    let mut facets = RefinerFacets {
        base_count: eligible.len(),
        refined_count: refined.len(),
        ..RefinerFacets::default()
    };

    for refiner in &REFINERS {
        let active = deal.is_refiner_active(refiner.key);
        if !active && !refiner.applies_to(deal) {
            continue;
        }

        let remaining = if active {
            refined.len()
        } else {
            refined
                .iter()
                .filter(|lender| refiner.matches(lender))
                .count()
        };
        if remaining == 0 {
            continue;
        }

        let facet = RefinerFacet {
            key: refiner.key.to_string(),
            category: refiner.category,
            label: refiner.label.to_string(),
            remaining,
            active,
        };
        match refiner.category {
            RefinerCategory::Borrower => facets.borrower.push(facet),
            RefinerCategory::Deal => facets.deal.push(facet),
            RefinerCategory::Product => facets.product.push(facet),
        }
    }

    for group in [&mut facets.borrower, &mut facets.deal, &mut facets.product] {
        group.sort_by(|left, right| {
            right
                .active
                .cmp(&left.active)
                .then(right.remaining.cmp(&left.remaining))
        });
    }
    facets
}
