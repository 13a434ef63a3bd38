//! Lender eligibility engine: knockouts, net advance, leverage hints and refiners.

pub mod deal;
pub mod hints;
pub mod knockout;
pub mod net_advance;
pub mod refiners;
pub mod revalidate;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use deal::{
    ChargePosition, DealParameters, EntityType, InputMode, PropertyType, TransactionType,
};
pub use hints::{Lever, LeverageHint, LeverageHints, SecurityHints};
pub use knockout::{ExclusionReason, LenderResult};
pub use net_advance::{estimate_net_ltv_outcome, NetAdvanceAssessment, NetAdvanceOutcome};
pub use refiners::{refiner_facets, RefinerCategory, RefinerFacet, RefinerFacets};
pub use revalidate::{revalidate, AlternativeLender, PresentationDetails, RevalidationOutcome};
pub use router::matching_router;
pub use service::{
    ContactDetails, ContactLenderRequest, ContactLenderResponse, LenderDirectory, MatchingService,
    MatchingServiceError,
};

use crate::lenders::LenderRecord;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub total: usize,
    pub eligible: usize,
    pub excluded: usize,
    pub ltv: f64,
    pub works_ratio: f64,
}

/// Full outcome of one filtering pass over a catalogue snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    pub eligible: Vec<LenderResult>,
    pub excluded: Vec<LenderResult>,
    pub summary: FilterSummary,
    pub leverage_hints: LeverageHints,
    pub security_hints: SecurityHints,
}

impl FilterResult {
    pub fn eligible_lenders(&self) -> impl Iterator<Item = &LenderRecord> {
        self.eligible.iter().map(|result| &result.lender)
    }

    pub fn find(&self, name: &str) -> Option<&LenderResult> {
        self.eligible
            .iter()
            .chain(&self.excluded)
            .find(|result| result.name() == name)
    }
}

/// Partitions the catalogue for the deal and derives both hint bundles.
pub fn filter(lenders: &[LenderRecord], deal: &DealParameters) -> FilterResult {
    let partition = knockout::partition(lenders, deal);
    let leverage_hints =
        hints::generate_leverage_hints(deal, &partition.eligible, &partition.excluded);
    let security_hints =
        hints::generate_security_hints(deal, lenders, partition.eligible.len());

    let summary = FilterSummary {
        total: lenders.len(),
        eligible: partition.eligible.len(),
        excluded: partition.excluded.len(),
        ltv: deal.ltv(),
        works_ratio: deal.works_ratio(),
    };
    debug!(
        total = summary.total,
        eligible = summary.eligible,
        excluded = summary.excluded,
        ltv = summary.ltv,
        hints_active = leverage_hints.active,
        "filtered lender catalogue"
    );

    FilterResult {
        eligible: partition.eligible,
        excluded: partition.excluded,
        summary,
        leverage_hints,
        security_hints,
    }
}
