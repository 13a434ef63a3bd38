mod policy;
mod rules;

pub use policy::{
    ltv_field, unavailable_reason, ExclusionReason, UnavailableProduct, WorksTier,
    HEAVY_WORKS_RATIO, MEDIUM_WORKS_RATIO, VERY_HEAVY_WORKS_RATIO,
};

#[cfg(test)]
pub(crate) use rules::{rule_named, RuleInput};

use super::deal::DealParameters;
use super::net_advance::{NetAdvanceAssessment, NetAdvanceInputs};
use crate::lenders::schema::field;
use crate::lenders::LenderRecord;
use serde::Serialize;

/// Lender record enriched with the outcome of one filtering pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LenderResult {
    #[serde(flatten)]
    pub lender: LenderRecord,
    pub exclusion_reasons: Vec<ExclusionReason>,
    pub net_advance: Option<NetAdvanceAssessment>,
    pub calculated_ltv: f64,
    pub works_ratio: f64,
}

impl LenderResult {
    pub fn name(&self) -> &str {
        self.lender.name()
    }

    pub fn is_eligible(&self) -> bool {
        self.exclusion_reasons.is_empty()
    }

    pub fn net_advance_fails(&self) -> bool {
        self.net_advance.as_ref().is_some_and(NetAdvanceAssessment::fails)
    }

    pub fn net_advance_is_tight(&self) -> bool {
        self.net_advance
            .as_ref()
            .is_some_and(NetAdvanceAssessment::is_tight)
    }
}

/// Eligible and excluded lenders, each in catalogue order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub eligible: Vec<LenderResult>,
    pub excluded: Vec<LenderResult>,
}

/// Runs every knockout rule, then the net advance check for categorical survivors.
pub fn evaluate_lender(deal: &DealParameters, lender: &LenderRecord) -> LenderResult {
    let input = rules::RuleInput::new(deal);
    let ltv = deal.ltv();
    let mut exclusion_reasons = rules::evaluate_categorical(&input, lender);

    let net_advance = if exclusion_reasons.is_empty() {
        assess_net_advance(deal, lender, ltv)
    } else {
        None
    };

    if net_advance.as_ref().is_some_and(NetAdvanceAssessment::fails) {
        exclusion_reasons.push(ExclusionReason::NetAdvanceShortfall);
    }

    LenderResult {
        lender: lender.clone(),
        exclusion_reasons,
        net_advance,
        calculated_ltv: ltv,
        works_ratio: input.works_ratio,
    }
}

/// Partitions the catalogue. Every lender lands in exactly one side.
pub fn partition(lenders: &[LenderRecord], deal: &DealParameters) -> Partition {
    let mut partition = Partition::default();
    for lender in lenders {
        let result = evaluate_lender(deal, lender);
        if result.is_eligible() {
            partition.eligible.push(result);
        } else {
            partition.excluded.push(result);
        }
    }
    partition
}

fn assess_net_advance(
    deal: &DealParameters,
    lender: &LenderRecord,
    required_ltv: f64,
) -> Option<NetAdvanceAssessment> {
    let cell = field(lender, ltv_field(deal))?;
    NetAdvanceInputs::from_lender(lender, cell)
        .map(|inputs| inputs.assess(required_ltv, deal.loan_term_months))
}
