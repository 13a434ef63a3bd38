use super::super::deal::DealParameters;
use super::policy::{ltv_field, unavailable_reason, ExclusionReason, WorksTier};
use crate::lenders::schema::{field, folded};
use crate::lenders::values::{is_negative, is_negative_without_yes, is_unavailable, parse_currency};
use crate::lenders::{LenderRecord, LogicalField};
use tracing::trace;

/// Deal figures shared by every rule in a single filtering pass.
pub(crate) struct RuleInput<'a> {
    pub deal: &'a DealParameters,
    pub loan_amount: f64,
    pub works_ratio: f64,
}

impl<'a> RuleInput<'a> {
    pub(crate) fn new(deal: &'a DealParameters) -> Self {
        Self {
            deal,
            loan_amount: deal.effective_loan_amount(),
            works_ratio: deal.works_ratio(),
        }
    }
}

/// One categorical knockout: the field it reads and the check producing its reason.
pub(crate) struct KnockoutRule {
    pub name: &'static str,
    pub field: Option<LogicalField>,
    pub check: fn(&RuleInput<'_>, &LenderRecord) -> Option<ExclusionReason>,
}

/// Categorical rules in evaluation order. Fields resolved per deal are marked `None`.
pub(crate) const KNOCKOUT_RULES: [KnockoutRule; 8] = [
    KnockoutRule {
        name: "minimum_loan",
        field: Some(LogicalField::MinimumLoan),
        check: minimum_loan,
    },
    KnockoutRule {
        name: "maximum_loan",
        field: Some(LogicalField::MaximumLoan),
        check: maximum_loan,
    },
    KnockoutRule {
        name: "regulated",
        field: Some(LogicalField::RegulatedOffered),
        check: regulated,
    },
    KnockoutRule {
        name: "geography",
        field: Some(LogicalField::GeographyExclusions),
        check: geography,
    },
    KnockoutRule {
        name: "refurbishment",
        field: Some(LogicalField::RefurbishmentOffered),
        check: refurbishment,
    },
    KnockoutRule {
        name: "works_tier",
        field: None,
        check: works_tier,
    },
    KnockoutRule {
        name: "entity",
        field: None,
        check: entity,
    },
    KnockoutRule {
        name: "availability",
        field: None,
        check: availability,
    },
];

/// Every categorical reason for the lender, in rule order. Rules never short-circuit.
pub(crate) fn evaluate_categorical(input: &RuleInput<'_>, lender: &LenderRecord) -> Vec<ExclusionReason> {
    KNOCKOUT_RULES
        .iter()
        .filter_map(|rule| {
            let reason = (rule.check)(input, lender)?;
            trace!(
                lender = lender.name(),
                rule = rule.name,
                field = ?rule.field,
                %reason,
                "knockout rule failed"
            );
            Some(reason)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn rule_named(name: &str) -> &'static KnockoutRule {
    KNOCKOUT_RULES
        .iter()
        .find(|rule| rule.name == name)
        .expect("knockout rule exists")
}

fn currency_limit(lender: &LenderRecord, logical: LogicalField) -> Option<f64> {
    parse_currency(&folded(lender, logical)).filter(|limit| *limit > 0.0)
}

fn minimum_loan(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    currency_limit(lender, LogicalField::MinimumLoan)
        .filter(|minimum| input.loan_amount < *minimum)
        .map(ExclusionReason::BelowMinimumLoan)
}

fn maximum_loan(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    currency_limit(lender, LogicalField::MaximumLoan)
        .filter(|maximum| input.loan_amount > *maximum)
        .map(ExclusionReason::AboveMaximumLoan)
}

fn regulated(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    (input.deal.is_regulated && is_negative(&folded(lender, LogicalField::RegulatedOffered)))
        .then_some(ExclusionReason::RegulatedNotOffered)
}

fn geography(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    let geography = input.deal.geography.trim();
    if geography.is_empty() {
        return None;
    }

    folded(lender, LogicalField::GeographyExclusions)
        .contains(&geography.to_lowercase())
        .then(|| ExclusionReason::GeographyExcluded(geography.to_string()))
}

fn refurbishment(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    (input.deal.is_refurb && is_negative(&folded(lender, LogicalField::RefurbishmentOffered)))
        .then_some(ExclusionReason::RefurbishmentNotOffered)
}

fn works_tier(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    if !input.deal.is_refurb {
        return None;
    }

    let tier = WorksTier::from_ratio(input.works_ratio)?;
    is_negative(&folded(lender, tier.field())).then_some(ExclusionReason::WorksNotFunded(tier))
}

fn entity(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    let acceptance = input.deal.entity_type.acceptance_field()?;
    is_negative_without_yes(&folded(lender, acceptance))
        .then_some(ExclusionReason::EntityNotAccepted(input.deal.entity_type))
}

fn availability(input: &RuleInput<'_>, lender: &LenderRecord) -> Option<ExclusionReason> {
    let cell = field(lender, ltv_field(input.deal))?;
    is_unavailable(&cell.as_text()).then(|| unavailable_reason(input.deal))
}
