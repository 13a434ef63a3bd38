use super::super::deal::{ChargePosition, DealParameters};
use super::leverage::{offers_supporting_second_charge, publishes_figure, TIGHT_LTV_THRESHOLD};
use crate::lenders::schema::matching_keys;
use crate::lenders::{LenderRecord, LogicalField};
use serde::Serialize;

/// Eligible count at or above which a moderate-LTV deal needs no security advice.
pub const COMFORTABLE_ELIGIBLE_COUNT: usize = 20;
/// Eligible count below which additional security is suggested regardless of LTV.
pub const LOW_ELIGIBLE_COUNT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityHints {
    pub additional_security_helps: bool,
    pub supporting_2nd_count: usize,
    pub equitable_count: usize,
    pub message: Option<String>,
}

/// Suggests additional security for 1st-charge deals that are tight on LTV or short of lenders.
///
/// Counts run over the whole catalogue, not only the eligible lenders.
pub fn generate_security_hints(
    deal: &DealParameters,
    catalogue: &[LenderRecord],
    eligible_count: usize,
) -> SecurityHints {
    let ltv = deal.ltv();
    if deal.charge_position != ChargePosition::First {
        return SecurityHints::default();
    }
    if ltv <= TIGHT_LTV_THRESHOLD && eligible_count >= COMFORTABLE_ELIGIBLE_COUNT {
        return SecurityHints::default();
    }

    let supporting_2nd_count = catalogue
        .iter()
        .filter(|lender| offers_supporting_second_charge(lender))
        .count();
    let equitable_count = catalogue
        .iter()
        .filter(|lender| offers_supporting_equitable_charge(lender))
        .count();

    let message = if ltv > TIGHT_LTV_THRESHOLD {
        Some(format!(
            "If borrower has other property: supporting 2nd charge ({supporting_2nd_count} lenders) \
             or equitable charge ({equitable_count} lenders) could reduce effective LTV"
        ))
    } else if eligible_count < LOW_ELIGIBLE_COUNT {
        Some(format!(
            "Additional security could expand options: {supporting_2nd_count} lenders offer supporting 2nd charge"
        ))
    } else {
        None
    };

    SecurityHints {
        additional_security_helps: message.is_some(),
        supporting_2nd_count,
        equitable_count,
        message,
    }
}

fn offers_supporting_equitable_charge(lender: &LenderRecord) -> bool {
    matching_keys(lender, LogicalField::SupportingEquitableCharge.token())
        .any(|key| publishes_figure(lender, key))
}
