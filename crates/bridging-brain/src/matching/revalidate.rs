use super::deal::DealParameters;
use crate::lenders::schema::folded;
use crate::lenders::values::is_negative;
use crate::lenders::{LenderRecord, LogicalField};
use serde::{Deserialize, Serialize};

pub const MAX_ALTERNATIVES: usize = 3;

/// Broker-supplied details gathered before presenting a deal to a lender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationDetails {
    #[serde(default)]
    pub refurb_experience: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub is_homeowner: Option<bool>,
    #[serde(default)]
    pub assets_liabilities: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeLender {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidationOutcome {
    pub still_fits: bool,
    pub warnings: Vec<String>,
    pub alternative_suggestions: Vec<AlternativeLender>,
}

impl Default for RevalidationOutcome {
    fn default() -> Self {
        Self {
            still_fits: true,
            warnings: Vec::new(),
            alternative_suggestions: Vec::new(),
        }
    }
}

/// Re-checks a chosen lender once presentation details are known.
pub fn revalidate(
    lender: &LenderRecord,
    deal: &DealParameters,
    details: &PresentationDetails,
    catalogue: &[LenderRecord],
) -> RevalidationOutcome {
    let mut outcome = RevalidationOutcome::default();
    let name = lender.name();

    if let Some(experience) = details.refurb_experience.as_deref().filter(|_| deal.is_refurb) {
        let required = folded(lender, LogicalField::RefurbExperience);
        if is_first_time(experience) && (required.contains("2+") || required.contains("3+")) {
            outcome
                .warnings
                .push(format!("{name} requires {required} projects experience for refurb"));
            outcome.still_fits = false;
            outcome.alternative_suggestions = catalogue
                .iter()
                .filter(|alternative| alternative.name() != name)
                .filter(|alternative| takes_first_time_developers(alternative))
                .take(MAX_ALTERNATIVES)
                .map(|alternative| AlternativeLender {
                    name: alternative.name().to_string(),
                    reason: "Accepts first-time developers".to_string(),
                })
                .collect();
        }
    }

    if details.urgency.as_deref().is_some_and(is_urgent)
        && is_negative(&folded(lender, LogicalField::DualLegalRep))
    {
        outcome.warnings.push(format!(
            "{name} doesn't offer dual legal rep - may be slower for auction"
        ));
    }

    if deal.is_regulated
        && details.is_homeowner == Some(false)
        && is_negative(&folded(lender, LogicalField::NonOwnerOccupiers))
    {
        outcome.warnings.push(format!(
            "{name} may not lend to non-owner occupiers on regulated deals"
        ));
        outcome.still_fits = false;
    }

    if details
        .assets_liabilities
        .as_deref()
        .is_some_and(is_nil_or_negative)
        && is_negative(&folded(lender, LogicalField::NilNegativeAssets))
    {
        outcome
            .warnings
            .push(format!("{name} doesn't accept nil/negative A&L profiles"));
        outcome.still_fits = false;
    }

    outcome
}

fn is_first_time(experience: &str) -> bool {
    let experience = experience.to_lowercase();
    experience.contains("none") || experience.contains('0') || experience.contains("first")
}

fn is_urgent(urgency: &str) -> bool {
    let urgency = urgency.to_lowercase();
    urgency.contains("auction") || urgency.contains("28") || urgency.contains("urgent")
}

fn is_nil_or_negative(position: &str) -> bool {
    let position = position.to_lowercase();
    position.contains("nil") || position.contains("negative")
}

/// Loose reading of the experience answer: blank, or mentioning "none", "0" or "no minimum".
fn takes_first_time_developers(lender: &LenderRecord) -> bool {
    let experience = folded(lender, LogicalField::RefurbExperience);
    experience.is_empty()
        || experience.contains("none")
        || experience.contains('0')
        || experience.contains("no minimum")
}
