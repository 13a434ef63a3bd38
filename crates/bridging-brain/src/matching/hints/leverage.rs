use super::super::deal::{ChargePosition, DealParameters};
use super::super::knockout::{ltv_field, LenderResult};
use super::super::net_advance::{monthly_rate, NetAdvanceInputs};
use crate::lenders::schema::{field, folded, matching_keys};
use crate::lenders::values::{is_affirmative, is_unavailable, parse_percentage};
use crate::lenders::{LenderRecord, LogicalField};
use serde::Serialize;

/// LTV above which the deal is flagged as sitting in the tight zone.
pub const TIGHT_LTV_THRESHOLD: f64 = 70.0;
/// Alternative terms tried, longest first.
pub const SHORTER_TERMS_MONTHS: [u32; 2] = [9, 6];
/// Rate spread across problem lenders that makes a cheaper lender worth flagging.
pub const MIN_RATE_SPREAD_PCT: f64 = 0.2;
/// Lenders named per lever in the one-line summary.
pub const SUMMARY_NAMES_PER_LEVER: usize = 3;

const SUPPORTING_SECOND_CHARGE: &str = "supporting_2nd_charge";

/// Counterfactual change that could bring a lender within reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    ShorterTerm,
    ServicedInterest,
    LightRefurbishment,
    BelowMarketValue,
    AdditionalSecurity,
    LowerRate,
}

impl Lever {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::ShorterTerm,
            Self::ServicedInterest,
            Self::LightRefurbishment,
            Self::BelowMarketValue,
            Self::AdditionalSecurity,
            Self::LowerRate,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ShorterTerm => "Shorter term",
            Self::ServicedInterest => "Serviced interest",
            Self::LightRefurbishment => "Light refurb day-1 advance",
            Self::BelowMarketValue => "BMV purchase",
            Self::AdditionalSecurity => "Additional security",
            Self::LowerRate => "Lower rate lender",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverageHint {
    pub lever: Lever,
    pub label: String,
    pub lender: String,
    pub note: String,
}

impl LeverageHint {
    fn new(lever: Lever, lender: &LenderRecord, note: impl Into<String>) -> Self {
        Self {
            lever,
            label: lever.label().to_string(),
            lender: lender.name().to_string(),
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeverageHints {
    pub active: bool,
    pub tight_ltv: bool,
    pub problem_lenders: usize,
    pub hints: Vec<LeverageHint>,
    pub summary: Option<String>,
}

impl LeverageHints {
    pub fn for_lever(&self, lever: Lever) -> impl Iterator<Item = &LeverageHint> {
        self.hints.iter().filter(move |hint| hint.lever == lever)
    }
}

/// Tries the six levers for every lender failing or tight on net advance.
pub fn generate_leverage_hints(
    deal: &DealParameters,
    eligible: &[LenderResult],
    excluded: &[LenderResult],
) -> LeverageHints {
    let required_ltv = deal.ltv();
    let problem: Vec<&LenderRecord> = excluded
        .iter()
        .filter(|result| result.net_advance_fails())
        .chain(eligible.iter().filter(|result| result.net_advance_is_tight()))
        .map(|result| &result.lender)
        .collect();

    let mut hints = LeverageHints {
        tight_ltv: required_ltv > TIGHT_LTV_THRESHOLD,
        problem_lenders: problem.len(),
        ..LeverageHints::default()
    };
    if problem.is_empty() {
        return hints;
    }
    hints.active = true;

    let benchmark = lowest_rate_benchmark(&problem);
    let column = ltv_field(deal);
    for lender in problem.iter().copied() {
        let Some(inputs) = field(lender, column)
            .and_then(|cell| NetAdvanceInputs::from_lender(lender, cell))
        else {
            continue;
        };

        let check = LeverCheck {
            deal,
            lender,
            inputs,
            required_ltv,
            benchmark,
        };
        hints.hints.extend(check.shorter_term());
        hints.hints.extend(check.serviced_interest());
        hints.hints.extend(check.light_refurbishment());
        hints.hints.extend(check.below_market_value());
        hints.hints.extend(check.additional_security());
        hints.hints.extend(check.lower_rate());
    }

    hints.summary = summarize(&hints.hints);
    hints
}

struct LeverCheck<'a> {
    deal: &'a DealParameters,
    lender: &'a LenderRecord,
    inputs: NetAdvanceInputs,
    required_ltv: f64,
    benchmark: Option<(f64, &'a LenderRecord)>,
}

impl LeverCheck<'_> {
    fn shorter_term(&self) -> Option<LeverageHint> {
        let term = SHORTER_TERMS_MONTHS
            .into_iter()
            .filter(|term| *term < self.deal.loan_term_months)
            .find(|term| self.inputs.estimate(*term).meets(self.required_ltv))?;

        Some(LeverageHint::new(
            Lever::ShorterTerm,
            self.lender,
            format!("A {term}-month term reduces retained interest enough to meet the required LTV"),
        ))
    }

    fn serviced_interest(&self) -> Option<LeverageHint> {
        if !is_affirmative(&folded(self.lender, LogicalField::ServicedInterest)) {
            return None;
        }
        self.inputs
            .serviced_estimate()
            .meets(self.required_ltv)
            .then(|| {
                LeverageHint::new(
                    Lever::ServicedInterest,
                    self.lender,
                    "Servicing interest monthly avoids the retained interest deduction",
                )
            })
    }

    fn light_refurbishment(&self) -> Option<LeverageHint> {
        if self.deal.is_refurb {
            return None;
        }

        let (day_one_ltv, net_basis) = [LogicalField::DayOneAdvance, LogicalField::DayOneLtv]
            .into_iter()
            .map(|logical| folded(self.lender, logical))
            .find_map(|text| parse_percentage(&text).map(|ltv| (ltv, text.contains("net"))))?;

        self.inputs
            .with_headline(day_one_ltv, net_basis)
            .estimate(self.deal.loan_term_months)
            .meets(self.required_ltv)
            .then(|| {
                LeverageHint::new(
                    Lever::LightRefurbishment,
                    self.lender,
                    "Structuring as a light refurbishment unlocks a higher day-1 advance",
                )
            })
    }

    fn below_market_value(&self) -> Option<LeverageHint> {
        let bmv_ltv = parse_percentage(&folded(self.lender, LogicalField::BelowMarketValueLtv))?;
        (bmv_ltv > self.inputs.gross_ltv).then(|| {
            LeverageHint::new(
                Lever::BelowMarketValue,
                self.lender,
                "Publishes a higher LTV for below-market-value purchases",
            )
        })
    }

    fn additional_security(&self) -> Option<LeverageHint> {
        if self.deal.charge_position != ChargePosition::First {
            return None;
        }
        offers_supporting_second_charge(self.lender).then(|| {
            LeverageHint::new(
                Lever::AdditionalSecurity,
                self.lender,
                "A supporting 2nd charge over other property could bring the effective LTV down",
            )
        })
    }

    /// Re-prices the lender at the cheapest problem lender's rate.
    fn lower_rate(&self) -> Option<LeverageHint> {
        let (rate, cheapest) = self.benchmark?;
        if self.inputs.net_basis || self.inputs.monthly_rate_pct <= rate {
            return None;
        }

        self.inputs
            .with_monthly_rate(rate)
            .estimate(self.deal.loan_term_months)
            .meets(self.required_ltv)
            .then(|| {
                LeverageHint::new(
                    Lever::LowerRate,
                    self.lender,
                    format!(
                        "Would meet the required LTV at {}'s lower rate, worth negotiating on pricing",
                        cheapest.name()
                    ),
                )
            })
    }
}

/// Any supporting 2nd charge column, home-owner variants aside, publishes an available figure.
pub(crate) fn offers_supporting_second_charge(lender: &LenderRecord) -> bool {
    matching_keys(lender, SUPPORTING_SECOND_CHARGE)
        .filter(|key| !key.to_lowercase().contains("home"))
        .any(|key| publishes_figure(lender, key))
}

pub(crate) fn publishes_figure(lender: &LenderRecord, key: &str) -> bool {
    lender
        .get(key)
        .is_some_and(|cell| !is_unavailable(&cell.as_text()))
}

/// Lowest rate among the problem lenders, when the spread across them is wide enough to matter.
fn lowest_rate_benchmark<'a>(problem: &[&'a LenderRecord]) -> Option<(f64, &'a LenderRecord)> {
    let rated: Vec<(f64, &LenderRecord)> = problem
        .iter()
        .map(|lender| (monthly_rate(lender), *lender))
        .collect();

    let highest = rated.iter().map(|(rate, _)| *rate).fold(f64::MIN, f64::max);
    let cheapest = rated
        .into_iter()
        .min_by(|left, right| left.0.total_cmp(&right.0))?;
    (highest - cheapest.0 >= MIN_RATE_SPREAD_PCT).then_some(cheapest)
}

fn summarize(hints: &[LeverageHint]) -> Option<String> {
    let parts: Vec<String> = Lever::ordered()
        .into_iter()
        .filter_map(|lever| {
            let names: Vec<&str> = hints
                .iter()
                .filter(|hint| hint.lever == lever)
                .take(SUMMARY_NAMES_PER_LEVER)
                .map(|hint| hint.lender.as_str())
                .collect();
            (!names.is_empty()).then(|| format!("{}: {}", lever.label(), names.join(", ")))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("; "))
}
