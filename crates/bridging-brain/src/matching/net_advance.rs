//! Net advance estimation: what a lender's advertised gross LTV is worth after
//! the proc fee and retained interest are deducted on day one.
//!
//! The numeric estimate stays inside the crate. Only [`NetAdvanceAssessment`],
//! which carries a classification and a generic advisory message, is public.

use crate::lenders::schema::{field, LogicalField};
use crate::lenders::values::{parse_months, parse_percentage, parse_proc_fee, parse_rate_midpoint};
use crate::lenders::{CellValue, LenderRecord};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MINIMUM_MONTHS: u32 = 3;
pub const DEFAULT_MONTHLY_RATE_PCT: f64 = 1.0;
pub const DEFAULT_PROC_FEE_PCT: f64 = 2.0;
/// Shortfall band, as a percentage of the required LTV, treated as tight rather than failing.
pub const TIGHT_BAND_PCT: f64 = 5.0;
/// A below-market-value LTV at or above this level implies the lender quotes net figures.
pub const NET_BASIS_BMV_LTV: f64 = 90.0;

/// Classification of a lender's estimated net advance against the required LTV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetAdvanceOutcome {
    Fails,
    Warns,
    Passes,
    Comfortable,
}

impl NetAdvanceOutcome {
    pub(crate) fn from_shortfall(shortfall_pct: f64) -> Self {
        if shortfall_pct > TIGHT_BAND_PCT {
            Self::Fails
        } else if shortfall_pct > 0.0 {
            Self::Warns
        } else if shortfall_pct < -TIGHT_BAND_PCT {
            Self::Comfortable
        } else {
            Self::Passes
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fails => "Fails",
            Self::Warns => "Tight",
            Self::Passes => "Passes",
            Self::Comfortable => "Comfortable",
        }
    }

    fn message(self, is_net_lender: bool) -> &'static str {
        match (self, is_net_lender) {
            (Self::Fails, _) => {
                "Net advance after fees and retained interest unlikely to meet the required LTV"
            }
            (Self::Warns, true) => "Quoted net LTV is tight against the required LTV; confirm with lender",
            (Self::Warns, false) => {
                "Net advance may be tight once fees and retained interest are deducted; confirm with lender"
            }
            (Self::Passes, true) => "Quoted net LTV meets the required LTV",
            (Self::Passes, false) => {
                "Net advance expected to meet the required LTV after fees and retained interest"
            }
            (Self::Comfortable, true) => "Quoted net LTV comfortably covers the required LTV",
            (Self::Comfortable, false) => {
                "Net advance comfortably covers the required LTV after fees and retained interest"
            }
        }
    }
}

/// Public result of a net advance check. Never carries the estimated figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetAdvanceAssessment {
    pub outcome: NetAdvanceOutcome,
    pub comfortable: bool,
    pub is_net_lender: bool,
    pub message: String,
}

impl NetAdvanceAssessment {
    fn new(outcome: NetAdvanceOutcome, is_net_lender: bool) -> Self {
        Self {
            outcome,
            comfortable: outcome == NetAdvanceOutcome::Comfortable,
            is_net_lender,
            message: outcome.message(is_net_lender).to_string(),
        }
    }

    pub fn fails(&self) -> bool {
        self.outcome == NetAdvanceOutcome::Fails
    }

    pub fn is_tight(&self) -> bool {
        self.outcome == NetAdvanceOutcome::Warns
    }
}

/// Estimated net LTV in percent. Crate-private so the figure cannot reach a response.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub(crate) struct NetLtvEstimate(f64);

impl NetLtvEstimate {
    pub(crate) fn shortfall_pct(self, required_ltv: f64) -> f64 {
        if required_ltv <= 0.0 {
            return 0.0;
        }
        (required_ltv - self.0) * 100.0 / required_ltv
    }

    pub(crate) fn classify(self, required_ltv: f64) -> NetAdvanceOutcome {
        NetAdvanceOutcome::from_shortfall(self.shortfall_pct(required_ltv))
    }

    /// True when the estimate covers the requirement with no shortfall at all.
    pub(crate) fn meets(self, required_ltv: f64) -> bool {
        self.shortfall_pct(required_ltv) <= 0.0
    }

    #[cfg(test)]
    pub(crate) fn value(self) -> f64 {
        self.0
    }
}

/// Lender pricing inputs with parse defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NetAdvanceInputs {
    pub(crate) gross_ltv: f64,
    pub(crate) net_basis: bool,
    pub(crate) monthly_rate_pct: f64,
    pub(crate) proc_fee_pct: f64,
    pub(crate) minimum_months: u32,
}

impl NetAdvanceInputs {
    /// Reads pricing for the given LTV cell. `None` when the cell holds no usable percentage.
    pub(crate) fn from_lender(record: &LenderRecord, ltv_cell: &CellValue) -> Option<Self> {
        let ltv_text = ltv_cell.folded();
        let gross_ltv = parse_percentage(&ltv_text).filter(|ltv| *ltv > 0.0)?;
        let pricing = Pricing::from_lender(record);

        Some(Self {
            gross_ltv,
            net_basis: ltv_text.contains("net") || pricing.high_bmv_ltv,
            monthly_rate_pct: pricing.monthly_rate_pct,
            proc_fee_pct: pricing.proc_fee_pct,
            minimum_months: pricing.minimum_months,
        })
    }

    /// Same pricing applied to a different headline figure, e.g. a day-1 refurbishment advance.
    pub(crate) fn with_headline(self, gross_ltv: f64, net_basis: bool) -> Self {
        Self {
            gross_ltv,
            net_basis,
            ..self
        }
    }

    pub(crate) fn with_monthly_rate(self, monthly_rate_pct: f64) -> Self {
        Self {
            monthly_rate_pct,
            ..self
        }
    }

    pub(crate) fn estimate(&self, loan_term_months: u32) -> NetLtvEstimate {
        if self.net_basis {
            return NetLtvEstimate(self.gross_ltv);
        }

        let months_retained = loan_term_months.max(self.minimum_months);
        let deduction_pct = self.proc_fee_pct + self.monthly_rate_pct * f64::from(months_retained);
        NetLtvEstimate((self.gross_ltv * (1.0 - deduction_pct / 100.0)).max(0.0))
    }

    /// Interest serviced monthly: only the proc fee comes off the gross advance.
    pub(crate) fn serviced_estimate(&self) -> NetLtvEstimate {
        if self.net_basis {
            return NetLtvEstimate(self.gross_ltv);
        }
        NetLtvEstimate((self.gross_ltv * (1.0 - self.proc_fee_pct / 100.0)).max(0.0))
    }

    pub(crate) fn assess(&self, required_ltv: f64, loan_term_months: u32) -> NetAdvanceAssessment {
        let outcome = self.estimate(loan_term_months).classify(required_ltv);
        NetAdvanceAssessment::new(outcome, self.net_basis)
    }
}

struct Pricing {
    monthly_rate_pct: f64,
    proc_fee_pct: f64,
    minimum_months: u32,
    high_bmv_ltv: bool,
}

impl Pricing {
    fn from_lender(record: &LenderRecord) -> Self {
        let text = |logical: LogicalField| field(record, logical).map(CellValue::folded);

        Self {
            monthly_rate_pct: text(LogicalField::RateBand)
                .and_then(|band| parse_rate_midpoint(&band))
                .unwrap_or(DEFAULT_MONTHLY_RATE_PCT),
            proc_fee_pct: text(LogicalField::ProcFee)
                .and_then(|fee| parse_proc_fee(&fee))
                .unwrap_or(DEFAULT_PROC_FEE_PCT),
            minimum_months: text(LogicalField::MinimumInterestMonths)
                .and_then(|months| parse_months(&months))
                .unwrap_or(DEFAULT_MINIMUM_MONTHS),
            high_bmv_ltv: text(LogicalField::BelowMarketValueLtv)
                .and_then(|ltv| parse_percentage(&ltv))
                .is_some_and(|ltv| ltv >= NET_BASIS_BMV_LTV),
        }
    }
}

/// Monthly rate midpoint a lender advertises, with the documented default.
pub(crate) fn monthly_rate(record: &LenderRecord) -> f64 {
    Pricing::from_lender(record).monthly_rate_pct
}

/// Net advance check against the lender's standard 1st-charge residential LTV.
///
/// Returns `None` when the lender publishes no usable figure for that column.
pub fn estimate_net_ltv_outcome(
    lender: &LenderRecord,
    required_ltv: f64,
    loan_term_months: u32,
) -> Option<NetAdvanceAssessment> {
    let cell = field(lender, LogicalField::StandardResidentialLtv)?;
    NetAdvanceInputs::from_lender(lender, cell)
        .map(|inputs| inputs.assess(required_ltv, loan_term_months))
}
