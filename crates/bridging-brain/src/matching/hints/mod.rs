//! Counterfactual hints computed from a finished partition.

mod leverage;
mod security;

pub use leverage::{
    generate_leverage_hints, Lever, LeverageHint, LeverageHints, MIN_RATE_SPREAD_PCT,
    SHORTER_TERMS_MONTHS, TIGHT_LTV_THRESHOLD,
};
pub use security::{
    generate_security_hints, SecurityHints, COMFORTABLE_ELIGIBLE_COUNT, LOW_ELIGIBLE_COUNT,
};
