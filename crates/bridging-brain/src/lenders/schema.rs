//! Schema adapter resolving logical field names to the keys present on a record.
//!
//! Each import derives its attribute set from spreadsheet headers, so keys are
//! matched by normalized substring containment. The first key in column order
//! that contains the token wins; ambiguity is not reported.

use super::record::{CellValue, LenderRecord};

/// Lower-cased token with every non-alphanumeric character removed.
pub fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the first attribute key whose normalized form contains the normalized token.
pub fn resolve_key<'a>(record: &'a LenderRecord, token: &str) -> Option<&'a str> {
    resolve_key_where(record, token, |_| true)
}

/// As [`resolve_key`], skipping keys rejected by `accept`.
pub fn resolve_key_where<'a, F>(record: &'a LenderRecord, token: &str, accept: F) -> Option<&'a str>
where
    F: Fn(&str) -> bool,
{
    let needle = normalize_token(token);
    if needle.is_empty() {
        return None;
    }

    record
        .attributes()
        .map(|(key, _)| key)
        .find(|key| normalize_token(key).contains(&needle) && accept(key))
}

/// Every attribute key containing the token, in column order.
pub fn matching_keys<'a>(record: &'a LenderRecord, token: &str) -> impl Iterator<Item = &'a str> + 'a {
    let needle = normalize_token(token);
    record
        .attributes()
        .map(|(key, _)| key)
        .filter(move |key| !needle.is_empty() && normalize_token(key).contains(&needle))
}

/// Looks up a single field by logical name. Absent when no key matches.
pub fn resolve_field<'a>(record: &'a LenderRecord, logical_name: &str) -> Option<&'a CellValue> {
    resolve_key(record, logical_name).and_then(|key| record.get(key))
}

/// Resolves a field from the declarative field table.
pub fn field(record: &LenderRecord, field: LogicalField) -> Option<&CellValue> {
    resolve_field(record, field.token())
}

/// Lower-cased text of a resolved field, empty when absent.
pub fn folded(record: &LenderRecord, logical: LogicalField) -> String {
    field(record, logical)
        .map(CellValue::folded)
        .unwrap_or_default()
}

/// Logical fields the engine reads, with the header token each one resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    MinimumLoan,
    MaximumLoan,
    RegulatedOffered,
    GeographyExclusions,
    RefurbishmentOffered,
    MediumWorks,
    HeavyWorks,
    VeryHeavyWorks,
    LendsToCharities,
    LendsToTrusts,
    LendsToLlps,
    LendsToPensions,
    LendsToOverseas,
    RateBand,
    ProcFee,
    MinimumInterestMonths,
    ServicedInterest,
    DayOneAdvance,
    DayOneLtv,
    BelowMarketValueLtv,
    StandardResidentialLtv,
    RegulatedLtv,
    LandWithPlanningLtv,
    LandWithoutPlanningLtv,
    CommercialLtv,
    SemiCommercialLtv,
    SupportingSecondChargeLtv,
    StandaloneSecondChargeLtv,
    EquitableChargeLtv,
    SupportingEquitableCharge,
    ForeignNationals,
    Expats,
    HeavyAdverse,
    Bankruptcy,
    FirstTimeBuyers,
    FirstTimeLandlords,
    StagedFunding,
    RefurbExperience,
    DualLegalRep,
    FlexibleFacility,
    AvmDesktop,
    AppetiteAuction,
    AppetiteHmoConversion,
    AppetiteCommercialToResidential,
    AppetiteProbate,
    ExitFees,
    FundingModel,
    Indemnity,
    NonOwnerOccupiers,
    NilNegativeAssets,
    LenderNotes,
    FreeTextNotes,
    BdmName,
    BdmEmail,
    BdmMobile,
    EnquiryEmail,
    EnquiryPhone,
}

/// Shared prefix of the truncated "deal appetite (0-3)" questionnaire headers.
const APPETITE: &str = "deal_appetite_0_won_t_consider_1_low_appetite_2_will_conside";

impl LogicalField {
    pub const fn token(self) -> &'static str {
        match self {
            Self::MinimumLoan => "minimum_loan_size",
            Self::MaximumLoan => "maximum_loan_size",
            Self::RegulatedOffered => "regulated_bridging_offered",
            Self::GeographyExclusions => "which_geographies_don_t_you_lend_in",
            Self::RefurbishmentOffered => "bridging_finance_for_properties_requiring_refurb",
            Self::MediumWorks => "fund_medium_works",
            Self::HeavyWorks => "fund_heavy_works",
            Self::VeryHeavyWorks => "fund_very_heavy_works",
            Self::LendsToCharities => "do_you_lend_to_charities",
            Self::LendsToTrusts => "do_you_lend_to_trusts",
            Self::LendsToLlps => "do_you_lend_to_limited_liability_partnerships",
            Self::LendsToPensions => "can_you_lend_to_sipps_ssas_pensions",
            Self::LendsToOverseas => "do_you_lend_to_overseas_entities",
            Self::RateBand => "approximate_interest_rate_band",
            Self::ProcFee => "typical_proc_fee",
            Self::MinimumInterestMonths => "minimum_number_of_months_interest",
            Self::ServicedInterest => "serviced_interest_allowed",
            Self::DayOneAdvance => "maximum_day_1_advance",
            Self::DayOneLtv => "maximum_day_1_ltv",
            Self::BelowMarketValueLtv => "bmv",
            Self::StandardResidentialLtv => "1st_charge_residential",
            Self::RegulatedLtv => "max_ltv_regulated",
            Self::LandWithPlanningLtv => "land_with_planning",
            Self::LandWithoutPlanningLtv => "land_without_planning",
            Self::CommercialLtv => "fully_commercial",
            Self::SemiCommercialLtv => "semi_commercial_mixed_use",
            Self::SupportingSecondChargeLtv => "supporting_2nd_charge_residential",
            Self::StandaloneSecondChargeLtv => "standalone_2nd_charge_resi",
            Self::EquitableChargeLtv => "equitable_charge",
            Self::SupportingEquitableCharge => "supporting_equitable",
            Self::ForeignNationals => "lend_to_foreign_nationals",
            Self::Expats => "lend_to_expats",
            Self::HeavyAdverse => "heavy_recent_adverse_accepted",
            Self::Bankruptcy => "bankrupcy_ivas_accepted",
            Self::FirstTimeBuyers => "lend_to_first_time_buyers",
            Self::FirstTimeLandlords => "lend_to_first_time_landlords",
            Self::StagedFunding => "arrears_staged_funding",
            Self::RefurbExperience => "minimum_borrower_experience_with_refurbs",
            Self::DualLegalRep => "dual_legal_rep",
            Self::FlexibleFacility => "flexible_rotating_credit_facility",
            Self::AvmDesktop => "use_avms_and_or_desktops",
            Self::AppetiteAuction => APPETITE,
            Self::AppetiteHmoConversion => concat!(
                "deal_appetite_0_won_t_consider_1_low_appetite_2_will_conside",
                "_3"
            ),
            Self::AppetiteCommercialToResidential => concat!(
                "deal_appetite_0_won_t_consider_1_low_appetite_2_will_conside",
                "_4"
            ),
            Self::AppetiteProbate => concat!(
                "deal_appetite_0_won_t_consider_1_low_appetite_2_will_conside",
                "_9"
            ),
            Self::ExitFees => "charge_exit_fees",
            Self::FundingModel => "funding_model",
            Self::Indemnity => "indemnity",
            Self::NonOwnerOccupiers => "lend_to_non_owner_occupiers",
            Self::NilNegativeAssets => "nil_or_negative_a_l",
            Self::LenderNotes => "lender_notes",
            Self::FreeTextNotes => "feel_free",
            Self::BdmName => "south_west_bdm_name",
            Self::BdmEmail => "south_west_bdm_email",
            Self::BdmMobile => "south_west_bdm_mobile",
            Self::EnquiryEmail => "email_address_for_new_enquiries",
            Self::EnquiryPhone => "central_number_for_new_enquiries",
        }
    }
}
