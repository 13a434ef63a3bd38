use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalogue::{Catalogue, CatalogueStore};
use crate::lenders::LenderRecord;
use crate::matching::{DealParameters, MatchingService};

pub(super) const RESIDENTIAL_LTV: &str = "max_ltv_1st_charge_residential_investment_property";

pub(super) fn lender(pairs: &[(&str, &str)]) -> LenderRecord {
    LenderRecord::from_pairs(pairs.iter().copied()).expect("named record")
}

/// 1% a month, 2% proc fee, three months minimum interest.
pub(super) fn priced_lender(name: &str, gross_ltv: &str, extra: &[(&str, &str)]) -> LenderRecord {
    let mut pairs = vec![
        ("name", name),
        ("approximate_interest_rate_band", "1%"),
        ("typical_proc_fee", "2%"),
        ("minimum_number_of_months_interest", "3"),
        (RESIDENTIAL_LTV, gross_ltv),
    ];
    pairs.extend_from_slice(extra);
    lender(&pairs)
}

pub(super) fn deal() -> DealParameters {
    DealParameters::new(500_000.0, 1_000_000.0)
}

pub(super) fn deal_at_ltv(ltv: f64) -> DealParameters {
    DealParameters::new(ltv * 10_000.0, 1_000_000.0)
}

pub(super) fn matching_service(lenders: Vec<LenderRecord>) -> Arc<MatchingService> {
    let store = Arc::new(CatalogueStore::new(Catalogue::new(lenders)));
    Arc::new(MatchingService::new(store))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
