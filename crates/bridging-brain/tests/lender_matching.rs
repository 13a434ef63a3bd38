use bridging_brain::catalogue::{Catalogue, CatalogueImporter};
use bridging_brain::matching::{
    estimate_net_ltv_outcome, filter, refiner_facets, DealParameters, InputMode, Lever,
    NetAdvanceOutcome,
};

const FIXTURE: &[u8] = include_bytes!("fixtures/lender_questionnaire.csv");

fn catalogue() -> Catalogue {
    CatalogueImporter::from_reader(FIXTURE).expect("fixture imports")
}

fn deal(loan_amount: f64) -> DealParameters {
    DealParameters::new(loan_amount, 1_000_000.0)
}

fn names<'a>(results: impl IntoIterator<Item = &'a bridging_brain::matching::LenderResult>) -> Vec<&'a str> {
    results.into_iter().map(|result| result.name()).collect()
}

#[test]
fn comfortable_deal_partitions_with_reasons() {
    let catalogue = catalogue();
    let result = filter(catalogue.lenders(), &deal(500_000.0));

    assert_eq!(
        names(&result.eligible),
        vec!["Atlas Bridging", "Delta Lending", "Forge Funding"]
    );
    assert_eq!(result.summary.total, 6);
    assert_eq!(result.summary.ltv, 50.0);

    let reasons: Vec<(&str, String)> = result
        .excluded
        .iter()
        .map(|excluded| (excluded.name(), excluded.exclusion_reasons[0].summary()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("Beacon Finance", "Below minimum loan (£1,000,000)".to_string()),
            ("Crown Capital", "Doesn't lend on residential".to_string()),
            ("Ember Bridging", "Doesn't lend in England".to_string()),
        ]
    );

    let atlas = result.find("Atlas Bridging").expect("atlas evaluated");
    assert!(atlas.exclusion_reasons.is_empty());
    assert_eq!(
        atlas.net_advance.as_ref().map(|assessment| assessment.outcome),
        Some(NetAdvanceOutcome::Comfortable)
    );
    assert!(!result.leverage_hints.active);
    assert_eq!(
        result.security_hints.message.as_deref(),
        Some("Additional security could expand options: 1 lenders offer supporting 2nd charge")
    );
}

#[test]
fn partition_covers_the_catalogue_exactly_once() {
    let catalogue = catalogue();
    for loan in [250_000.0, 500_000.0, 650_000.0, 900_000.0] {
        let result = filter(catalogue.lenders(), &deal(loan));

        let mut seen: Vec<&str> = names(result.eligible.iter().chain(&result.excluded));
        seen.sort_unstable();
        let mut expected: Vec<&str> = catalogue.lenders().iter().map(|lender| lender.name()).collect();
        expected.sort_unstable();

        assert_eq!(seen, expected, "loan {loan}");
        assert!(result.eligible.iter().all(|lender| lender.exclusion_reasons.is_empty()));
        assert!(result.excluded.iter().all(|lender| !lender.exclusion_reasons.is_empty()));
    }
}

#[test]
fn filtering_is_idempotent() {
    let catalogue = catalogue();
    let deal = deal(650_000.0);
    assert_eq!(filter(catalogue.lenders(), &deal), filter(catalogue.lenders(), &deal));
}

#[test]
fn raising_the_loan_never_adds_eligible_lenders() {
    let catalogue = catalogue();
    let mut previous: Option<Vec<String>> = None;

    for loan in [400_000.0, 500_000.0, 600_000.0, 650_000.0, 700_000.0, 800_000.0] {
        let result = filter(catalogue.lenders(), &deal(loan));
        let eligible: Vec<String> = result
            .eligible
            .iter()
            .map(|lender| lender.name().to_string())
            .collect();

        if let Some(previous) = &previous {
            assert!(
                eligible.iter().all(|name| previous.contains(name)),
                "loan {loan} admitted a lender excluded at a lower loan"
            );
        }
        previous = Some(eligible);
    }
}

#[test]
fn tight_deal_surfaces_leverage_hints() {
    let catalogue = catalogue();
    let result = filter(catalogue.lenders(), &deal(650_000.0));

    assert_eq!(names(&result.eligible), vec!["Atlas Bridging", "Forge Funding"]);
    let delta = result.find("Delta Lending").expect("delta evaluated");
    assert_eq!(
        delta.exclusion_reasons[0].summary(),
        "Net advance after fees and retained interest unlikely to meet required LTV"
    );

    let atlas = result.find("Atlas Bridging").expect("atlas evaluated");
    assert!(atlas.net_advance_is_tight());

    let hints = &result.leverage_hints;
    assert!(hints.active);
    assert!(!hints.tight_ltv);
    assert_eq!(hints.problem_lenders, 2);
    assert_eq!(hints.for_lever(Lever::LowerRate).count(), 0);
    assert_eq!(
        hints.summary.as_deref(),
        Some(
            "Shorter term: Atlas Bridging; Serviced interest: Atlas Bridging; \
             Additional security: Atlas Bridging"
        )
    );
}

#[test]
fn deposit_mode_matches_the_equivalent_loan() {
    let catalogue = catalogue();
    let by_deposit = DealParameters {
        input_mode: InputMode::Deposit,
        purchase_price: Some(650_000.0),
        deposit_available: Some(150_000.0),
        ..deal(0.0)
    };

    let result = filter(catalogue.lenders(), &by_deposit);
    let direct = filter(catalogue.lenders(), &deal(500_000.0));

    assert_eq!(names(&result.eligible), names(&direct.eligible));
    assert_eq!(result.summary.ltv, 50.0);
}

#[test]
fn refiner_counts_stay_within_the_refined_set() {
    let catalogue = catalogue();
    let base_deal = deal(500_000.0);
    let result = filter(catalogue.lenders(), &base_deal);

    let base = refiner_facets(&base_deal, result.eligible_lenders());
    assert_eq!(base.base_count, 3);
    assert_eq!(base.refined_count, 3);
    assert!(base.all().all(|facet| facet.remaining > 0 && facet.remaining <= 3));

    let count = |facets: &bridging_brain::matching::RefinerFacets, key: &str| {
        facets
            .all()
            .find(|facet| facet.key == key)
            .map(|facet| facet.remaining)
    };
    assert_eq!(count(&base, "foreign_national"), Some(1));
    assert_eq!(count(&base, "serviced_interest"), Some(1));
    assert_eq!(count(&base, "speed"), Some(1));

    let refined_deal = DealParameters {
        active_refiners: ["foreign_national".to_string()].into_iter().collect(),
        ..base_deal
    };
    let refined = refiner_facets(&refined_deal, result.eligible_lenders());
    assert_eq!(refined.refined_count, 1);
    for facet in refined.all() {
        assert!(facet.remaining <= refined.refined_count);
        let before = count(&base, facet.key.as_str()).unwrap_or(usize::MAX);
        assert!(facet.remaining <= before, "{} grew after refining", facet.key);
    }
}

#[test]
fn public_net_estimate_reports_only_the_classification() {
    let catalogue = catalogue();
    let delta = catalogue.find_by_name("Delta Lending").expect("delta present");

    let assessment = estimate_net_ltv_outcome(delta, 50.0, 12).expect("delta publishes an LTV");
    assert_eq!(assessment.outcome, NetAdvanceOutcome::Passes);
    assert!(!assessment.is_net_lender);

    let payload = serde_json::to_string(&assessment).expect("serialize");
    assert!(!payload.contains("51.6"));

    let crown = catalogue.find_by_name("Crown Capital").expect("crown present");
    assert!(estimate_net_ltv_outcome(crown, 50.0, 12).is_none());
}
