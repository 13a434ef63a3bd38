use super::common::*;
use crate::matching::deal::{EntityType, PropertyType};
use crate::matching::knockout::{
    evaluate_lender, partition, rule_named, ExclusionReason, RuleInput, UnavailableProduct,
    WorksTier,
};
use crate::matching::{DealParameters, NetAdvanceOutcome};

fn reasons(deal: &DealParameters, pairs: &[(&str, &str)]) -> Vec<String> {
    evaluate_lender(deal, &lender(pairs))
        .exclusion_reasons
        .iter()
        .map(ExclusionReason::summary)
        .collect()
}

#[test]
fn every_failing_rule_is_reported_in_order() {
    let deal = DealParameters {
        geography: "Scotland".to_string(),
        is_regulated: true,
        ..deal()
    };

    let summaries = reasons(
        &deal,
        &[
            ("name", "Atlas"),
            ("minimum_loan_size", "£600,000"),
            ("regulated_bridging_offered", "No"),
            ("which_geographies_don_t_you_lend_in", "Scotland, Northern Ireland"),
        ],
    );

    assert_eq!(
        summaries,
        vec![
            "Below minimum loan (£600,000)",
            "Doesn't offer regulated bridging",
            "Doesn't lend in Scotland",
        ]
    );
}

#[test]
fn maximum_loan_uses_parsed_magnitudes() {
    let deal = DealParameters::new(2_500_000.0, 4_000_000.0);
    let result = evaluate_lender(&deal, &lender(&[("name", "Atlas"), ("maximum_loan_size", "£2m")]));

    assert_eq!(
        result.exclusion_reasons,
        vec![ExclusionReason::AboveMaximumLoan(2_000_000.0)]
    );
    assert_eq!(
        result.exclusion_reasons[0].summary(),
        "Above maximum loan (£2,000,000)"
    );
}

#[test]
fn zero_or_unparseable_limits_are_ignored() {
    let deal = deal();
    let input = RuleInput::new(&deal);
    let record = lender(&[
        ("name", "Atlas"),
        ("minimum_loan_size", "0"),
        ("maximum_loan_size", "TBC"),
    ]);

    assert_eq!((rule_named("minimum_loan").check)(&input, &record), None);
    assert_eq!((rule_named("maximum_loan").check)(&input, &record), None);
}

#[test]
fn blank_geography_skips_the_geography_rule() {
    let deal = DealParameters {
        geography: "  ".to_string(),
        ..deal()
    };
    let input = RuleInput::new(&deal);
    let record = lender(&[("name", "Atlas"), ("which_geographies_don_t_you_lend_in", "Wales")]);

    assert_eq!((rule_named("geography").check)(&input, &record), None);
}

#[test]
fn any_no_in_a_works_answer_reads_as_negative() {
    let refurb = DealParameters {
        is_refurb: true,
        cost_of_works: Some(400_000.0),
        ..deal()
    };
    let input = RuleInput::new(&refurb);
    assert_eq!(input.works_ratio, 40.0);

    let hedged = lender(&[("name", "Atlas"), ("fund_medium_works_30_50", "Yes - no limit")]);
    assert_eq!(
        (rule_named("works_tier").check)(&input, &hedged),
        Some(ExclusionReason::WorksNotFunded(WorksTier::Medium))
    );

    let plain = lender(&[("name", "Atlas"), ("fund_medium_works_30_50", "Yes")]);
    assert_eq!((rule_named("works_tier").check)(&input, &plain), None);
}

#[test]
fn refurbishment_rules_only_apply_to_refurb_deals() {
    let record = lender(&[
        ("name", "Atlas"),
        ("bridging_finance_for_properties_requiring_refurbishment", "No"),
        ("fund_heavy_works_50_100", "No"),
    ]);

    assert!(reasons(&deal(), &[("name", "Atlas"), ("fund_heavy_works_50_100", "No")]).is_empty());

    let heavy = DealParameters {
        is_refurb: true,
        cost_of_works: Some(600_000.0),
        ..deal()
    };
    assert_eq!(
        evaluate_lender(&heavy, &record).exclusion_reasons,
        vec![
            ExclusionReason::RefurbishmentNotOffered,
            ExclusionReason::WorksNotFunded(WorksTier::Heavy),
        ]
    );
}

#[test]
fn entity_answers_with_a_yes_are_accepted() {
    let trust = DealParameters {
        entity_type: EntityType::Trust,
        ..deal()
    };

    assert_eq!(
        reasons(&trust, &[("name", "Atlas"), ("do_you_lend_to_trusts", "Not at present")]),
        vec!["Doesn't lend to Trust"]
    );
    assert!(reasons(
        &trust,
        &[("name", "Atlas"), ("do_you_lend_to_trusts", "No, but yes for family trusts")]
    )
    .is_empty());
    assert!(reasons(&deal(), &[("name", "Atlas"), ("do_you_lend_to_trusts", "No")]).is_empty());
}

#[test]
fn unavailable_or_blank_ltv_columns_exclude() {
    let unavailable = evaluate_lender(&deal(), &lender(&[("name", "Atlas"), (RESIDENTIAL_LTV, "N/A")]));
    assert_eq!(
        unavailable.exclusion_reasons,
        vec![ExclusionReason::Unavailable(UnavailableProduct::Property(
            PropertyType::Residential
        ))]
    );
    assert_eq!(
        unavailable.exclusion_reasons[0].summary(),
        "Doesn't lend on residential"
    );

    let blank = evaluate_lender(&deal(), &lender(&[("name", "Atlas"), (RESIDENTIAL_LTV, "")]));
    assert!(!blank.is_eligible());

    let absent = evaluate_lender(&deal(), &lender(&[("name", "Atlas")]));
    assert!(absent.is_eligible());
    assert!(absent.net_advance.is_none());
}

#[test]
fn net_advance_shortfall_excludes_and_tight_lenders_stay_eligible() {
    // 60% gross less 2% fee and 12 months at 1% leaves 51.6% net.
    let atlas = priced_lender("Atlas", "60%", &[]);

    let failing = evaluate_lender(&deal_at_ltv(60.0), &atlas);
    assert_eq!(
        failing.exclusion_reasons,
        vec![ExclusionReason::NetAdvanceShortfall]
    );
    assert!(failing.net_advance_fails());
    assert!(failing.exclusion_reasons[0].is_leverage_shortfall());

    let tight = evaluate_lender(&deal_at_ltv(53.0), &atlas);
    assert!(tight.is_eligible());
    assert!(tight.net_advance_is_tight());

    let comfortable = evaluate_lender(&deal_at_ltv(40.0), &atlas);
    let assessment = comfortable.net_advance.expect("assessed");
    assert_eq!(assessment.outcome, NetAdvanceOutcome::Comfortable);
    assert!(assessment.comfortable);
}

#[test]
fn net_quoted_ltv_is_taken_at_face_value() {
    let atlas = priced_lender("Atlas", "58% net", &[]);

    let result = evaluate_lender(&deal_at_ltv(60.0), &atlas);
    let assessment = result.net_advance.as_ref().expect("assessed");
    assert!(assessment.is_net_lender);
    assert_eq!(assessment.outcome, NetAdvanceOutcome::Warns);
    assert!(result.is_eligible());
}

#[test]
fn categorical_exclusions_skip_the_net_advance_check() {
    let atlas = priced_lender("Atlas", "40%", &[("minimum_loan_size", "£1m")]);
    let result = evaluate_lender(&deal_at_ltv(60.0), &atlas);

    assert_eq!(
        result.exclusion_reasons,
        vec![ExclusionReason::BelowMinimumLoan(1_000_000.0)]
    );
    assert!(result.net_advance.is_none());
}

#[test]
fn partition_places_every_lender_once_in_catalogue_order() {
    let lenders = vec![
        priced_lender("Atlas", "75%", &[]),
        priced_lender("Beacon", "75%", &[("minimum_loan_size", "£750k")]),
        priced_lender("Crown", "N/A", &[]),
        priced_lender("Delta", "80%", &[]),
    ];

    let split = partition(&lenders, &deal());

    let eligible: Vec<&str> = split.eligible.iter().map(|result| result.name()).collect();
    let excluded: Vec<&str> = split.excluded.iter().map(|result| result.name()).collect();
    assert_eq!(eligible, vec!["Atlas", "Delta"]);
    assert_eq!(excluded, vec!["Beacon", "Crown"]);
    assert!(split
        .excluded
        .iter()
        .all(|result| !result.exclusion_reasons.is_empty()));
    assert!(split.eligible.iter().all(|result| result.calculated_ltv == 50.0));
}
