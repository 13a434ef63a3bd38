use bridging_brain::catalogue::{CatalogueImporter, CatalogueStore};
use bridging_brain::error::AppError;
use bridging_brain::matching::{
    ChargePosition, DealParameters, EntityType, FilterResult, InputMode, LenderResult,
    MatchingService, PropertyType, RefinerFacet, RefinerFacets, TransactionType,
};
use clap::Args;
use serde::de::DeserializeOwned;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Lender questionnaire CSV export
    #[arg(long)]
    pub(crate) catalogue: PathBuf,
    /// Requested loan amount in pounds
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Market value of the security in pounds
    #[arg(long)]
    pub(crate) market_value: f64,
    /// Purchase price, used with --deposit to derive the loan
    #[arg(long)]
    pub(crate) purchase_price: Option<f64>,
    /// Deposit available; switches the deal to deposit mode
    #[arg(long)]
    pub(crate) deposit: Option<f64>,
    /// purchase or refinance
    #[arg(long, default_value = "purchase", value_parser = parse_wire::<TransactionType>)]
    pub(crate) transaction_type: TransactionType,
    /// residential, semi_commercial, commercial, land_with_pp or land_no_pp
    #[arg(long, default_value = "residential", value_parser = parse_wire::<PropertyType>)]
    pub(crate) property_type: PropertyType,
    /// 1st, 2nd_supporting, 2nd_standalone or equitable
    #[arg(long, default_value = "1st", value_parser = parse_wire::<ChargePosition>)]
    pub(crate) charge_position: ChargePosition,
    /// Borrower entity, e.g. individual, ltd_spv, trust
    #[arg(long, default_value = "individual", value_parser = parse_wire::<EntityType>)]
    pub(crate) entity_type: EntityType,
    #[arg(long, default_value = "England")]
    pub(crate) geography: String,
    #[arg(long, default_value_t = 12)]
    pub(crate) term_months: u32,
    /// Flag the deal as a refurbishment
    #[arg(long)]
    pub(crate) refurb: bool,
    #[arg(long)]
    pub(crate) cost_of_works: Option<f64>,
    /// Flag the deal as regulated bridging
    #[arg(long)]
    pub(crate) regulated: bool,
    /// Refiner key to apply; repeatable
    #[arg(long = "refiner")]
    pub(crate) refiners: Vec<String>,
    /// Print the raw filter and refiner payloads as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl MatchArgs {
    pub(crate) fn deal(&self) -> DealParameters {
        let mut deal = DealParameters::new(self.loan_amount, self.market_value);
        deal.purchase_price = self.purchase_price;
        deal.transaction_type = self.transaction_type;
        if let Some(deposit) = self.deposit {
            deal.input_mode = InputMode::Deposit;
            deal.deposit_available = Some(deposit);
        }
        deal.property_type = self.property_type;
        deal.geography = self.geography.clone();
        deal.charge_position = self.charge_position;
        deal.entity_type = self.entity_type;
        deal.loan_term_months = self.term_months;
        deal.is_refurb = self.refurb;
        deal.cost_of_works = self.cost_of_works;
        deal.is_regulated = self.regulated;
        deal.active_refiners = self.refiners.iter().cloned().collect();
        deal
    }
}

/// Parses a CLI value using the same spelling the JSON API accepts.
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| format!("unrecognised value '{raw}'"))
}

pub(crate) fn run_match_report(args: MatchArgs) -> Result<(), AppError> {
    let catalogue = CatalogueImporter::from_path(&args.catalogue)?;
    let service = MatchingService::new(Arc::new(CatalogueStore::new(catalogue)));
    let deal = args.deal();

    let result = service.filter(&deal);
    let facets = service.refiners(&deal);
    debug!(
        eligible = result.summary.eligible,
        excluded = result.summary.excluded,
        "match report computed"
    );

    if args.json {
        let payload = serde_json::json!({ "filter": result, "refiners": facets });
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("JSON output unavailable: {err}"),
        }
        return Ok(());
    }

    print!("{}", render_match_report(&deal, &result, &facets));
    Ok(())
}

pub(crate) fn render_match_report(
    deal: &DealParameters,
    result: &FilterResult,
    facets: &RefinerFacets,
) -> String {
    let mut out = String::new();
    let summary = &result.summary;

    let _ = writeln!(out, "Lender match");
    let _ = writeln!(
        out,
        "Loan £{:.0} against £{:.0} ({:.1}% LTV, {} months, {})",
        deal.effective_loan_amount(),
        deal.market_value,
        summary.ltv,
        deal.loan_term_months,
        deal.charge_position.label()
    );
    if summary.works_ratio > 0.0 {
        let _ = writeln!(out, "Works ratio: {:.1}%", summary.works_ratio);
    }
    let _ = writeln!(
        out,
        "{} lenders checked | {} eligible | {} excluded",
        summary.total, summary.eligible, summary.excluded
    );

    let _ = writeln!(out, "\nEligible lenders");
    if result.eligible.is_empty() {
        let _ = writeln!(out, "- none");
    }
    for lender in &result.eligible {
        let _ = writeln!(out, "- {}", eligible_line(lender));
    }

    if !result.excluded.is_empty() {
        let _ = writeln!(out, "\nExcluded lenders");
        for lender in &result.excluded {
            let reasons: Vec<String> = lender
                .exclusion_reasons
                .iter()
                .map(ToString::to_string)
                .collect();
            let _ = writeln!(out, "- {}: {}", lender.name(), reasons.join("; "));
        }
    }

    let leverage = &result.leverage_hints;
    if leverage.active {
        let _ = writeln!(
            out,
            "\nLeverage hints ({} lenders short or tight on net advance)",
            leverage.problem_lenders
        );
        for hint in &leverage.hints {
            let _ = writeln!(out, "- {} | {}: {}", hint.label, hint.lender, hint.note);
        }
        if let Some(line) = &leverage.summary {
            let _ = writeln!(out, "Summary: {line}");
        }
    }

    if let Some(message) = &result.security_hints.message {
        let _ = writeln!(out, "\nAdditional security: {message}");
    }

    let _ = writeln!(
        out,
        "\nRefiners ({} eligible, {} after active refiners)",
        facets.base_count, facets.refined_count
    );
    for (label, group) in [
        ("Borrower", &facets.borrower),
        ("Deal", &facets.deal),
        ("Product", &facets.product),
    ] {
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{label}");
        for facet in group {
            let _ = writeln!(out, "  - {}", facet_line(facet));
        }
    }

    out
}

fn eligible_line(lender: &LenderResult) -> String {
    match &lender.net_advance {
        Some(assessment) if !assessment.message.is_empty() => {
            format!("{} ({})", lender.name(), assessment.message)
        }
        _ => lender.name().to_string(),
    }
}

fn facet_line(facet: &RefinerFacet) -> String {
    if facet.active {
        format!("{}: {} [active]", facet.label, facet.remaining)
    } else {
        format!("{}: {}", facet.label, facet.remaining)
    }
}
