//! Context document handed to the advisor alongside the conversation.

use super::repository::FeedbackRecord;
use crate::lenders::contact::notes_excerpt;
use crate::lenders::schema::resolve_key;
use crate::lenders::values::format_currency;
use crate::lenders::{LenderContact, LenderRecord};
use crate::matching::{DealParameters, FilterResult, InputMode, LenderResult};
use std::fmt::Write;

pub const MAX_CONTEXT_LENDERS: usize = 30;
pub const MAX_NOTES_CHARS: usize = 500;
pub const MAX_FEEDBACK_ITEMS: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are Bridging Brain, an assistant helping UK brokers place \
bridging finance deals with suitable lenders.

Only state facts present in the lender data below. When a field is missing, say it is not \
specified in the lender's criteria. Never invent calculations, market commentary or policies.

Brokers are experienced: be direct and technically precise. Cite rates, fees and LTVs from the \
data on the first answer. Treat any LTV column marked NOT AVAILABLE as a product the lender does \
not offer, and flag tight LTV positions up front.";

const LTV_COLUMNS: [(&str, &str); 5] = [
    ("LTV_residential_1st", "1st_charge_residential"),
    ("LTV_semi_commercial", "semi_commercial_mixed_use"),
    ("LTV_commercial", "fully_commercial"),
    ("LTV_land_no_planning", "land_without_planning"),
    ("LTV_land_with_planning", "land_with_planning"),
];

const KEY_FIELDS: [(&str, &str); 14] = [
    ("rate_band", "approximate_interest_rate_band"),
    ("proc_fee", "typical_proc_fee"),
    ("min_loan", "minimum_loan_size"),
    ("max_loan", "maximum_loan_size"),
    ("min_months", "minimum_number_of_months_interest"),
    ("exit_fees", "charge_exit_fees"),
    ("regulated", "regulated_bridging_offered"),
    ("serviced_interest", "serviced_interest_allowed"),
    ("funding_model", "funding_model"),
    ("dual_legal", "dual_legal_rep"),
    ("indemnity", "indemnity"),
    ("foreign_nationals", "lend_to_foreign_nationals"),
    ("expats", "lend_to_expats"),
    ("geo_exclusions", "which_geographies_don_t_you_lend_in"),
];

/// Renders deal essentials, the filter summary and eligible lender data as markdown.
pub fn build_lender_context(deal: Option<&DealParameters>, result: &FilterResult) -> String {
    let mut context =
        String::from("## DEAL ESSENTIALS ALREADY PROVIDED (DO NOT ASK FOR THESE AGAIN)\n\n");
    if let Some(deal) = deal {
        write_deal(&mut context, deal);
    }

    let summary = &result.summary;
    let _ = write!(
        context,
        "\n## Current Filtering Results\n\n\
         - **Calculated LTV**: {:.1}%\n\
         - **Works Ratio**: {:.1}%\n\
         - **Eligible Lenders**: {}\n\
         - **Excluded (hard knockouts)**: {}\n",
        summary.ltv, summary.works_ratio, summary.eligible, summary.excluded
    );
    if let Some(hint) = &result.leverage_hints.summary {
        let _ = writeln!(context, "- **Leverage options**: {hint}");
    }
    if let Some(message) = &result.security_hints.message {
        let _ = writeln!(context, "- **Security**: {message}");
    }

    context.push_str("\n## Eligible Lenders Data\n\n");
    for lender in result.eligible.iter().take(MAX_CONTEXT_LENDERS) {
        write_lender(&mut context, lender);
    }
    context
}

/// Appends the most recent broker feedback, if any.
pub fn feedback_context(feedback: &[FeedbackRecord]) -> String {
    if feedback.is_empty() {
        return String::new();
    }

    let mut context = String::from("\n## Previous Broker Feedback\n");
    for item in feedback.iter().take(MAX_FEEDBACK_ITEMS) {
        let _ = write!(context, "- {}: {}/5 stars", item.lender_name, item.rating);
        if let Some(text) = &item.feedback_text {
            let _ = write!(context, " - \"{text}\"");
        }
        context.push('\n');
    }
    context
}

fn write_deal(context: &mut String, deal: &DealParameters) {
    if deal.input_mode == InputMode::Deposit {
        context.push_str("- **Input Mode**: Deposit-driven (working back from available deposit)\n");
        let _ = writeln!(
            context,
            "- **Deposit Available**: {}",
            format_currency(deal.deposit_available.unwrap_or_default())
        );
        let _ = writeln!(
            context,
            "- **Calculated Loan Needed**: {}",
            format_currency(deal.effective_loan_amount())
        );
    } else {
        let _ = writeln!(context, "- **Loan Amount**: {}", format_currency(deal.loan_amount));
    }

    let _ = writeln!(context, "- **Transaction Type**: {}", deal.transaction_type.label());
    if let Some(price) = deal.purchase_price {
        let _ = writeln!(context, "- **Purchase Price**: {}", format_currency(price));
    }
    let _ = writeln!(context, "- **Market Value**: {}", format_currency(deal.market_value));
    let _ = writeln!(context, "- **Property Type**: {}", deal.property_type.label());
    let _ = writeln!(context, "- **Charge Position**: {}", deal.charge_position.label());
    let _ = writeln!(context, "- **Geography**: {}", deal.geography);
    let _ = writeln!(context, "- **Entity Type**: {}", deal.entity_type.label());
    let _ = writeln!(context, "- **Regulated**: {}", yes_no(deal.is_regulated));
    let _ = writeln!(context, "- **Refurbishment**: {}", yes_no(deal.is_refurb));
    if let Some(works) = deal.cost_of_works.filter(|_| deal.is_refurb) {
        let _ = writeln!(context, "- **Cost of Works**: {}", format_currency(works));
    }
    let _ = writeln!(context, "- **Loan Term**: {} months", deal.loan_term_months);
}

fn write_lender(context: &mut String, result: &LenderResult) {
    let lender = &result.lender;
    let _ = writeln!(context, "### {}", lender.name());

    for (label, token) in LTV_COLUMNS {
        let Some(value) = resolved_text(lender, token) else {
            continue;
        };
        if value.is_empty() {
            let _ = writeln!(context, "- {label}: NOT AVAILABLE");
        } else {
            let _ = writeln!(context, "- {label}: {value}");
        }
    }

    for (label, token) in KEY_FIELDS {
        if let Some(value) = resolved_text(lender, token).filter(|value| !value.is_empty()) {
            let _ = writeln!(context, "- {label}: {value}");
        }
    }

    if let Some(notes) = notes_excerpt(lender, MAX_NOTES_CHARS) {
        let _ = writeln!(context, "- Notes: {notes}");
    }
    if let Some(assessment) = &result.net_advance {
        let _ = writeln!(context, "- Net advance: {}", assessment.message);
    }
    if let Some(contact) = LenderContact::from_record(lender) {
        let _ = writeln!(
            context,
            "- **Contact**: {} | {} | {}",
            contact.bdm_name, contact.email, contact.phone
        );
    }
    context.push('\n');
}

/// Trimmed text of the first matching column; `Some("")` when the column exists but is blank.
fn resolved_text(lender: &LenderRecord, token: &str) -> Option<String> {
    let key = resolve_key(lender, token)?;
    lender.get(key).map(|value| value.as_text().trim().to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
