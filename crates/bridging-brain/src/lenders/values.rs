//! Tolerant parsers for free-text questionnaire cells.
//!
//! Every parser is total: an unparseable cell yields `None`, never zero and never
//! an error. Callers substitute their documented defaults.

use regex::Regex;
use std::sync::OnceLock;

/// Proc fee assumed when a lender answers "negotiable" or "no set fee".
pub const NEGOTIABLE_PROC_FEE_PCT: f64 = 1.5;

static NUMBER_TOKEN: OnceLock<Regex> = OnceLock::new();

fn number_token() -> &'static Regex {
    NUMBER_TOKEN.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+)?|\.\d+").expect("number token pattern compiles")
    })
}

fn numbers(value: &str) -> impl Iterator<Item = f64> + '_ {
    number_token()
        .find_iter(value)
        .filter_map(|token| token.as_str().parse::<f64>().ok())
}

/// Parses amounts such as `£1,250,000`, `250k` or `1.5m`.
pub fn parse_currency(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|ch| !matches!(ch, '£' | '$' | '€' | ','))
        .collect();

    let token = number_token().find(&cleaned)?;
    let amount = token.as_str().parse::<f64>().ok()?;
    let multiplier = magnitude_suffix(&cleaned[token.end()..]);
    Some(amount * multiplier)
}

fn magnitude_suffix(rest: &str) -> f64 {
    let rest = rest.trim_start().to_ascii_lowercase();
    if rest.starts_with("million") || rest.starts_with("mn") {
        return 1_000_000.0;
    }

    let mut chars = rest.chars();
    let suffix = chars.next();
    let standalone = chars.next().map_or(true, |next| !next.is_alphabetic());
    match suffix {
        Some('k') if standalone => 1_000.0,
        Some('m') if standalone => 1_000_000.0,
        _ => 1.0,
    }
}

/// Whole-pound rendering with thousands separators, e.g. `£1,250,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-£{grouped}")
    } else {
        format!("£{grouped}")
    }
}

/// Parses percentages such as `75%`, `70% gross` or `65 net`.
pub fn parse_percentage(value: &str) -> Option<f64> {
    let cleaned = value
        .to_lowercase()
        .replace('%', "")
        .replace("gross", "")
        .replace("net", "");
    let first = numbers(&cleaned).next();
    first
}

/// Midpoint of a monthly rate band such as `0.75% - 1.0%`.
pub fn parse_rate_midpoint(value: &str) -> Option<f64> {
    let mut tokens = numbers(value);
    let first = tokens.next()?;
    match tokens.next() {
        Some(second) => Some((first + second) / 2.0),
        None => Some(first),
    }
}

/// Proc fee percentage, mapping "negotiable" and "no set" answers to an assumed fee.
pub fn parse_proc_fee(value: &str) -> Option<f64> {
    let folded = value.to_lowercase();
    if folded.contains("negotiable") || folded.contains("no set") {
        return Some(NEGOTIABLE_PROC_FEE_PCT);
    }
    parse_percentage(&folded)
}

/// Whole months from answers such as `3`, `3 months` or `1 month`.
pub fn parse_months(value: &str) -> Option<u32> {
    numbers(value)
        .next()
        .filter(|months| *months >= 0.0)
        .map(|months| months.floor() as u32)
}

/// Deal appetite score on the 0-3 questionnaire scale.
pub fn parse_appetite(value: &str) -> Option<u8> {
    numbers(value)
        .next()
        .filter(|score| *score >= 0.0)
        .map(|score| score.floor().min(u8::MAX as f64) as u8)
}

/// Case-insensitive "yes" anywhere in the answer.
pub fn is_affirmative(value: &str) -> bool {
    value.to_lowercase().contains("yes")
}

/// Case-insensitive "no" anywhere in the answer.
///
/// Plain substring test, so "No minimum" and "Not for HMOs"
/// both read as negative.
pub fn is_negative(value: &str) -> bool {
    value.to_lowercase().contains("no")
}

/// Negative answer that does not also contain a "yes".
pub fn is_negative_without_yes(value: &str) -> bool {
    is_negative(value) && !is_affirmative(value)
}

/// Sentinel answers meaning the product is not offered. Blank counts as unavailable.
pub fn is_unavailable(value: &str) -> bool {
    let folded = value.trim().to_lowercase();
    folded.is_empty()
        || folded.contains("not available")
        || folded.contains("n/a")
        || folded.contains("don't lend")
        || folded.contains("don\u{2019}t lend")
        || folded.contains("dont lend")
}
