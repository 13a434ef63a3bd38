use std::collections::{HashMap, HashSet};

/// Longest attribute key kept from a questionnaire header.
pub(crate) const MAX_HEADER_LEN: usize = 60;

/// Lower-case snake token: anything outside `[a-z0-9_]` becomes `_`, runs collapse.
pub(crate) fn clean_header(value: &str) -> String {
    let lowered = value.replace('\u{feff}', "").trim().to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let ch = if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(ch);
    }

    let trimmed = cleaned.trim_matches('_');
    trimmed.chars().take(MAX_HEADER_LEN).collect()
}

/// Cleans every header and suffixes repeats with `_1`, `_2`, ... in column order.
/// A suffix already taken by another column is skipped.
pub(crate) fn unique_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|header| {
            let cleaned = clean_header(header);
            if used.insert(cleaned.clone()) {
                return cleaned;
            }
            next_free(&mut used, &mut repeats, &cleaned)
        })
        .collect()
}

/// Next `{base}_{n}` not yet in `used`, recorded as taken.
pub(crate) fn next_free(
    used: &mut HashSet<String>,
    repeats: &mut HashMap<String, usize>,
    base: &str,
) -> String {
    let count = repeats.entry(base.to_string()).or_insert(0);
    loop {
        *count += 1;
        let candidate = format!("{base}_{count}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
}

#[cfg(test)]
pub(crate) fn clean_for_tests(value: &str) -> String {
    clean_header(value)
}

#[cfg(test)]
pub(crate) fn unique_for_tests(headers: &[&str]) -> Vec<String> {
    unique_headers(headers.iter().copied())
}
