use super::normalizer::{next_free, unique_headers};
use crate::lenders::{CellValue, LenderRecord, NAME_KEY};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use tracing::warn;

#[derive(Debug)]
pub(crate) struct ParsedCatalogue {
    pub(crate) lenders: Vec<LenderRecord>,
    pub(crate) skipped_blank: usize,
    pub(crate) skipped_duplicate: usize,
}

#[derive(Debug)]
pub(crate) enum ParseError {
    Csv(csv::Error),
    MissingNameColumn,
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(crate) fn parse_catalogue<R: Read>(reader: R) -> Result<ParsedCatalogue, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let mut headers = unique_headers(csv_reader.headers()?.iter());
    let name_index = name_column(&headers).ok_or(ParseError::MissingNameColumn)?;
    claim_name_column(&mut headers, name_index);

    let mut parsed = ParsedCatalogue {
        lenders: Vec::new(),
        skipped_blank: 0,
        skipped_duplicate: 0,
    };
    let mut seen_names: HashSet<String> = HashSet::new();

    for row in csv_reader.records() {
        let row = row?;
        let attributes: Vec<(String, CellValue)> = headers
            .iter()
            .enumerate()
            .map(|(index, key)| (key.clone(), CellValue::from_raw(row.get(index).unwrap_or(""))))
            .collect();

        let Some(lender) = LenderRecord::from_attributes(attributes) else {
            parsed.skipped_blank += 1;
            continue;
        };

        if !seen_names.insert(lender.name().to_lowercase()) {
            warn!(lender = lender.name(), "dropping duplicate lender row");
            parsed.skipped_duplicate += 1;
            continue;
        }
        parsed.lenders.push(lender);
    }

    Ok(parsed)
}

/// First header naming the lender, falling back to a bare `name` column.
fn name_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.contains("name") && header.contains("lender"))
        .or_else(|| headers.iter().position(|header| header == NAME_KEY))
}

/// Renames the lender column to `name`, moving any other bare `name` column aside.
fn claim_name_column(headers: &mut [String], name_index: usize) {
    let mut used: HashSet<String> = headers.iter().cloned().collect();
    let mut repeats = HashMap::new();
    for (index, header) in headers.iter_mut().enumerate() {
        if index != name_index && *header == NAME_KEY {
            *header = next_free(&mut used, &mut repeats, NAME_KEY);
        }
    }
    headers[name_index] = NAME_KEY.to_string();
}

#[cfg(test)]
pub(crate) fn claim_name_for_tests(headers: &[&str], name_index: usize) -> Vec<String> {
    let mut headers: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
    claim_name_column(&mut headers, name_index);
    headers
}

#[cfg(test)]
pub(crate) fn name_column_for_tests(headers: &[&str]) -> Option<usize> {
    let headers: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
    name_column(&headers)
}
