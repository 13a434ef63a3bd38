//! Lender catalogue import from questionnaire CSV exports.

mod normalizer;
mod parser;
mod store;

pub use store::CatalogueStore;

use crate::lenders::LenderRecord;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum CatalogueImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingNameColumn,
}

impl std::fmt::Display for CatalogueImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueImportError::Io(err) => write!(f, "failed to read lender export: {}", err),
            CatalogueImportError::Csv(err) => write!(f, "invalid lender CSV data: {}", err),
            CatalogueImportError::MissingNameColumn => {
                write!(f, "lender export has no lender name column")
            }
        }
    }
}

impl std::error::Error for CatalogueImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogueImportError::Io(err) => Some(err),
            CatalogueImportError::Csv(err) => Some(err),
            CatalogueImportError::MissingNameColumn => None,
        }
    }
}

impl From<std::io::Error> for CatalogueImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogueImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<parser::ParseError> for CatalogueImportError {
    fn from(err: parser::ParseError) -> Self {
        match err {
            parser::ParseError::Csv(err) => Self::Csv(err),
            parser::ParseError::MissingNameColumn => Self::MissingNameColumn,
        }
    }
}

/// Immutable set of lender profiles with unique names, in export order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    lenders: Vec<LenderRecord>,
}

impl Catalogue {
    /// Builds a catalogue, keeping the first record for each case-insensitive name.
    pub fn new(lenders: Vec<LenderRecord>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let lenders = lenders
            .into_iter()
            .filter(|lender| seen.insert(lender.name().to_lowercase()))
            .collect();
        Self { lenders }
    }

    pub fn lenders(&self) -> &[LenderRecord] {
        &self.lenders
    }

    pub fn len(&self) -> usize {
        self.lenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lenders.is_empty()
    }

    /// Case-insensitive exact name match, else the first partial match.
    pub fn find_by_name(&self, name: &str) -> Option<&LenderRecord> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.lenders
            .iter()
            .find(|lender| lender.name().to_lowercase() == needle)
            .or_else(|| {
                self.lenders
                    .iter()
                    .find(|lender| lender.name().to_lowercase().contains(&needle))
            })
    }
}

pub struct CatalogueImporter;

impl CatalogueImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Catalogue, CatalogueImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Catalogue, CatalogueImportError> {
        let parsed = parser::parse_catalogue(reader)?;
        info!(
            lenders = parsed.lenders.len(),
            skipped_blank = parsed.skipped_blank,
            skipped_duplicate = parsed.skipped_duplicate,
            "imported lender catalogue"
        );
        Ok(Catalogue {
            lenders: parsed.lenders,
        })
    }
}
