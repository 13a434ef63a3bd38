use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::deal::DealParameters;
use super::refiners::{refiner_facets, RefinerFacets};
use super::revalidate::{revalidate, AlternativeLender, PresentationDetails};
use super::{filter, FilterResult};
use crate::catalogue::CatalogueStore;
use crate::lenders::contact::notes_excerpt;
use crate::lenders::LenderContact;

const CONTACT_NOTES_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LenderDirectory {
    pub total: usize,
    pub lenders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    pub lender_name: String,
    pub contact: Option<LenderContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Broker request to present a deal to a chosen lender.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactLenderRequest {
    pub lender_name: String,
    pub deal: DealParameters,
    #[serde(default)]
    pub details: PresentationDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactLenderResponse {
    pub lender_name: String,
    pub contact: Option<LenderContact>,
    pub still_fits: bool,
    pub warnings: Vec<String>,
    pub alternatives: Vec<AlternativeLender>,
}

/// Read-only matching operations over the current catalogue snapshot.
pub struct MatchingService {
    catalogue: Arc<CatalogueStore>,
}

impl MatchingService {
    pub fn new(catalogue: Arc<CatalogueStore>) -> Self {
        Self { catalogue }
    }

    pub fn lenders(&self) -> LenderDirectory {
        let catalogue = self.catalogue.snapshot();
        LenderDirectory {
            total: catalogue.len(),
            lenders: catalogue
                .lenders()
                .iter()
                .map(|lender| lender.name().to_string())
                .collect(),
        }
    }

    pub fn filter(&self, deal: &DealParameters) -> FilterResult {
        let catalogue = self.catalogue.snapshot();
        filter(catalogue.lenders(), deal)
    }

    /// Facet counts over the lenders that survive the knockouts for this deal.
    pub fn refiners(&self, deal: &DealParameters) -> RefinerFacets {
        let result = self.filter(deal);
        refiner_facets(deal, result.eligible_lenders())
    }

    pub fn contact(&self, name: &str) -> Result<ContactDetails, MatchingServiceError> {
        let catalogue = self.catalogue.snapshot();
        let lender = catalogue
            .find_by_name(name)
            .ok_or_else(|| MatchingServiceError::LenderNotFound(name.to_string()))?;

        Ok(ContactDetails {
            lender_name: lender.name().to_string(),
            contact: LenderContact::from_record(lender),
            notes: notes_excerpt(lender, CONTACT_NOTES_CHARS),
        })
    }

    /// Re-checks the chosen lender against the broker's presentation details.
    pub fn contact_lender(
        &self,
        request: &ContactLenderRequest,
    ) -> Result<ContactLenderResponse, MatchingServiceError> {
        let catalogue = self.catalogue.snapshot();
        let lender = catalogue
            .find_by_name(&request.lender_name)
            .ok_or_else(|| MatchingServiceError::LenderNotFound(request.lender_name.clone()))?;

        let outcome = revalidate(lender, &request.deal, &request.details, catalogue.lenders());
        info!(
            lender = lender.name(),
            still_fits = outcome.still_fits,
            warnings = outcome.warnings.len(),
            "lender revalidated for presentation"
        );

        Ok(ContactLenderResponse {
            lender_name: lender.name().to_string(),
            contact: LenderContact::from_record(lender),
            still_fits: outcome.still_fits,
            warnings: outcome.warnings,
            alternatives: outcome.alternative_suggestions,
        })
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error("lender not found: {0}")]
    LenderNotFound(String),
}
