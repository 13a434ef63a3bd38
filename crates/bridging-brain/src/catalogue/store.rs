use super::Catalogue;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Holds the current catalogue snapshot. Readers take an `Arc` per pass, reloads swap it.
#[derive(Debug, Default)]
pub struct CatalogueStore {
    current: RwLock<Arc<Catalogue>>,
}

impl CatalogueStore {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalogue)),
        }
    }

    /// Consistent snapshot for the duration of one filtering pass.
    pub fn snapshot(&self) -> Arc<Catalogue> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, catalogue: Catalogue) {
        let lender_count = catalogue.len();
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalogue);
        info!(lender_count, "lender catalogue replaced");
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
