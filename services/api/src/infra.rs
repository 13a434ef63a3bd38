use bridging_brain::advisor::{
    ChatTurn, ConversationStore, FeedbackRecord, FeedbackStore, StoreError,
};
use bridging_brain::catalogue::CatalogueStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalogue: Arc<CatalogueStore>,
    pub(crate) ai_available: bool,
}

/// Process-local chat history keyed by session id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryConversationStore {
    sessions: Arc<Mutex<HashMap<String, Vec<ChatTurn>>>>,
}

impl ConversationStore for InMemoryConversationStore {
    fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entry(session_id.to_string()).or_default().push(turn);
        Ok(())
    }

    fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError> {
        let guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(session_id).cloned().unwrap_or_default())
    }
}

/// Process-local feedback log.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFeedbackStore {
    records: Arc<Mutex<Vec<FeedbackRecord>>>,
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn save(&self, record: FeedbackRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(record);
        Ok(())
    }

    fn recent(&self, lender: Option<&str>, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let lender = lender.map(str::to_lowercase);
        Ok(guard
            .iter()
            .rev()
            .filter(|record| match &lender {
                Some(name) => record.lender_name.to_lowercase() == *name,
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
