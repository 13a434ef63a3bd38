use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::advisor::client::{AdvisorClient, AdvisorError, AdvisorRequest};
use crate::advisor::repository::{
    ChatTurn, ConversationStore, FeedbackRecord, FeedbackStore, StoreError,
};
use crate::advisor::AdvisorService;
use crate::catalogue::{Catalogue, CatalogueStore};
use crate::lenders::LenderRecord;
use crate::matching::DealParameters;

pub(super) type TestService = AdvisorService<MemoryConversations, MemoryFeedback, ScriptedAdvisor>;

pub(super) fn catalogue_store() -> Arc<CatalogueStore> {
    let lenders = vec![
        LenderRecord::from_pairs([
            ("name", "Atlas Bridging"),
            ("minimum_loan_size", "£100,000"),
            ("max_ltv_1st_charge_residential_investment_property", "75%"),
            ("email_address_for_new_enquiries", "deals@atlas.example"),
        ])
        .expect("named record"),
        LenderRecord::from_pairs([("name", "Harbour Capital"), ("minimum_loan_size", "£1,000,000")])
            .expect("named record"),
    ];
    Arc::new(CatalogueStore::new(Catalogue::new(lenders)))
}

pub(super) fn deal() -> DealParameters {
    DealParameters::new(500_000.0, 1_000_000.0)
}

pub(super) fn build_service(
    advisor: ScriptedAdvisor,
    rate_limit: usize,
) -> (TestService, Arc<MemoryConversations>, Arc<ScriptedAdvisor>) {
    let conversations = Arc::new(MemoryConversations::default());
    let advisor = Arc::new(advisor);
    let service = AdvisorService::new(
        conversations.clone(),
        Arc::new(MemoryFeedback::default()),
        advisor.clone(),
        catalogue_store(),
        rate_limit,
    );
    (service, conversations, advisor)
}

#[derive(Default, Clone)]
pub(super) struct MemoryConversations {
    sessions: Arc<Mutex<HashMap<String, Vec<ChatTurn>>>>,
}

impl ConversationStore for MemoryConversations {
    fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .expect("conversation mutex poisoned")
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError> {
        let guard = self.sessions.lock().expect("conversation mutex poisoned");
        Ok(guard.get(session_id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryFeedback {
    records: Arc<Mutex<Vec<FeedbackRecord>>>,
}

impl FeedbackStore for MemoryFeedback {
    fn save(&self, record: FeedbackRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("feedback mutex poisoned")
            .push(record);
        Ok(())
    }

    fn recent(&self, lender: Option<&str>, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let guard = self.records.lock().expect("feedback mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| lender.map_or(true, |name| record.lender_name == name))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Advisor double that replays a fixed outcome and records the system context it saw.
pub(super) struct ScriptedAdvisor {
    reply: Result<String, String>,
    configured: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAdvisor {
    pub(super) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            configured: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            configured: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn unconfigured() -> Self {
        Self {
            reply: Err(String::new()),
            configured: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

impl AdvisorClient for ScriptedAdvisor {
    fn is_available(&self) -> bool {
        self.configured
    }

    fn complete(&self, request: AdvisorRequest<'_>) -> Result<String, AdvisorError> {
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(request.system.to_string());
        if !self.configured {
            return Err(AdvisorError::NotConfigured);
        }
        self.reply.clone().map_err(AdvisorError::Upstream)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
