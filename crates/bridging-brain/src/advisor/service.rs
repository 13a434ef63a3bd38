use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::{AdvisorClient, AdvisorError, AdvisorRequest};
use super::context::{build_lender_context, feedback_context, MAX_FEEDBACK_ITEMS, SYSTEM_PROMPT};
use super::rate_limit::SessionRateLimiter;
use super::repository::{
    ChatRole, ChatTurn, ConversationStore, FeedbackError, FeedbackRecord, FeedbackStore,
    FeedbackSubmission, StoreError,
};
use crate::catalogue::CatalogueStore;
use crate::matching::{filter, DealParameters};

const OFFLINE_REPLY: &str = "The AI advisor is not configured. Set ADVISOR_API_KEY and connect \
a completion service to enable conversational guidance. Filtering, hints and refiners remain \
available.";

const NO_DEAL_CONTEXT: &str = "## DEAL ESSENTIALS\n\nNo deal parameters supplied yet. Ask for \
loan amount, market value, property type and charge position before recommending lenders.\n";

/// Chat message from a broker, optionally carrying the deal currently on screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub deal: Option<DealParameters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
    pub rate_limited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_count: Option<usize>,
}

/// Service wiring the advisor client to the catalogue, the stores and the rate limiter.
pub struct AdvisorService<C, F, A> {
    conversations: Arc<C>,
    feedback: Arc<F>,
    client: Arc<A>,
    catalogue: Arc<CatalogueStore>,
    limiter: SessionRateLimiter,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> String {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("session-{id:06}")
}

impl<C, F, A> AdvisorService<C, F, A>
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    pub fn new(
        conversations: Arc<C>,
        feedback: Arc<F>,
        client: Arc<A>,
        catalogue: Arc<CatalogueStore>,
        rate_limit_per_hour: usize,
    ) -> Self {
        Self {
            conversations,
            feedback,
            client,
            catalogue,
            limiter: SessionRateLimiter::per_hour(rate_limit_per_hour),
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    pub fn new_session(&self) -> String {
        next_session_id()
    }

    /// Answers a broker message. Advisor failures become the reply text.
    pub fn chat(&self, request: ChatRequest) -> Result<ChatReply, AdvisorServiceError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AdvisorServiceError::EmptyMessage);
        }

        let session_id = request
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(next_session_id);

        let now = Utc::now();
        if !self.limiter.check(&session_id, now) {
            return Ok(ChatReply {
                response: format!(
                    "Rate limit reached ({} queries/hour). Please wait before sending more queries.",
                    self.limiter.limit()
                ),
                session_id,
                rate_limited: true,
                eligible_count: None,
            });
        }

        let catalogue = self.catalogue.snapshot();
        let (lender_context, eligible_count) = match &request.deal {
            Some(deal) => {
                let result = filter(catalogue.lenders(), deal);
                let eligible = result.summary.eligible;
                (build_lender_context(Some(deal), &result), Some(eligible))
            }
            None => (NO_DEAL_CONTEXT.to_string(), None),
        };
        let recent = self.feedback.recent(None, MAX_FEEDBACK_ITEMS)?;
        let system = format!(
            "{SYSTEM_PROMPT}\n\n{lender_context}{}",
            feedback_context(&recent)
        );

        let history = self.conversations.history(&session_id)?;
        let completion = self.client.complete(AdvisorRequest {
            system: &system,
            history: &history,
            message,
        });

        let response = match completion {
            Ok(text) => {
                self.conversations
                    .append(&session_id, ChatTurn::new(ChatRole::User, message, now))?;
                self.conversations.append(
                    &session_id,
                    ChatTurn::new(ChatRole::Assistant, text.as_str(), Utc::now()),
                )?;
                info!(
                    session_id = session_id.as_str(),
                    eligible = eligible_count,
                    turns = history.len() + 2,
                    "advisor replied"
                );
                text
            }
            Err(AdvisorError::NotConfigured) => OFFLINE_REPLY.to_string(),
            Err(AdvisorError::Upstream(detail)) => {
                warn!(session_id = session_id.as_str(), %detail, "advisor call failed");
                format!("I encountered an error communicating with the AI service: {detail}")
            }
        };

        Ok(ChatReply {
            session_id,
            response,
            rate_limited: false,
            eligible_count,
        })
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, AdvisorServiceError> {
        Ok(self.conversations.history(session_id)?)
    }

    /// Validates and stores broker feedback on a lender.
    pub fn submit_feedback(
        &self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackRecord, AdvisorServiceError> {
        submission.validate()?;
        let record = submission.into_record(Utc::now());
        self.feedback.save(record.clone())?;
        info!(
            lender = record.lender_name.as_str(),
            rating = record.rating,
            "broker feedback saved"
        );
        Ok(record)
    }

    pub fn feedback(
        &self,
        lender: Option<&str>,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, AdvisorServiceError> {
        Ok(self.feedback.recent(lender, limit)?)
    }
}

/// Error raised by the advisor service.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorServiceError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
