//! Conversational advisor seams: context building, rate limiting, stores and HTTP routes.
//!
//! The completion service itself is a collaborator behind [`AdvisorClient`]; only an offline
//! implementation ships with the crate.

pub mod client;
pub mod context;
pub mod rate_limit;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use client::{AdvisorClient, AdvisorError, AdvisorRequest, OfflineAdvisor};
pub use context::{build_lender_context, feedback_context};
pub use rate_limit::SessionRateLimiter;
pub use repository::{
    ChatRole, ChatTurn, ConversationStore, FeedbackError, FeedbackRecord, FeedbackStore,
    FeedbackSubmission, StoreError,
};
pub use router::advisor_router;
pub use service::{AdvisorService, AdvisorServiceError, ChatReply, ChatRequest};
