use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::client::AdvisorClient;
use super::repository::{ConversationStore, FeedbackStore, FeedbackSubmission};
use super::service::{AdvisorService, AdvisorServiceError, ChatRequest};

pub const DEFAULT_FEEDBACK_LIMIT: usize = 20;

/// Router builder exposing chat and feedback endpoints.
pub fn advisor_router<C, F, A>(service: Arc<AdvisorService<C, F, A>>) -> Router
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    Router::new()
        .route("/api/v1/chat", post(chat_handler::<C, F, A>))
        .route("/api/v1/chat/new", post(new_session_handler::<C, F, A>))
        .route(
            "/api/v1/chat/history/:session_id",
            get(history_handler::<C, F, A>),
        )
        .route(
            "/api/v1/feedback",
            post(submit_feedback_handler::<C, F, A>).get(feedback_handler::<C, F, A>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedbackQuery {
    lender: Option<String>,
    limit: Option<usize>,
}

pub(crate) async fn chat_handler<C, F, A>(
    State(service): State<Arc<AdvisorService<C, F, A>>>,
    axum::Json(request): axum::Json<ChatRequest>,
) -> Response
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    match service.chat(request) {
        Ok(reply) => (StatusCode::OK, axum::Json(reply)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn new_session_handler<C, F, A>(
    State(service): State<Arc<AdvisorService<C, F, A>>>,
) -> Response
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    let payload = json!({ "session_id": service.new_session() });
    (StatusCode::CREATED, axum::Json(payload)).into_response()
}

pub(crate) async fn history_handler<C, F, A>(
    State(service): State<Arc<AdvisorService<C, F, A>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    match service.history(&session_id) {
        Ok(messages) => {
            let payload = json!({
                "session_id": session_id,
                "messages": messages,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_feedback_handler<C, F, A>(
    State(service): State<Arc<AdvisorService<C, F, A>>>,
    axum::Json(submission): axum::Json<FeedbackSubmission>,
) -> Response
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    match service.submit_feedback(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn feedback_handler<C, F, A>(
    State(service): State<Arc<AdvisorService<C, F, A>>>,
    Query(query): Query<FeedbackQuery>,
) -> Response
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_FEEDBACK_LIMIT);
    match service.feedback(query.lender.as_deref(), limit) {
        Ok(feedback) => {
            let payload = json!({ "feedback": feedback });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: AdvisorServiceError) -> Response {
    let status = match error {
        AdvisorServiceError::EmptyMessage | AdvisorServiceError::Feedback(_) => {
            StatusCode::BAD_REQUEST
        }
        AdvisorServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
