use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use bridging_brain::advisor::{
    advisor_router, AdvisorClient, AdvisorService, ConversationStore, FeedbackStore,
};
use bridging_brain::matching::{matching_router, MatchingService};
use bridging_brain::reference::ReferenceData;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<C, F, A>(
    matching: Arc<MatchingService>,
    advisor: Arc<AdvisorService<C, F, A>>,
) -> axum::Router
where
    C: ConversationStore + 'static,
    F: FeedbackStore + 'static,
    A: AdvisorClient + 'static,
{
    matching_router(matching)
        .merge(advisor_router(advisor))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/config", get(reference_endpoint))
}

pub(crate) async fn healthcheck(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "lender_count": state.catalogue.len(),
        "ai_available": state.ai_available,
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn reference_endpoint() -> Json<ReferenceData> {
    Json(ReferenceData::standard())
}
