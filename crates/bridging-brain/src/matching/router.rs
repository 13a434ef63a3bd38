use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::deal::DealParameters;
use super::service::{ContactLenderRequest, MatchingService, MatchingServiceError};

/// Router builder exposing the catalogue, filtering and lender contact endpoints.
pub fn matching_router(service: Arc<MatchingService>) -> Router {
    Router::new()
        .route("/api/v1/lenders", get(lenders_handler))
        .route("/api/v1/lenders/:name/contact", get(contact_handler))
        .route("/api/v1/filter", post(filter_handler))
        .route("/api/v1/refiners", post(refiners_handler))
        .route("/api/v1/contact-lender", post(contact_lender_handler))
        .with_state(service)
}

pub(crate) async fn lenders_handler(State(service): State<Arc<MatchingService>>) -> Response {
    (StatusCode::OK, axum::Json(service.lenders())).into_response()
}

pub(crate) async fn filter_handler(
    State(service): State<Arc<MatchingService>>,
    axum::Json(deal): axum::Json<DealParameters>,
) -> Response {
    let result = service.filter(&deal);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn refiners_handler(
    State(service): State<Arc<MatchingService>>,
    axum::Json(deal): axum::Json<DealParameters>,
) -> Response {
    let facets = service.refiners(&deal);
    (StatusCode::OK, axum::Json(facets)).into_response()
}

pub(crate) async fn contact_handler(
    State(service): State<Arc<MatchingService>>,
    Path(name): Path<String>,
) -> Response {
    match service.contact(&name) {
        Ok(details) => (StatusCode::OK, axum::Json(details)).into_response(),
        Err(error) => not_found(error),
    }
}

pub(crate) async fn contact_lender_handler(
    State(service): State<Arc<MatchingService>>,
    axum::Json(request): axum::Json<ContactLenderRequest>,
) -> Response {
    match service.contact_lender(&request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => not_found(error),
    }
}

fn not_found(error: MatchingServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}
