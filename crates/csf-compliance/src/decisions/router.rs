use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::DecisionType;
use super::registry::Rule;
use super::service::{DecisionRequest, DecisionService, DecisionServiceError};
use crate::error::AppError;

/// Router builder exposing decision evaluation and rule catalog endpoints.
pub fn decision_router(service: Arc<DecisionService>) -> Router {
    Router::new()
        .route("/api/v1/decisions/evaluate", post(evaluate_handler))
        .route(
            "/api/v1/decisions/:decision_type/rules",
            get(rules_handler),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct RuleCatalogView<'a> {
    pub decision_type: DecisionType,
    pub registry_version: &'a str,
    pub rules: &'a [Rule],
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<DecisionService>>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response {
    // Citation lookups embed text, which may block.
    let decision = tokio::task::spawn_blocking(move || service.decide(&request)).await;
    match decision {
        Ok(Ok(result)) => (StatusCode::OK, axum::Json(result)).into_response(),
        Ok(Err(error)) => AppError::from(error).into_response(),
        Err(join_error) => {
            let payload = json!({
                "error": format!("decision task failed: {join_error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn rules_handler(
    State(service): State<Arc<DecisionService>>,
    Path(decision_type): Path<String>,
) -> Response {
    match service.rules(&decision_type) {
        Ok((decision_type, rules)) => {
            let view = RuleCatalogView {
                decision_type,
                registry_version: service.registry().version(),
                rules,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(DecisionServiceError::UnknownDecisionType(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
