use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{KbEntryDraft, KbEntryId};
use super::review::ReviewQueue;
use super::service::{AskRequest, KnowledgeService, KnowledgeServiceError, SearchRequest};
use crate::error::AppError;

/// Router builder exposing knowledge-base search, gated answers and authoring.
pub fn knowledge_router<Q>(service: Arc<KnowledgeService<Q>>) -> Router
where
    Q: ReviewQueue + 'static,
{
    Router::new()
        .route("/api/v1/kb/search", post(search_handler::<Q>))
        .route("/api/v1/kb/ask", post(ask_handler::<Q>))
        .route("/api/v1/kb/entries", post(author_handler::<Q>))
        .route(
            "/api/v1/kb/entries/:entry_id/variants",
            post(regenerate_handler::<Q>),
        )
        .with_state(service)
}

/// Embedding may block, so every handler hops onto the blocking pool.
async fn run_blocking<Q, T, F>(
    service: Arc<KnowledgeService<Q>>,
    operation: F,
) -> Result<T, Response>
where
    Q: ReviewQueue + 'static,
    T: Send + 'static,
    F: FnOnce(&KnowledgeService<Q>) -> Result<T, KnowledgeServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || operation(&service)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error_response(error)),
        Err(join_error) => {
            let payload = json!({
                "error": format!("knowledge task failed: {join_error}"),
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response())
        }
    }
}

fn error_response(error: KnowledgeServiceError) -> Response {
    AppError::from(error).into_response()
}

pub(crate) async fn search_handler<Q>(
    State(service): State<Arc<KnowledgeService<Q>>>,
    axum::Json(request): axum::Json<SearchRequest>,
) -> Response
where
    Q: ReviewQueue + 'static,
{
    match run_blocking(service, move |service| service.search(&request)).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn ask_handler<Q>(
    State(service): State<Arc<KnowledgeService<Q>>>,
    axum::Json(request): axum::Json<AskRequest>,
) -> Response
where
    Q: ReviewQueue + 'static,
{
    match run_blocking(service, move |service| service.ask(&request)).await {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn author_handler<Q>(
    State(service): State<Arc<KnowledgeService<Q>>>,
    axum::Json(draft): axum::Json<KbEntryDraft>,
) -> Response
where
    Q: ReviewQueue + 'static,
{
    match run_blocking(service, move |service| service.author(draft)).await {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn regenerate_handler<Q>(
    State(service): State<Arc<KnowledgeService<Q>>>,
    Path(entry_id): Path<String>,
) -> Response
where
    Q: ReviewQueue + 'static,
{
    let id = KbEntryId(entry_id);
    match run_blocking(service, move |service| service.regenerate(&id)).await {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(response) => response,
    }
}
