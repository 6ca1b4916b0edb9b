use crate::infra::{AppState, Engine, InMemoryReviewQueue, ReviewTicket};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use csf_compliance::decisions::decision_router;
use csf_compliance::knowledge::knowledge_router;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ReviewQueueView {
    pub(crate) pending: usize,
    pub(crate) tickets: Vec<ReviewTicket>,
}

pub(crate) fn with_compliance_routes(engine: &Engine) -> axum::Router {
    decision_router(engine.decisions.clone())
        .merge(knowledge_router(engine.knowledge.clone()))
        .route("/api/v1/kb/reviews", get(review_queue_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(engine.queue.clone()))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
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

pub(crate) async fn review_queue_endpoint(
    Extension(queue): Extension<Arc<InMemoryReviewQueue>>,
) -> Json<ReviewQueueView> {
    let tickets = queue.tickets();
    Json(ReviewQueueView {
        pending: tickets.len(),
        tickets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use csf_compliance::config::RetrievalConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let engine = Engine::load(&RetrievalConfig::default()).expect("engine loads");
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        };
        with_compliance_routes(&engine).layer(Extension(state))
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post(uri: &str, payload: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reflects_the_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn decision_and_knowledge_routes_share_one_app() {
        let app = app(true);

        let decision = app
            .clone()
            .oneshot(post(
                "/api/v1/decisions/evaluate",
                json!({ "decision_type": "csf_facility", "evidence": {} }),
            ))
            .await
            .expect("router responds");
        assert_eq!(decision.status(), StatusCode::OK);
        assert_eq!(read_json(decision).await["outcome"], "blocked");

        let answer = app
            .oneshot(post(
                "/api/v1/kb/ask",
                json!({ "question": "How do I renew my DEA license?" }),
            ))
            .await
            .expect("router responds");
        assert_eq!(answer.status(), StatusCode::OK);
        let body = read_json(answer).await;
        assert_eq!(body["decision"]["status"], "answered");
        assert_eq!(body["decision"]["kb_entry_id"], "kb-dea-renewal");
    }

    #[tokio::test]
    async fn escalated_questions_appear_in_the_review_listing() {
        let app = app(true);

        let asked = app
            .clone()
            .oneshot(post(
                "/api/v1/kb/ask",
                json!({ "question": "What time does the cafeteria open on weekends?" }),
            ))
            .await
            .expect("router responds");
        let body = read_json(asked).await;
        assert_eq!(body["decision"]["status"], "escalate");
        let ticket = body["review_ticket"].as_str().expect("ticket issued").to_string();

        let listing = app
            .oneshot(
                Request::get("/api/v1/kb/reviews")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(listing.status(), StatusCode::OK);
        let body = read_json(listing).await;
        assert_eq!(body["pending"], 1);
        assert_eq!(body["tickets"][0]["id"], ticket.as_str());
        assert_eq!(body["tickets"][0]["escalation"]["reason"]["kind"], "below_threshold");
    }
}
