use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::knowledge::router::knowledge_router;
use crate::knowledge::service::KnowledgeService;

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn search_route_returns_ranked_matches() {
    let (service, _) = build_service();

    let response = knowledge_router(service)
        .oneshot(post_json(
            "/api/v1/kb/search",
            json!({ "query": RENEWAL_QUESTION, "decision_type": "csf_practitioner" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["escalate"], false);
    assert_eq!(body["matches"][0]["kb_entry_id"], "kb-dea-renewal");
    assert_eq!(body["matches"][0]["matched_variant_index"], Value::Null);
}

#[tokio::test]
async fn ask_route_escalates_unrelated_questions() {
    let (service, queue) = build_service();

    let response = knowledge_router(service)
        .oneshot(post_json(
            "/api/v1/kb/ask",
            json!({ "question": UNRELATED_QUESTION }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"]["status"], "escalate");
    assert_eq!(body["review_ticket"], "review-1");
    assert_eq!(queue.escalations().len(), 1);
}

#[tokio::test]
async fn ask_route_rejects_unknown_decision_types() {
    let (service, _) = build_service();

    let response = knowledge_router(service)
        .oneshot(post_json(
            "/api/v1/kb/ask",
            json!({ "question": RENEWAL_QUESTION, "decision_type": "csf_researcher" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn entries_route_creates_and_conflicts() {
    let (service, _) = build_service();
    let router = knowledge_router(service);
    let payload = json!({
        "id": "kb-form-222",
        "canonical_question": "Who signs the DEA Form 222?",
        "answer": "A person holding a power of attorney from the registrant.",
        "jurisdiction": "US-FED"
    });

    let created = router
        .clone()
        .oneshot(post_json("/api/v1/kb/entries", payload.clone()))
        .await
        .expect("router responds");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json_body(created).await;
    assert_eq!(body["id"], "kb-form-222");
    assert_eq!(body["jurisdiction"], "US-FED");
    assert!(body.get("embedding").is_none());
    let variants = body["variants"].as_array().expect("variants listed");
    assert!((3..=5).contains(&variants.len()));

    let conflict = router
        .oneshot(post_json("/api/v1/kb/entries", payload))
        .await
        .expect("router responds");
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn variants_route_regenerates_or_reports_missing() {
    let (service, _) = build_service();
    let router = knowledge_router(service);

    let regenerated = router
        .clone()
        .oneshot(post_json("/api/v1/kb/entries/kb-ny-triennial/variants", json!({})))
        .await
        .expect("router responds");
    assert_eq!(regenerated.status(), StatusCode::OK);

    let missing = router
        .oneshot(post_json("/api/v1/kb/entries/kb-unknown/variants", json!({})))
        .await
        .expect("router responds");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(missing).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("kb-unknown")));
}

#[tokio::test]
async fn entries_route_reports_an_offline_embedder_as_unavailable() {
    let (knowledge, embedder) = switchable_knowledge();
    let service = Arc::new(KnowledgeService::new(
        knowledge,
        Arc::new(MemoryQueue::default()),
    ));
    embedder.available.store(false, Ordering::Relaxed);

    let response = knowledge_router(service)
        .oneshot(post_json(
            "/api/v1/kb/entries",
            json!({
                "canonical_question": "Who signs the DEA Form 222?",
                "answer": "A person holding a power of attorney from the registrant.",
                "jurisdiction": "US-FED"
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("timed out")));
}
