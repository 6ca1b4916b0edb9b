use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::decisions::router::{decision_router, rules_handler};

#[tokio::test]
async fn evaluate_route_returns_the_decision_payload() {
    let router = decision_router(Arc::new(cited_service()));
    let payload = json!({
        "decision_type": "csf_practitioner",
        "evidence": {
            "dea_registration": false,
            "state_license_status": "Active",
            "requested_schedules": ["II", "III"],
            "authorized_schedules": []
        }
    });

    let response = router
        .oneshot(
            Request::post("/api/v1/decisions/evaluate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["outcome"], "blocked");
    assert_eq!(body["decision_type"], "csf_practitioner");
    assert_eq!(body["evaluated_rules"].as_array().map(Vec::len), Some(8));
    let fired = &body["fired_rules"][0];
    assert_eq!(fired["id"], "csf_pract_dea_registration");
    assert_eq!(fired["severity"], "block");
    assert!(fired["evidence"].as_array().is_some_and(|chips| !chips.is_empty()));
}

#[tokio::test]
async fn evaluate_route_rejects_unknown_decision_types() {
    let router = decision_router(Arc::new(uncited_service()));

    let response = router
        .oneshot(
            Request::post("/api/v1/decisions/evaluate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "decision_type": "csf_researcher", "evidence": {} }).to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("csf_researcher")));
}

#[tokio::test]
async fn rules_route_lists_the_catalog() {
    let router = decision_router(Arc::new(uncited_service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/decisions/ohio-tddd/rules")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision_type"], "ohio_tddd");
    assert_eq!(body["registry_version"], "2026.10.1");
    assert_eq!(body["rules"][0]["id"], "oh_tddd_license_on_file");
    assert_eq!(body["rules"][0]["predicate"]["op"], "present");
}

#[tokio::test]
async fn rules_handler_reports_unknown_types_as_missing() {
    let response = rules_handler(
        State(Arc::new(uncited_service())),
        Path("csf_researcher".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
