use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::config::RetrievalConfig;
use crate::decisions::domain::{DecisionType, Jurisdiction, Severity};
use crate::decisions::evaluation::EvidenceEvaluator;
use crate::decisions::evidence::Evidence;
use crate::decisions::explain::DecisionExplainer;
use crate::decisions::registry::{Predicate, Rule, RuleRegistry};
use crate::decisions::service::DecisionService;
use crate::knowledge::embedding::LexicalEmbedder;
use crate::knowledge::index::KnowledgeBase;

pub(super) fn registry() -> Arc<RuleRegistry> {
    Arc::new(RuleRegistry::load_standard().expect("standard registry loads"))
}

pub(super) fn evaluator() -> EvidenceEvaluator {
    EvidenceEvaluator::new(registry())
}

pub(super) fn knowledge() -> Arc<KnowledgeBase> {
    Arc::new(
        KnowledgeBase::standard(
            Arc::new(LexicalEmbedder::default()),
            RetrievalConfig::default(),
        )
        .expect("standard knowledge base builds"),
    )
}

pub(super) fn cited_service() -> DecisionService {
    DecisionService::new(registry(), DecisionExplainer::new(knowledge()))
}

pub(super) fn uncited_service() -> DecisionService {
    DecisionService::new(registry(), DecisionExplainer::without_citations())
}

/// Practitioner without a DEA registration or schedule authority.
pub(super) fn unregistered_practitioner() -> Evidence {
    Evidence::new()
        .with("dea_registration", false)
        .with("state_license_status", "Active")
        .with("requested_schedules", vec!["II", "III"])
        .with("authorized_schedules", Vec::<String>::new())
}

/// Registered practitioner close to DEA expiry and missing a telemedicine attestation.
pub(super) fn expiring_telemedicine_practitioner() -> Evidence {
    Evidence::new()
        .with("dea_registration", true)
        .with("dea_expiry_days", 20_i64)
        .with("telemedicine_practice", true)
        .with("has_ryan_haight_attestation", false)
        .with("state_license_status", "Active")
        .with("state_license_expiry_days", 365_i64)
        .with("authorized_schedules", vec!["II", "III", "IV", "V"])
        .with("requested_schedules", vec!["III", "IV", "V"])
}

pub(super) fn compliant_practitioner() -> Evidence {
    Evidence::new()
        .with("dea_registration", true)
        .with("dea_expiry_days", 400_i64)
        .with("telemedicine_practice", false)
        .with("state_license_status", "Active")
        .with("state_license_expiry_days", 365_i64)
        .with("authorized_schedules", vec!["II", "IIN", "III", "IV", "V"])
        .with("requested_schedules", vec!["II", "IV"])
        .with("schedule_ii_order_channel", "CSOS")
}

pub(super) fn rule(id: &str, severity: Severity, field: &str) -> Rule {
    Rule::builder(id, &format!("{id} title"), severity)
        .jurisdiction(Jurisdiction::Federal)
        .citation("21 CFR 1301.13")
        .requirement("Sample requirement.")
        .predicate(Predicate::is_true(field))
        .narrative("satisfied", &format!("missing {field}"), &format!("provide {field}"))
        .build()
}

pub(super) fn custom_evaluator(rules: Vec<Rule>) -> EvidenceEvaluator {
    let registry = RuleRegistry::builder("test")
        .table(DecisionType::CsfPractitioner, rules)
        .build()
        .expect("custom registry builds");
    EvidenceEvaluator::new(Arc::new(registry))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
