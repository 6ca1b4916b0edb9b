use super::common::*;
use crate::decisions::domain::{DecisionOutcome, DecisionType, RuleStatus, Severity};
use crate::decisions::evidence::Evidence;

#[test]
fn missing_dea_registration_blocks() {
    let result = evaluator().evaluate(DecisionType::CsfPractitioner, &unregistered_practitioner());

    assert_eq!(result.outcome, DecisionOutcome::Blocked);
    assert!(result
        .missing_evidence
        .iter()
        .any(|item| item.contains("DEA registration")));
    assert!(result
        .fired_rules
        .iter()
        .any(|fired| fired.rule.rule_id == "csf_pract_dea_registration"));
    assert!(result.decision_summary.starts_with("Blocked:"));
}

#[test]
fn expiring_registration_and_missing_attestation_need_review() {
    let result = evaluator().evaluate(
        DecisionType::CsfPractitioner,
        &expiring_telemedicine_practitioner(),
    );

    assert_eq!(result.outcome, DecisionOutcome::NeedsReview);
    let fired: Vec<_> = result
        .fired_rules
        .iter()
        .map(|fired| fired.rule.rule_id.as_str())
        .collect();
    assert_eq!(
        fired,
        vec![
            "csf_pract_dea_expiry_buffer",
            "csf_pract_telemedicine_attestation"
        ]
    );
    assert!(result
        .fired_rules
        .iter()
        .all(|fired| fired.rule.severity == Severity::Review));
    assert!(result.decision_summary.starts_with("Needs review: 2 item(s)"));
}

#[test]
fn complete_evidence_is_approved() {
    let result = evaluator().evaluate(DecisionType::CsfPractitioner, &compliant_practitioner());

    assert_eq!(result.outcome, DecisionOutcome::Approved);
    assert!(result.missing_evidence.is_empty());
    assert!(result.next_steps.is_empty());
    assert!(result.fired_rules.is_empty());
    assert!(!result.satisfied_requirements.is_empty());
    assert_eq!(
        result.decision_summary,
        format!(
            "Approved: all 4 mandatory checks passed and {} requirement(s) are satisfied.",
            result.satisfied_requirements.len()
        )
    );
}

#[test]
fn every_rule_is_reported_once_in_registry_order() {
    let registry = registry();
    let evaluator = evaluator();
    for decision_type in DecisionType::ALL {
        let rules = registry.get_rules(decision_type);
        let result = evaluator.evaluate(decision_type, &Evidence::new());

        let evaluated: Vec<_> = result
            .evaluated_rules
            .iter()
            .map(|rule| rule.rule_id.as_str())
            .collect();
        let expected: Vec<_> = rules.iter().map(|rule| rule.id.as_str()).collect();
        assert_eq!(evaluated, expected, "{decision_type}");
    }
}

#[test]
fn repeated_evaluation_is_identical() {
    let evaluator = evaluator();
    for evidence in [
        unregistered_practitioner(),
        expiring_telemedicine_practitioner(),
        compliant_practitioner(),
        Evidence::new(),
    ] {
        let first = evaluator.evaluate(DecisionType::CsfPractitioner, &evidence);
        let second = evaluator.evaluate(DecisionType::CsfPractitioner, &evidence);
        assert_eq!(first, second);
    }
}

#[test]
fn a_failed_blocker_wins_regardless_of_position() {
    let rules = vec![
        rule("review_first", Severity::Review, "review_ok"),
        rule("info_rule", Severity::Info, "info_ok"),
        rule("block_last", Severity::Block, "block_ok"),
    ];
    let mut reversed = rules.clone();
    reversed.reverse();
    let evidence = Evidence::new()
        .with("review_ok", true)
        .with("info_ok", true);

    for table in [rules, reversed] {
        let result = custom_evaluator(table).evaluate(DecisionType::CsfPractitioner, &evidence);
        assert_eq!(result.outcome, DecisionOutcome::Blocked);
        assert_eq!(result.missing_evidence, vec!["missing block_ok".to_string()]);
    }
}

#[test]
fn info_rules_never_fail() {
    let evaluator = custom_evaluator(vec![rule("note", Severity::Info, "absent")]);

    let result = evaluator.evaluate(DecisionType::CsfPractitioner, &Evidence::new());

    assert_eq!(result.outcome, DecisionOutcome::Approved);
    assert_eq!(result.evaluated_rules[0].status, RuleStatus::Info);
    assert!(result.satisfied_requirements.is_empty());
}

#[test]
fn empty_rule_set_is_approved_with_empty_lists() {
    let evaluator = custom_evaluator(Vec::new());

    let result = evaluator.evaluate(DecisionType::CsfPractitioner, &compliant_practitioner());

    assert_eq!(result.outcome, DecisionOutcome::Approved);
    assert!(result.evaluated_rules.is_empty());
    assert!(result.satisfied_requirements.is_empty());
    assert!(result.missing_evidence.is_empty());

    let unregistered = evaluator.evaluate(DecisionType::OhioTddd, &Evidence::new());
    assert_eq!(unregistered.outcome, DecisionOutcome::Approved);
}

#[test]
fn mismatched_evidence_types_fail_quietly() {
    let evidence: Evidence = serde_json::from_value(serde_json::json!({
        "dea_registration": "yes",
        "dea_expiry_days": "forever",
        "state_license_status": ["Active"],
        "authorized_schedules": "II,III",
        "requested_schedules": ["II"],
        "telemedicine_practice": {"nested": true}
    }))
    .expect("any JSON shape is accepted");

    let result = evaluator().evaluate(DecisionType::CsfPractitioner, &evidence);

    assert_eq!(result.outcome, DecisionOutcome::Blocked);
    let failed = |id: &str| {
        result
            .evaluated_rules
            .iter()
            .any(|rule| rule.rule_id == id && rule.status == RuleStatus::Failed)
    };
    assert!(failed("csf_pract_dea_registration"));
    assert!(failed("csf_pract_dea_current"));
    assert!(failed("csf_pract_state_license_active"));
    assert!(failed("csf_pract_schedules_authorized"));
}

#[test]
fn ohio_category_applies_only_to_controlled_substance_handlers() {
    let base = Evidence::new()
        .with("tddd_license_number", "02-1234567")
        .with("tddd_license_status", "active")
        .with("tddd_expiry_days", 200_i64)
        .with("responsible_person_name", "R. Pharmacist");

    let dangerous_drugs_only = base.clone().with("handles_controlled_substances", false);
    let result = evaluator().evaluate(DecisionType::OhioTddd, &dangerous_drugs_only);
    assert!(!result
        .fired_rules
        .iter()
        .any(|fired| fired.rule.rule_id == "oh_tddd_category_controlled"));

    let controlled = base
        .with("handles_controlled_substances", true)
        .with("tddd_category", "II");
    let result = evaluator().evaluate(DecisionType::OhioTddd, &controlled);
    assert_eq!(result.outcome, DecisionOutcome::Blocked);
}
