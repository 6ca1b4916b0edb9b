mod policy;
mod rules;

use std::sync::Arc;

use policy::{decide_outcome, summarize};
use rules::apply_rules;
use tracing::debug;

use super::domain::{DecisionResult, DecisionType, FiredRule};
use super::evidence::Evidence;
use super::registry::RuleRegistry;

/// Stateless evaluator over a shared, read-only registry.
#[derive(Debug, Clone)]
pub struct EvidenceEvaluator {
    registry: Arc<RuleRegistry>,
}

impl EvidenceEvaluator {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Evaluate `evidence` against the rule table for `decision_type`.
    ///
    /// Infallible: evidence gaps and type mismatches surface as failed rules.
    pub fn evaluate(&self, decision_type: DecisionType, evidence: &Evidence) -> DecisionResult {
        let rules = self.registry.get_rules(decision_type);
        let verdicts = apply_rules(rules, evidence);
        let outcome = decide_outcome(&verdicts);

        let satisfied_requirements: Vec<String> = verdicts
            .iter()
            .filter(|verdict| verdict.is_passed_mandatory())
            .map(|verdict| verdict.rule.narrative.satisfied.clone())
            .collect();

        let failed: Vec<_> = verdicts.iter().filter(|verdict| verdict.is_failed()).collect();
        let missing_evidence = failed
            .iter()
            .map(|verdict| verdict.rule.narrative.missing.clone())
            .collect();
        let next_steps = failed
            .iter()
            .map(|verdict| verdict.rule.narrative.next_step.clone())
            .collect();
        let fired_rules = failed
            .iter()
            .map(|verdict| FiredRule {
                rule: verdict.to_evaluated(),
                evidence: Vec::new(),
            })
            .collect();

        let decision_summary = summarize(outcome, &verdicts, satisfied_requirements.len());

        debug!(
            decision_type = %decision_type,
            outcome = outcome.label(),
            evaluated = verdicts.len(),
            fired = failed.len(),
            "evidence evaluated"
        );

        DecisionResult {
            decision_type,
            registry_version: self.registry.version().to_string(),
            outcome,
            evaluated_rules: verdicts.iter().map(|verdict| verdict.to_evaluated()).collect(),
            fired_rules,
            satisfied_requirements,
            missing_evidence,
            next_steps,
            decision_summary,
        }
    }
}
