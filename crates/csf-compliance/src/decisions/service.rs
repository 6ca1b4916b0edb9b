use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{DecisionResult, DecisionType, UnknownDecisionType};
use super::evaluation::EvidenceEvaluator;
use super::evidence::Evidence;
use super::explain::DecisionExplainer;
use super::registry::{Rule, RuleRegistry};

/// Inbound decision request as handed over by the request-handling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub decision_type: String,
    #[serde(default)]
    pub evidence: Evidence,
}

/// Service composing the evaluator and explainer.
#[derive(Debug, Clone)]
pub struct DecisionService {
    evaluator: EvidenceEvaluator,
    explainer: DecisionExplainer,
}

impl DecisionService {
    pub fn new(registry: Arc<RuleRegistry>, explainer: DecisionExplainer) -> Self {
        Self {
            evaluator: EvidenceEvaluator::new(registry),
            explainer,
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        self.evaluator.registry()
    }

    /// Evaluate and explain a request whose decision type is still a raw string.
    pub fn decide(&self, request: &DecisionRequest) -> Result<DecisionResult, DecisionServiceError> {
        let decision_type: DecisionType = request.decision_type.parse()?;
        Ok(self.decide_typed(decision_type, &request.evidence))
    }

    pub fn decide_typed(&self, decision_type: DecisionType, evidence: &Evidence) -> DecisionResult {
        let result = self
            .explainer
            .explain(self.evaluator.evaluate(decision_type, evidence));

        info!(
            decision_type = %decision_type,
            outcome = result.outcome.label(),
            fired = result.fired_rules.len(),
            citations = result.citation_count(),
            registry_version = %result.registry_version,
            "decision rendered"
        );
        result
    }

    pub fn rules(&self, decision_type: &str) -> Result<(DecisionType, &[Rule]), DecisionServiceError> {
        let decision_type: DecisionType = decision_type.parse()?;
        Ok((decision_type, self.registry().get_rules(decision_type)))
    }
}

/// Error raised by the decision service.
#[derive(Debug, thiserror::Error)]
pub enum DecisionServiceError {
    #[error(transparent)]
    UnknownDecisionType(#[from] UnknownDecisionType),
}
