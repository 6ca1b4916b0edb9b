//! Deterministic compliance decisions: registry, evaluation and explanation.

pub mod domain;
pub(crate) mod evaluation;
pub mod evidence;
pub mod explain;
pub mod registry;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DecisionOutcome, DecisionResult, DecisionType, EvaluatedRule, EvidenceChip, FiredRule,
    Jurisdiction, RuleStatus, Severity, UnknownDecisionType,
};
pub use evaluation::EvidenceEvaluator;
pub use evidence::{Evidence, EvidenceValue};
pub use explain::{CitationSource, DecisionExplainer, NoCitations};
pub use registry::{Predicate, RegistryError, Rule, RuleRegistry, STANDARD_REGISTRY_VERSION};
pub use router::decision_router;
pub use service::{DecisionRequest, DecisionService, DecisionServiceError};
