use std::sync::Arc;

use super::domain::{DecisionResult, EvaluatedRule, EvidenceChip};
use crate::knowledge::citations::assemble_evidence;

/// Supplies candidate regulatory passages for a fired rule.
///
/// Implementations return raw scored candidates; filtering, deduplication and
/// truncation happen in the explainer so every source obeys the same rules.
pub trait CitationSource: Send + Sync {
    fn candidates(&self, rule: &EvaluatedRule) -> Vec<EvidenceChip>;
}

/// Source that never cites anything, for callers without a knowledge base.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCitations;

impl CitationSource for NoCitations {
    fn candidates(&self, _rule: &EvaluatedRule) -> Vec<EvidenceChip> {
        Vec::new()
    }
}

/// Attaches evidence chips to fired rules and finalizes the summary.
#[derive(Clone)]
pub struct DecisionExplainer {
    citations: Arc<dyn CitationSource>,
}

impl DecisionExplainer {
    pub fn new(citations: Arc<dyn CitationSource>) -> Self {
        Self { citations }
    }

    pub fn without_citations() -> Self {
        Self::new(Arc::new(NoCitations))
    }

    /// Expects a result straight from the evaluator; chips are replaced, not merged.
    pub fn explain(&self, mut result: DecisionResult) -> DecisionResult {
        for fired in &mut result.fired_rules {
            let candidates = self.citations.candidates(&fired.rule);
            fired.evidence = assemble_evidence(candidates, &fired.rule.jurisdiction);
        }

        let cited_rules = result
            .fired_rules
            .iter()
            .filter(|fired| !fired.evidence.is_empty())
            .count();
        if cited_rules > 0 {
            result.decision_summary.push_str(&format!(
                " {} regulatory citation(s) support {} of {} fired rule(s).",
                result.citation_count(),
                cited_rules,
                result.fired_rules.len()
            ));
        }

        result
    }
}

impl std::fmt::Debug for DecisionExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionExplainer").finish_non_exhaustive()
    }
}
