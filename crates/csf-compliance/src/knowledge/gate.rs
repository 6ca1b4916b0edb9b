use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{KbEntryId, MatchResult};
use super::index::KnowledgeBase;
use crate::decisions::domain::{DecisionType, Jurisdiction};

/// Matched answer returned when the top score clears the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub question: String,
    pub kb_entry_id: KbEntryId,
    pub canonical_question: String,
    pub answer: String,
    pub jurisdiction: Jurisdiction,
    pub top_match: MatchResult,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationReason {
    BelowThreshold { score: f32 },
    NoEntries,
    EmbeddingUnavailable { detail: String },
}

/// Question routed to human review. `best_match` is kept for audit only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub question: String,
    pub decision_type: Option<DecisionType>,
    pub reason: EscalationReason,
    pub best_match: Option<MatchResult>,
    pub threshold: f32,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateDecision {
    Answered(Answer),
    Escalate(Escalation),
}

impl GateDecision {
    pub fn is_escalation(&self) -> bool {
        matches!(self, GateDecision::Escalate(_))
    }
}

/// Confidence-gated front door to the knowledge base. Never errors: anything
/// that prevents a confident answer becomes an escalation.
#[derive(Debug, Clone)]
pub struct RetrievalGate {
    knowledge: Arc<KnowledgeBase>,
    threshold: f32,
}

impl RetrievalGate {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        let threshold = knowledge.config().confidence_threshold;
        Self::with_threshold(knowledge, threshold)
    }

    pub fn with_threshold(knowledge: Arc<KnowledgeBase>, threshold: f32) -> Self {
        Self {
            knowledge,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn ask(&self, question: &str, decision_type: Option<DecisionType>) -> GateDecision {
        let (index, matches) = match self.knowledge.search_snapshot(question, decision_type) {
            Ok(found) => found,
            Err(error) => {
                return self.escalate(
                    question,
                    decision_type,
                    EscalationReason::EmbeddingUnavailable {
                        detail: error.to_string(),
                    },
                    None,
                );
            }
        };

        let Some(top) = matches.into_iter().next() else {
            return self.escalate(question, decision_type, EscalationReason::NoEntries, None);
        };

        if top.score < self.threshold {
            let reason = EscalationReason::BelowThreshold { score: top.score };
            return self.escalate(question, decision_type, reason, Some(top));
        }

        let Some(entry) = index.entry(&top.kb_entry_id) else {
            return self.escalate(question, decision_type, EscalationReason::NoEntries, Some(top));
        };

        debug!(
            kb_entry_id = %entry.id,
            score = top.score,
            variant = ?top.matched_variant_index,
            "question answered from knowledge base"
        );
        GateDecision::Answered(Answer {
            question: question.to_string(),
            kb_entry_id: entry.id.clone(),
            canonical_question: entry.canonical_question.clone(),
            answer: entry.answer.clone(),
            jurisdiction: entry.jurisdiction.clone(),
            top_match: top,
            threshold: self.threshold,
        })
    }

    fn escalate(
        &self,
        question: &str,
        decision_type: Option<DecisionType>,
        reason: EscalationReason,
        best_match: Option<MatchResult>,
    ) -> GateDecision {
        info!(
            reason = ?reason,
            best_score = best_match.as_ref().map(|found| found.score),
            threshold = self.threshold,
            "question escalated to review"
        );
        GateDecision::Escalate(Escalation {
            question: question.to_string(),
            decision_type,
            reason,
            best_match,
            threshold: self.threshold,
            raised_at: Utc::now(),
        })
    }
}
