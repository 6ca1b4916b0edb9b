use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{KbEntry, KbEntryDraft, KbEntryId, MatchResult};
use super::gate::{GateDecision, RetrievalGate};
use super::index::{KnowledgeBase, KnowledgeError};
use super::review::{ReviewQueue, ReviewQueueError, ReviewTicketId};
use crate::decisions::domain::{DecisionType, UnknownDecisionType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub decision_type: Option<String>,
}

/// Ranked matches plus the gate's verdict on the best one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub matches: Vec<MatchResult>,
    pub escalate: bool,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub decision_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub decision: GateDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_ticket: Option<ReviewTicketId>,
}

/// Service composing the knowledge base, retrieval gate and review hand-off.
pub struct KnowledgeService<Q> {
    knowledge: Arc<KnowledgeBase>,
    gate: RetrievalGate,
    queue: Arc<Q>,
}

impl<Q> KnowledgeService<Q>
where
    Q: ReviewQueue + 'static,
{
    pub fn new(knowledge: Arc<KnowledgeBase>, queue: Arc<Q>) -> Self {
        let gate = RetrievalGate::new(Arc::clone(&knowledge));
        Self {
            knowledge,
            gate,
            queue,
        }
    }

    pub fn with_gate(gate: RetrievalGate, queue: Arc<Q>) -> Self {
        Self {
            knowledge: Arc::clone(gate.knowledge()),
            gate,
            queue,
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn gate(&self) -> &RetrievalGate {
        &self.gate
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, KnowledgeServiceError> {
        let query = non_empty(&request.query)?;
        let decision_type = parse_decision_type(request.decision_type.as_deref())?;
        let threshold = self.gate.threshold();

        let matches = match self.knowledge.search(query, decision_type) {
            Ok(matches) => matches,
            Err(KnowledgeError::Embedding(error)) => {
                warn!(%error, "search degraded to escalation");
                Vec::new()
            }
            Err(other) => return Err(other.into()),
        };
        let escalate = matches
            .first()
            .map_or(true, |top| top.score < threshold);

        Ok(SearchResponse {
            matches,
            escalate,
            threshold,
        })
    }

    /// Answer through the gate; escalations are handed to the review queue.
    pub fn ask(&self, request: &AskRequest) -> Result<AskResponse, KnowledgeServiceError> {
        let question = non_empty(&request.question)?;
        let decision_type = parse_decision_type(request.decision_type.as_deref())?;

        let decision = self.gate.ask(question, decision_type);
        let review_ticket = match &decision {
            GateDecision::Escalate(escalation) => {
                let ticket = self.queue.enqueue(escalation)?;
                info!(ticket = %ticket, "escalation queued for review");
                Some(ticket)
            }
            GateDecision::Answered(_) => None,
        };

        Ok(AskResponse {
            decision,
            review_ticket,
        })
    }

    pub fn author(&self, draft: KbEntryDraft) -> Result<KbEntry, KnowledgeServiceError> {
        Ok(self.knowledge.publish(draft)?)
    }

    pub fn regenerate(&self, id: &KbEntryId) -> Result<KbEntry, KnowledgeServiceError> {
        Ok(self.knowledge.regenerate_variants(id)?)
    }
}

fn non_empty(text: &str) -> Result<&str, KnowledgeServiceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(KnowledgeServiceError::EmptyQuestion)
    } else {
        Ok(trimmed)
    }
}

fn parse_decision_type(raw: Option<&str>) -> Result<Option<DecisionType>, UnknownDecisionType> {
    raw.filter(|value| !value.trim().is_empty())
        .map(str::parse)
        .transpose()
}

/// Error raised by the knowledge service.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeServiceError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    UnknownDecisionType(#[from] UnknownDecisionType),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error(transparent)]
    ReviewQueue(#[from] ReviewQueueError),
}
