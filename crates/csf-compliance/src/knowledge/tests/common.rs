use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::RetrievalConfig;
use crate::decisions::domain::Jurisdiction;
use crate::knowledge::domain::{KbEntryDraft, KbEntryId};
use crate::knowledge::embedding::{Embedder, EmbeddingError, LexicalEmbedder};
use crate::knowledge::gate::Escalation;
use crate::knowledge::index::KnowledgeBase;
use crate::knowledge::review::{ReviewQueue, ReviewQueueError, ReviewTicketId};
use crate::knowledge::service::KnowledgeService;

pub(super) const RENEWAL_QUESTION: &str = "How do I renew my DEA license?";
pub(super) const RENEWAL_PARAPHRASE: &str = "Steps to renew a DEA registration?";
pub(super) const UNRELATED_QUESTION: &str = "What time does the cafeteria open on weekends?";

pub(super) fn standard_knowledge() -> Arc<KnowledgeBase> {
    Arc::new(
        KnowledgeBase::standard(
            Arc::new(LexicalEmbedder::default()),
            RetrievalConfig::default(),
        )
        .expect("standard knowledge base builds"),
    )
}

pub(super) fn empty_knowledge() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::new(
        Arc::new(LexicalEmbedder::default()),
        RetrievalConfig::default(),
    ))
}

pub(super) fn draft(id: Option<&str>, question: &str) -> KbEntryDraft {
    KbEntryDraft {
        id: id.map(|id| KbEntryId(id.to_string())),
        canonical_question: question.to_string(),
        answer: "Contact the compliance desk.".to_string(),
        decision_type: None,
        jurisdiction: Jurisdiction::Global,
    }
}

/// Lexical embedder that can be switched off after the index is built.
pub(super) struct SwitchableEmbedder {
    inner: LexicalEmbedder,
    pub(super) available: AtomicBool,
}

impl SwitchableEmbedder {
    pub(super) fn new() -> Self {
        Self {
            inner: LexicalEmbedder::default(),
            available: AtomicBool::new(true),
        }
    }
}

impl Embedder for SwitchableEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.available.load(Ordering::Relaxed) {
            self.inner.embed(text)
        } else {
            Err(EmbeddingError::Unavailable("model endpoint timed out".to_string()))
        }
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

pub(super) fn switchable_knowledge() -> (Arc<KnowledgeBase>, Arc<SwitchableEmbedder>) {
    let embedder = Arc::new(SwitchableEmbedder::new());
    let knowledge = KnowledgeBase::standard(embedder.clone(), RetrievalConfig::default())
        .expect("standard knowledge base builds");
    (Arc::new(knowledge), embedder)
}

#[derive(Default)]
pub(super) struct MemoryQueue {
    escalations: Mutex<Vec<Escalation>>,
    sequence: AtomicU64,
}

impl MemoryQueue {
    pub(super) fn escalations(&self) -> Vec<Escalation> {
        self.escalations
            .lock()
            .expect("queue mutex poisoned")
            .clone()
    }
}

impl ReviewQueue for MemoryQueue {
    fn enqueue(&self, escalation: &Escalation) -> Result<ReviewTicketId, ReviewQueueError> {
        self.escalations
            .lock()
            .expect("queue mutex poisoned")
            .push(escalation.clone());
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ReviewTicketId(format!("review-{id}")))
    }
}

pub(super) struct OfflineQueue;

impl ReviewQueue for OfflineQueue {
    fn enqueue(&self, _escalation: &Escalation) -> Result<ReviewTicketId, ReviewQueueError> {
        Err(ReviewQueueError::Unavailable("queue offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<KnowledgeService<MemoryQueue>>, Arc<MemoryQueue>) {
    let queue = Arc::new(MemoryQueue::default());
    let service = KnowledgeService::new(standard_knowledge(), queue.clone());
    (Arc::new(service), queue)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
