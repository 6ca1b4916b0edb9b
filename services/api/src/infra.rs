use chrono::{DateTime, Utc};
use csf_compliance::config::RetrievalConfig;
use csf_compliance::decisions::{DecisionExplainer, DecisionService, RuleRegistry};
use csf_compliance::error::AppError;
use csf_compliance::knowledge::{
    standard_entries, standard_passages, CachedEmbedder, Escalation, KbCsvImporter,
    KnowledgeBase, KnowledgeService, LexicalEmbedder, ReviewQueue, ReviewQueueError,
    ReviewTicketId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReviewTicket {
    pub(crate) id: ReviewTicketId,
    pub(crate) escalation: Escalation,
    pub(crate) queued_at: DateTime<Utc>,
}

/// Review queue held in process memory. Tickets vanish on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewQueue {
    tickets: Arc<Mutex<Vec<ReviewTicket>>>,
    sequence: Arc<AtomicU64>,
}

impl ReviewQueue for InMemoryReviewQueue {
    fn enqueue(&self, escalation: &Escalation) -> Result<ReviewTicketId, ReviewQueueError> {
        let number = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = ReviewTicketId(format!(
            "review-{}-{number:04}",
            escalation.raised_at.format("%Y%m%d")
        ));
        let mut guard = self.tickets.lock().expect("review queue mutex poisoned");
        guard.push(ReviewTicket {
            id: id.clone(),
            escalation: escalation.clone(),
            queued_at: Utc::now(),
        });
        Ok(id)
    }
}

impl InMemoryReviewQueue {
    pub(crate) fn tickets(&self) -> Vec<ReviewTicket> {
        self.tickets
            .lock()
            .expect("review queue mutex poisoned")
            .clone()
    }
}

/// Decision and knowledge services sharing one knowledge base.
pub(crate) struct Engine {
    pub(crate) decisions: Arc<DecisionService>,
    pub(crate) knowledge: Arc<KnowledgeService<InMemoryReviewQueue>>,
    pub(crate) queue: Arc<InMemoryReviewQueue>,
}

impl Engine {
    /// Loads the standard registry and knowledge base, merging the seed export
    /// named by `config.seed_csv` when present.
    pub(crate) fn load(config: &RetrievalConfig) -> Result<Self, AppError> {
        let registry = Arc::new(RuleRegistry::load_standard()?);
        let embedder = Arc::new(CachedEmbedder::new(
            LexicalEmbedder::default(),
            config.embedding_cache_capacity,
        ));
        let knowledge = Arc::new(KnowledgeBase::new(embedder, config.clone()));

        let mut drafts = standard_entries();
        if let Some(path) = &config.seed_csv {
            let imported = KbCsvImporter::from_path(path)?;
            info!(path = %path.display(), entries = imported.len(), "seed export imported");
            drafts.extend(imported);
        }
        knowledge.rebuild(drafts, standard_passages())?;

        let index = knowledge.snapshot();
        info!(
            registry_version = registry.version(),
            rules = registry.rule_count(),
            entries = index.entries().len(),
            passages = index.passages().len(),
            "compliance engine loaded"
        );

        let queue = Arc::new(InMemoryReviewQueue::default());
        let decisions = Arc::new(DecisionService::new(
            registry,
            DecisionExplainer::new(knowledge.clone()),
        ));
        let knowledge = Arc::new(KnowledgeService::new(knowledge, queue.clone()));

        Ok(Self {
            decisions,
            knowledge,
            queue,
        })
    }
}
