use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tracing::info;

use super::domain::{
    KbEntry, KbEntryDraft, KbEntryId, MatchResult, PassageDraft, RegulatoryPassage,
};
use super::embedding::{cosine_similarity, Embedder, EmbeddingError};
use super::variants::{QuestionVariantGenerator, VariantContext};
use crate::config::RetrievalConfig;
use crate::decisions::domain::DecisionType;

/// Errors raised while building or querying the knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("knowledge base entry {0} already exists")]
    DuplicateEntry(KbEntryId),
    #[error("knowledge base entry {0} not found")]
    EntryNotFound(KbEntryId),
    #[error("invalid knowledge base entry: {0}")]
    InvalidEntry(String),
}

/// Immutable snapshot of every entry and passage. Never mutated once built.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    generation: u64,
    entries: Vec<KbEntry>,
    passages: Vec<RegulatoryPassage>,
}

impl KnowledgeIndex {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[KbEntry] {
        &self.entries
    }

    pub fn passages(&self) -> &[RegulatoryPassage] {
        &self.passages
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: &KbEntryId) -> Option<&KbEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Rank entries by their best canonical-or-variant similarity to `query`.
    ///
    /// Ties keep insertion order; a variant only wins over the canonical question
    /// when it scores strictly higher.
    pub fn rank(
        &self,
        query: &[f32],
        decision_type: Option<DecisionType>,
        limit: usize,
    ) -> Vec<MatchResult> {
        let mut matches: Vec<MatchResult> = self
            .entries
            .iter()
            .filter(|entry| entry.applies_to(decision_type))
            .map(|entry| best_match(entry, query))
            .collect();

        matches.sort_by(|left, right| right.score.total_cmp(&left.score));
        matches.truncate(limit);
        matches
    }
}

fn best_match(entry: &KbEntry, query: &[f32]) -> MatchResult {
    let mut best_index = None;
    let mut best_score = cosine_similarity(query, &entry.embedding);

    for (index, embedding) in entry.variant_embeddings.iter().enumerate() {
        let score = cosine_similarity(query, embedding);
        if score > best_score {
            best_score = score;
            best_index = Some(index);
        }
    }

    MatchResult {
        kb_entry_id: entry.id.clone(),
        matched_text: entry
            .text_for(best_index)
            .unwrap_or(entry.canonical_question.as_str())
            .to_string(),
        matched_variant_index: best_index,
        score: best_score,
    }
}

/// Shared handle over the current [`KnowledgeIndex`].
///
/// Readers clone the current `Arc` and keep a consistent snapshot for as long as
/// they hold it. Writers serialize on `writer`, build a replacement index off to
/// the side, and swap it in under a short write lock.
pub struct KnowledgeBase {
    embedder: Arc<dyn Embedder>,
    variants: QuestionVariantGenerator,
    config: RetrievalConfig,
    current: RwLock<Arc<KnowledgeIndex>>,
    writer: Mutex<()>,
    sequence: AtomicU64,
}

impl KnowledgeBase {
    pub fn new(embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            variants: QuestionVariantGenerator::new(),
            config,
            current: RwLock::new(Arc::new(KnowledgeIndex::default())),
            writer: Mutex::new(()),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn snapshot(&self) -> Arc<KnowledgeIndex> {
        self.current
            .read()
            .expect("knowledge index lock poisoned")
            .clone()
    }

    /// Ranked matches for `question`, optionally restricted to one decision type.
    pub fn search(
        &self,
        question: &str,
        decision_type: Option<DecisionType>,
    ) -> Result<Vec<MatchResult>, KnowledgeError> {
        self.search_snapshot(question, decision_type)
            .map(|(_, matches)| matches)
    }

    /// Like [`KnowledgeBase::search`], also returning the snapshot that was ranked
    /// so callers can resolve match ids without racing a concurrent swap.
    pub fn search_snapshot(
        &self,
        question: &str,
        decision_type: Option<DecisionType>,
    ) -> Result<(Arc<KnowledgeIndex>, Vec<MatchResult>), KnowledgeError> {
        let index = self.snapshot();
        if index.is_empty() {
            return Ok((index, Vec::new()));
        }
        let query = self.embedder.embed(question)?;
        let matches = index.rank(&query, decision_type, self.config.max_results);
        Ok((index, matches))
    }

    /// Author a new entry: variants and embeddings are derived once, here.
    pub fn publish(&self, draft: KbEntryDraft) -> Result<KbEntry, KnowledgeError> {
        let _writer = self.writer.lock().expect("knowledge writer lock poisoned");
        let base = self.snapshot();

        let id = match draft.id.clone() {
            Some(id) => id,
            None => self.next_id(&base),
        };
        if base.entry(&id).is_some() {
            return Err(KnowledgeError::DuplicateEntry(id));
        }

        let entry = self.build_entry(id, draft)?;
        let mut next = (*base).clone();
        next.entries.push(entry.clone());
        self.swap(next);

        info!(entry_id = %entry.id, variants = entry.variants.len(), "knowledge base entry published");
        Ok(entry)
    }

    /// Replace the entry's whole variant set and embeddings.
    pub fn regenerate_variants(&self, id: &KbEntryId) -> Result<KbEntry, KnowledgeError> {
        let _writer = self.writer.lock().expect("knowledge writer lock poisoned");
        let base = self.snapshot();
        let position = base
            .entries
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or_else(|| KnowledgeError::EntryNotFound(id.clone()))?;

        let existing = &base.entries[position];
        let rebuilt = self.build_entry(
            existing.id.clone(),
            KbEntryDraft {
                id: Some(existing.id.clone()),
                canonical_question: existing.canonical_question.clone(),
                answer: existing.answer.clone(),
                decision_type: existing.decision_type,
                jurisdiction: existing.jurisdiction.clone(),
            },
        )?;
        let rebuilt = KbEntry {
            created_at: existing.created_at,
            ..rebuilt
        };

        let mut next = (*base).clone();
        next.entries[position] = rebuilt.clone();
        self.swap(next);
        Ok(rebuilt)
    }

    /// Replace the whole index. Nothing is swapped in unless every item embeds.
    pub fn rebuild(
        &self,
        drafts: Vec<KbEntryDraft>,
        passages: Vec<PassageDraft>,
    ) -> Result<(), KnowledgeError> {
        let _writer = self.writer.lock().expect("knowledge writer lock poisoned");
        let base = self.snapshot();

        let mut next = KnowledgeIndex {
            generation: base.generation,
            entries: Vec::with_capacity(drafts.len()),
            passages: Vec::with_capacity(passages.len()),
        };
        for draft in drafts {
            let id = match draft.id.clone() {
                Some(id) => id,
                None => self.next_id(&next),
            };
            if next.entry(&id).is_some() {
                return Err(KnowledgeError::DuplicateEntry(id));
            }
            let entry = self.build_entry(id, draft)?;
            next.entries.push(entry);
        }
        for passage in passages {
            next.passages.push(self.build_passage(passage)?);
        }

        let (entries, passages) = (next.entries.len(), next.passages.len());
        self.swap(next);
        info!(entries, passages, "knowledge base rebuilt");
        Ok(())
    }

    /// Append regulatory passages used as citation evidence.
    pub fn add_passages(&self, passages: Vec<PassageDraft>) -> Result<usize, KnowledgeError> {
        let _writer = self.writer.lock().expect("knowledge writer lock poisoned");
        let base = self.snapshot();
        let mut next = (*base).clone();
        for passage in passages {
            next.passages.push(self.build_passage(passage)?);
        }
        let total = next.passages.len();
        self.swap(next);
        Ok(total)
    }

    fn swap(&self, mut next: KnowledgeIndex) {
        let mut current = self
            .current
            .write()
            .expect("knowledge index lock poisoned");
        next.generation = current.generation + 1;
        *current = Arc::new(next);
    }

    fn next_id(&self, index: &KnowledgeIndex) -> KbEntryId {
        loop {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            let id = KbEntryId(format!("kb-{sequence:05}"));
            if index.entry(&id).is_none() {
                return id;
            }
        }
    }

    fn build_entry(&self, id: KbEntryId, draft: KbEntryDraft) -> Result<KbEntry, KnowledgeError> {
        let canonical_question = draft.canonical_question.trim().to_string();
        let answer = draft.answer.trim().to_string();
        if canonical_question.is_empty() {
            return Err(KnowledgeError::InvalidEntry(format!(
                "{id} has an empty canonical question"
            )));
        }
        if answer.is_empty() {
            return Err(KnowledgeError::InvalidEntry(format!("{id} has an empty answer")));
        }

        let context = VariantContext::for_entry(&draft.jurisdiction, draft.decision_type);
        let variants = self.variants.generate_for(&canonical_question, &context);
        let embedding = self.embedder.embed(&canonical_question)?;
        let variant_embeddings = variants
            .iter()
            .map(|variant| self.embedder.embed(variant))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KbEntry {
            id,
            canonical_question,
            answer,
            decision_type: draft.decision_type,
            jurisdiction: draft.jurisdiction,
            variants,
            embedding,
            variant_embeddings,
            created_at: Utc::now(),
        })
    }

    fn build_passage(&self, draft: PassageDraft) -> Result<RegulatoryPassage, KnowledgeError> {
        let embedding = self
            .embedder
            .embed(&RegulatoryPassage::embedding_text(&draft))?;
        Ok(RegulatoryPassage {
            doc_id: draft.doc_id,
            doc_title: draft.doc_title,
            jurisdiction: draft.jurisdiction,
            section: draft.section,
            snippet: draft.snippet,
            embedding,
        })
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.snapshot();
        f.debug_struct("KnowledgeBase")
            .field("generation", &index.generation)
            .field("entries", &index.entries.len())
            .field("passages", &index.passages.len())
            .finish()
    }
}
