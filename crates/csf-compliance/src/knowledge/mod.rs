//! Knowledge-base retrieval: authored answers, paraphrase expansion,
//! embedding search, confidence gating and citation evidence.

pub mod citations;
pub mod corpus;
pub mod domain;
pub mod embedding;
pub mod gate;
pub mod import;
pub mod index;
pub mod review;
pub mod router;
pub mod service;
pub mod variants;

#[cfg(test)]
mod tests;

pub use citations::{assemble_evidence, MAX_EVIDENCE_PER_RULE};
pub use corpus::{standard_entries, standard_passages};
pub use domain::{KbEntry, KbEntryDraft, KbEntryId, MatchResult, PassageDraft, RegulatoryPassage};
pub use embedding::{
    cosine_similarity, CachedEmbedder, Embedder, EmbeddingError, LexicalEmbedder,
    DEFAULT_DIMENSIONS,
};
pub use gate::{Answer, Escalation, EscalationReason, GateDecision, RetrievalGate};
pub use import::{KbCsvImporter, KbImportError};
pub use index::{KnowledgeBase, KnowledgeError, KnowledgeIndex};
pub use review::{ReviewQueue, ReviewQueueError, ReviewTicketId};
pub use router::knowledge_router;
pub use service::{
    AskRequest, AskResponse, KnowledgeService, KnowledgeServiceError, SearchRequest,
    SearchResponse,
};
pub use variants::{generate_variants, QuestionVariantGenerator, VariantContext};
