use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decisions::domain::{DecisionType, Jurisdiction};

/// Identifier wrapper for knowledge-base entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KbEntryId(pub String);

impl fmt::Display for KbEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authored question/answer pair before variants and embeddings are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntryDraft {
    #[serde(default)]
    pub id: Option<KbEntryId>,
    pub canonical_question: String,
    pub answer: String,
    #[serde(default)]
    pub decision_type: Option<DecisionType>,
    #[serde(default = "global")]
    pub jurisdiction: Jurisdiction,
}

fn global() -> Jurisdiction {
    Jurisdiction::Global
}

/// Indexed entry. Variants and their embeddings are always replaced together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbEntry {
    pub id: KbEntryId,
    pub canonical_question: String,
    pub answer: String,
    pub decision_type: Option<DecisionType>,
    pub jurisdiction: Jurisdiction,
    pub variants: Vec<String>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
    #[serde(skip)]
    pub variant_embeddings: Vec<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl KbEntry {
    /// Text scored for a match: `None` is the canonical question.
    pub fn text_for(&self, variant_index: Option<usize>) -> Option<&str> {
        match variant_index {
            None => Some(self.canonical_question.as_str()),
            Some(index) => self.variants.get(index).map(String::as_str),
        }
    }

    pub fn applies_to(&self, decision_type: Option<DecisionType>) -> bool {
        match (decision_type, self.decision_type) {
            (None, _) | (_, None) => true,
            (Some(wanted), Some(tagged)) => wanted == tagged,
        }
    }
}

/// Result of a single lookup against one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub kb_entry_id: KbEntryId,
    pub matched_text: String,
    pub matched_variant_index: Option<usize>,
    pub score: f32,
}

/// Regulatory text that may back a fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageDraft {
    pub doc_id: String,
    pub doc_title: String,
    pub jurisdiction: Jurisdiction,
    pub section: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegulatoryPassage {
    pub doc_id: String,
    pub doc_title: String,
    pub jurisdiction: Jurisdiction,
    pub section: String,
    pub snippet: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl RegulatoryPassage {
    pub(crate) fn embedding_text(draft: &PassageDraft) -> String {
        format!("{} {} {}", draft.doc_title, draft.section, draft.snippet)
    }
}
