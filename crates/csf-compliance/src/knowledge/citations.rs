use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::warn;

use super::domain::RegulatoryPassage;
use super::embedding::cosine_similarity;
use super::index::KnowledgeBase;
use crate::decisions::domain::{EvaluatedRule, EvidenceChip, Jurisdiction};
use crate::decisions::explain::CitationSource;

pub const MAX_EVIDENCE_PER_RULE: usize = 3;

/// Final evidence list for one fired rule.
///
/// Drops chips the rule's jurisdiction may not cite, keeps the best-scoring chip
/// per exact `(doc_title, snippet)`, orders by descending relevance and keeps the
/// top [`MAX_EVIDENCE_PER_RULE`]. Running it on its own output changes nothing.
pub fn assemble_evidence(
    candidates: Vec<EvidenceChip>,
    rule_jurisdiction: &Jurisdiction,
) -> Vec<EvidenceChip> {
    let mut best: HashMap<(String, String), EvidenceChip> = HashMap::new();
    for chip in candidates {
        if !chip.jurisdiction.may_cite_for(rule_jurisdiction) || !chip.relevance.is_finite() {
            continue;
        }
        let key = (chip.doc_title.clone(), chip.snippet.clone());
        match best.get(&key) {
            Some(existing) if existing.relevance >= chip.relevance => {}
            _ => {
                best.insert(key, chip);
            }
        }
    }

    let mut chips: Vec<EvidenceChip> = best.into_values().collect();
    chips.sort_by(compare_chips);
    chips.truncate(MAX_EVIDENCE_PER_RULE);
    chips
}

fn compare_chips(left: &EvidenceChip, right: &EvidenceChip) -> Ordering {
    right
        .relevance
        .total_cmp(&left.relevance)
        .then_with(|| left.doc_id.cmp(&right.doc_id))
        .then_with(|| left.section.cmp(&right.section))
        .then_with(|| left.snippet.cmp(&right.snippet))
}

fn citation_query(rule: &EvaluatedRule) -> String {
    format!("{} {} {}", rule.citation, rule.title, rule.requirement_text)
}

fn chip_for(passage: &RegulatoryPassage, relevance: f32) -> EvidenceChip {
    EvidenceChip {
        doc_id: passage.doc_id.clone(),
        doc_title: passage.doc_title.clone(),
        jurisdiction: passage.jurisdiction.clone(),
        section: passage.section.clone(),
        snippet: passage.snippet.clone(),
        relevance,
    }
}

impl CitationSource for KnowledgeBase {
    fn candidates(&self, rule: &EvaluatedRule) -> Vec<EvidenceChip> {
        let index = self.snapshot();
        if index.passages().is_empty() {
            return Vec::new();
        }

        let query = match self.embedder().embed(&citation_query(rule)) {
            Ok(query) => query,
            Err(error) => {
                warn!(rule_id = %rule.rule_id, %error, "citation lookup skipped");
                return Vec::new();
            }
        };

        let floor = self.config().citation_min_relevance;
        index
            .passages()
            .iter()
            .filter(|passage| passage.jurisdiction.may_cite_for(&rule.jurisdiction))
            .filter_map(|passage| {
                let relevance = if passage.section.eq_ignore_ascii_case(&rule.citation) {
                    1.0
                } else {
                    cosine_similarity(&query, &passage.embedding)
                };
                (relevance >= floor).then(|| chip_for(passage, relevance))
            })
            .collect()
    }
}
