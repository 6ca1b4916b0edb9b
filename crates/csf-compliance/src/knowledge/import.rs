use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{KbEntryDraft, KbEntryId};
use crate::decisions::domain::{DecisionType, Jurisdiction};

#[derive(Debug, thiserror::Error)]
pub enum KbImportError {
    #[error("failed to read knowledge base export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid knowledge base CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
}

/// Reads authored Q/A pairs from a CSV export with the header
/// `id,canonical_question,answer,decision_type,jurisdiction`.
pub struct KbCsvImporter;

impl KbCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<KbEntryDraft>, KbImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<KbEntryDraft>, KbImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut drafts = Vec::new();

        for (offset, record) in csv_reader.deserialize::<KbRow>().enumerate() {
            // Header is line 1.
            let row = offset + 2;
            let draft = record?.into_draft(row)?;
            if let Some(id) = &draft.id {
                if !seen.insert(id.clone()) {
                    return Err(KbImportError::Row {
                        row,
                        reason: format!("duplicate id {id}"),
                    });
                }
            }
            drafts.push(draft);
        }

        Ok(drafts)
    }
}

#[derive(Debug, Deserialize)]
struct KbRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    canonical_question: String,
    answer: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    decision_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    jurisdiction: Option<String>,
}

impl KbRow {
    fn into_draft(self, row: usize) -> Result<KbEntryDraft, KbImportError> {
        let reject = |reason: String| KbImportError::Row { row, reason };

        if self.canonical_question.is_empty() {
            return Err(reject("canonical_question is empty".to_string()));
        }
        if self.answer.is_empty() {
            return Err(reject("answer is empty".to_string()));
        }

        let decision_type = self
            .decision_type
            .as_deref()
            .map(str::parse::<DecisionType>)
            .transpose()
            .map_err(|error| reject(error.to_string()))?;
        let jurisdiction = self
            .jurisdiction
            .as_deref()
            .map(str::parse::<Jurisdiction>)
            .transpose()
            .map_err(|error| reject(error.to_string()))?
            .unwrap_or(Jurisdiction::Global);

        Ok(KbEntryDraft {
            id: self.id.map(KbEntryId),
            canonical_question: self.canonical_question,
            answer: self.answer,
            decision_type,
            jurisdiction,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}
