use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decision families with their own rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    CsfPractitioner,
    CsfFacility,
    OhioTddd,
    NyPharmacyLicense,
}

impl DecisionType {
    pub const ALL: [DecisionType; 4] = [
        DecisionType::CsfPractitioner,
        DecisionType::CsfFacility,
        DecisionType::OhioTddd,
        DecisionType::NyPharmacyLicense,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DecisionType::CsfPractitioner => "csf_practitioner",
            DecisionType::CsfFacility => "csf_facility",
            DecisionType::OhioTddd => "ohio_tddd",
            DecisionType::NyPharmacyLicense => "ny_pharmacy_license",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decision type '{0}'")]
pub struct UnknownDecisionType(pub String);

impl FromStr for DecisionType {
    type Err = UnknownDecisionType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        DecisionType::ALL
            .into_iter()
            .find(|decision_type| decision_type.label() == normalized)
            .ok_or_else(|| UnknownDecisionType(value.to_string()))
    }
}

/// Rule importance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Block,
    Review,
    Info,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Block => "block",
            Severity::Review => "review",
            Severity::Info => "info",
        }
    }

    pub const fn is_mandatory(self) -> bool {
        matches!(self, Severity::Block | Severity::Review)
    }
}

/// Regulatory scope of a rule or a cited passage.
///
/// `Global` passages may back any rule; every other value only backs rules in
/// the same jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Jurisdiction {
    Global,
    Federal,
    State(String),
}

impl Jurisdiction {
    pub fn state(code: &str) -> Self {
        Jurisdiction::State(code.trim().to_ascii_uppercase())
    }

    /// Whether material tagged with `self` may be cited for a rule in `rule`.
    pub fn may_cite_for(&self, rule: &Jurisdiction) -> bool {
        matches!(self, Jurisdiction::Global) || self == rule
    }

    /// Human-readable place name used when inserting context into questions.
    pub fn display_name(&self) -> &str {
        match self {
            Jurisdiction::Global => "the United States",
            Jurisdiction::Federal => "federal law",
            Jurisdiction::State(code) => state_name(code).unwrap_or(code.as_str()),
        }
    }
}

fn state_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "OH" => "Ohio",
        "NY" => "New York",
        "CA" => "California",
        "TX" => "Texas",
        "FL" => "Florida",
        "PA" => "Pennsylvania",
        "NJ" => "New Jersey",
        "MI" => "Michigan",
        _ => return None,
    })
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jurisdiction::Global => f.write_str("GLOBAL"),
            Jurisdiction::Federal => f.write_str("US-FED"),
            Jurisdiction::State(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("jurisdiction '{0}' is not GLOBAL, US-FED, or a two-letter state code")]
pub struct InvalidJurisdiction(pub String);

impl TryFrom<String> for Jurisdiction {
    type Error = InvalidJurisdiction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Jurisdiction {
    type Err = InvalidJurisdiction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" | "GLOBAL" | "ALL" => Ok(Jurisdiction::Global),
            "US-FED" | "FEDERAL" | "US" => Ok(Jurisdiction::Federal),
            code if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Ok(Jurisdiction::State(code.to_string()))
            }
            _ => Err(InvalidJurisdiction(value.to_string())),
        }
    }
}

impl From<Jurisdiction> for String {
    fn from(value: Jurisdiction) -> Self {
        value.to_string()
    }
}

/// Per-rule verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Passed,
    Failed,
    Info,
}

/// Aggregate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    NeedsReview,
    Blocked,
}

impl DecisionOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::NeedsReview => "needs_review",
            DecisionOutcome::Blocked => "blocked",
        }
    }
}

/// One entry per rule in the active rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRule {
    #[serde(rename = "id")]
    pub rule_id: String,
    pub title: String,
    pub severity: Severity,
    pub status: RuleStatus,
    pub citation: String,
    pub jurisdiction: Jurisdiction,
    #[serde(rename = "requirement")]
    pub requirement_text: String,
}

/// Link from a fired rule back to supporting regulatory text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChip {
    pub doc_id: String,
    pub doc_title: String,
    pub jurisdiction: Jurisdiction,
    pub section: String,
    pub snippet: String,
    pub relevance: f32,
}

/// A failed block/review rule and the citations that back it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredRule {
    #[serde(flatten)]
    pub rule: EvaluatedRule,
    #[serde(default)]
    pub evidence: Vec<EvidenceChip>,
}

/// Complete, self-describing decision returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision_type: DecisionType,
    pub registry_version: String,
    pub outcome: DecisionOutcome,
    pub evaluated_rules: Vec<EvaluatedRule>,
    pub fired_rules: Vec<FiredRule>,
    pub satisfied_requirements: Vec<String>,
    pub missing_evidence: Vec<String>,
    pub next_steps: Vec<String>,
    pub decision_summary: String,
}

impl DecisionResult {
    pub fn citation_count(&self) -> usize {
        self.fired_rules.iter().map(|rule| rule.evidence.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_type_parses_labels_and_dashes() {
        assert_eq!(
            "csf-practitioner".parse::<DecisionType>(),
            Ok(DecisionType::CsfPractitioner)
        );
        assert_eq!(
            " OHIO_TDDD ".parse::<DecisionType>(),
            Ok(DecisionType::OhioTddd)
        );
        assert!("csf_researcher".parse::<DecisionType>().is_err());
    }

    #[test]
    fn jurisdiction_round_trips_as_string() {
        let value = serde_json::to_value(Jurisdiction::state("oh")).expect("serializes");
        assert_eq!(value, serde_json::json!("OH"));
        let federal: Jurisdiction = serde_json::from_str("\"US-FED\"").expect("parses");
        assert_eq!(federal, Jurisdiction::Federal);
        assert!(serde_json::from_str::<Jurisdiction>("\"Ohio\"").is_err());
    }

    #[test]
    fn global_material_may_back_any_rule() {
        let ohio = Jurisdiction::state("OH");
        assert!(Jurisdiction::Global.may_cite_for(&ohio));
        assert!(ohio.may_cite_for(&ohio));
        assert!(!Jurisdiction::state("NY").may_cite_for(&ohio));
        assert!(!Jurisdiction::Federal.may_cite_for(&ohio));
    }
}
