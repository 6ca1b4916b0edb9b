//! Versioned, read-only catalog of regulatory rules keyed by decision type.
//!
//! Tables are plain data: each rule carries a declarative [`Predicate`], so adding
//! a requirement never touches evaluator control flow. [`RuleRegistry::load_standard`]
//! validates every table once at startup and fails fast on malformed rule data.

mod facility;
mod new_york;
mod ohio;
mod practitioner;
mod predicate;

pub use predicate::Predicate;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{DecisionType, Jurisdiction, Severity};

pub const STANDARD_REGISTRY_VERSION: &str = "2026.10.1";

/// Human-readable strings surfaced for the rule in decision narratives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleNarrative {
    pub satisfied: String,
    pub missing: String,
    pub next_step: String,
}

/// A single regulatory requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub jurisdiction: Jurisdiction,
    pub citation: String,
    pub rationale: String,
    pub requirement_text: String,
    pub predicate: Predicate,
    pub narrative: RuleNarrative,
}

impl Rule {
    pub fn builder(id: &str, title: &str, severity: Severity) -> RuleBuilder {
        RuleBuilder {
            rule: Rule {
                id: id.to_string(),
                title: title.to_string(),
                severity,
                jurisdiction: Jurisdiction::Federal,
                citation: String::new(),
                rationale: String::new(),
                requirement_text: String::new(),
                predicate: Predicate::All { of: Vec::new() },
                narrative: RuleNarrative {
                    satisfied: String::new(),
                    missing: String::new(),
                    next_step: String::new(),
                },
            },
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let incomplete = |field: &'static str| RegistryError::IncompleteRule {
            rule_id: self.id.clone(),
            field,
        };

        if self.id.trim().is_empty() {
            return Err(incomplete("id"));
        }
        if self.title.trim().is_empty() {
            return Err(incomplete("title"));
        }
        if self.citation.trim().is_empty() {
            return Err(incomplete("citation"));
        }
        if self.requirement_text.trim().is_empty() {
            return Err(incomplete("requirement_text"));
        }
        if self.severity.is_mandatory()
            && (self.narrative.missing.trim().is_empty()
                || self.narrative.next_step.trim().is_empty())
        {
            return Err(incomplete("narrative"));
        }
        self.predicate.validate(&self.id)
    }
}

/// Fluent constructor used by the static rule tables.
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.rule.jurisdiction = jurisdiction;
        self
    }

    pub fn citation(mut self, citation: &str) -> Self {
        self.rule.citation = citation.to_string();
        self
    }

    pub fn rationale(mut self, rationale: &str) -> Self {
        self.rule.rationale = rationale.to_string();
        self
    }

    pub fn requirement(mut self, requirement: &str) -> Self {
        self.rule.requirement_text = requirement.to_string();
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.rule.predicate = predicate;
        self
    }

    pub fn narrative(mut self, satisfied: &str, missing: &str, next_step: &str) -> Self {
        self.rule.narrative = RuleNarrative {
            satisfied: satisfied.to_string(),
            missing: missing.to_string(),
            next_step: next_step.to_string(),
        };
        self
    }

    pub fn build(self) -> Rule {
        self.rule
    }
}

/// Registry load failures. These are configuration errors and must stop startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("rule id '{0}' is registered more than once")]
    DuplicateRuleId(String),
    #[error("decision type {0} has more than one rule table")]
    DuplicateTable(DecisionType),
    #[error("rule '{rule_id}' is missing {field}")]
    IncompleteRule {
        rule_id: String,
        field: &'static str,
    },
    #[error("rule '{rule_id}' has a malformed predicate: {reason}")]
    MalformedPredicate { rule_id: String, reason: String },
}

/// Immutable rule tables, shared behind an `Arc` by every evaluation.
#[derive(Debug)]
pub struct RuleRegistry {
    version: String,
    tables: BTreeMap<DecisionType, Arc<[Rule]>>,
}

impl RuleRegistry {
    /// Load and validate the built-in tables.
    pub fn load_standard() -> Result<Self, RegistryError> {
        let registry = Self::builder(STANDARD_REGISTRY_VERSION)
            .table(DecisionType::CsfPractitioner, practitioner::rules())
            .table(DecisionType::CsfFacility, facility::rules())
            .table(DecisionType::OhioTddd, ohio::rules())
            .table(DecisionType::NyPharmacyLicense, new_york::rules())
            .build()?;

        info!(
            version = %registry.version,
            tables = registry.tables.len(),
            rules = registry.rule_count(),
            "rule registry loaded"
        );
        Ok(registry)
    }

    pub fn builder(version: &str) -> RegistryBuilder {
        RegistryBuilder {
            version: version.to_string(),
            tables: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rules for `decision_type` in table order. Unregistered types yield no rules.
    pub fn get_rules(&self, decision_type: DecisionType) -> &[Rule] {
        self.tables
            .get(&decision_type)
            .map(|rules| &**rules)
            .unwrap_or(&[])
    }

    pub fn decision_types(&self) -> impl Iterator<Item = DecisionType> + '_ {
        self.tables.keys().copied()
    }

    pub fn find(&self, rule_id: &str) -> Option<&Rule> {
        self.tables
            .values()
            .flat_map(|rules| rules.iter())
            .find(|rule| rule.id == rule_id)
    }

    pub fn rule_count(&self) -> usize {
        self.tables.values().map(|rules| rules.len()).sum()
    }
}

pub struct RegistryBuilder {
    version: String,
    tables: Vec<(DecisionType, Vec<Rule>)>,
}

impl RegistryBuilder {
    pub fn table(mut self, decision_type: DecisionType, rules: Vec<Rule>) -> Self {
        self.tables.push((decision_type, rules));
        self
    }

    pub fn build(self) -> Result<RuleRegistry, RegistryError> {
        let mut seen_ids = HashSet::new();
        let mut tables: BTreeMap<DecisionType, Arc<[Rule]>> = BTreeMap::new();

        for (decision_type, rules) in self.tables {
            for rule in &rules {
                rule.validate()?;
                if !seen_ids.insert(rule.id.clone()) {
                    return Err(RegistryError::DuplicateRuleId(rule.id.clone()));
                }
            }
            if tables.insert(decision_type, Arc::from(rules)).is_some() {
                return Err(RegistryError::DuplicateTable(decision_type));
            }
        }

        Ok(RuleRegistry {
            version: self.version,
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule(id: &str) -> Rule {
        Rule::builder(id, "Sample", Severity::Block)
            .citation("21 CFR 1301.13")
            .requirement("Sample requirement")
            .predicate(Predicate::is_true("sample"))
            .narrative("Sample confirmed", "Sample evidence", "Provide the sample")
            .build()
    }

    #[test]
    fn standard_tables_load_and_keep_insertion_order() {
        let registry = RuleRegistry::load_standard().expect("standard registry is valid");
        assert_eq!(registry.version(), STANDARD_REGISTRY_VERSION);
        for decision_type in DecisionType::ALL {
            assert!(
                !registry.get_rules(decision_type).is_empty(),
                "{decision_type} has rules"
            );
        }

        let first: Vec<_> = registry
            .get_rules(DecisionType::CsfPractitioner)
            .iter()
            .map(|rule| rule.id.clone())
            .collect();
        let second: Vec<_> = registry
            .get_rules(DecisionType::CsfPractitioner)
            .iter()
            .map(|rule| rule.id.clone())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "csf_pract_dea_registration");
    }

    #[test]
    fn rejects_duplicate_rule_ids_across_tables() {
        let result = RuleRegistry::builder("test")
            .table(DecisionType::CsfPractitioner, vec![sample_rule("dup")])
            .table(DecisionType::CsfFacility, vec![sample_rule("dup")])
            .build();
        assert_eq!(result.err(), Some(RegistryError::DuplicateRuleId("dup".to_string())));
    }

    #[test]
    fn rejects_rule_without_citation() {
        let mut rule = sample_rule("no-citation");
        rule.citation.clear();
        let result = RuleRegistry::builder("test")
            .table(DecisionType::OhioTddd, vec![rule])
            .build();
        assert!(matches!(
            result,
            Err(RegistryError::IncompleteRule { field: "citation", .. })
        ));
    }

    #[test]
    fn rejects_builder_default_predicate() {
        let rule = Rule::builder("unfinished", "Unfinished", Severity::Review)
            .citation("OAC 4729:5-3-01")
            .requirement("Something")
            .narrative("ok", "missing", "next")
            .build();
        let result = RuleRegistry::builder("test")
            .table(DecisionType::OhioTddd, vec![rule])
            .build();
        assert!(matches!(
            result,
            Err(RegistryError::MalformedPredicate { .. })
        ));
    }

    #[test]
    fn unregistered_type_has_no_rules() {
        let registry = RuleRegistry::builder("empty")
            .table(DecisionType::CsfFacility, Vec::new())
            .build()
            .expect("empty tables are valid");
        assert!(registry.get_rules(DecisionType::CsfFacility).is_empty());
        assert!(registry.get_rules(DecisionType::OhioTddd).is_empty());
    }
}
