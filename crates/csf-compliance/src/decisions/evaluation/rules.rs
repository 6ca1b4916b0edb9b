use crate::decisions::domain::{EvaluatedRule, RuleStatus, Severity};
use crate::decisions::evidence::Evidence;
use crate::decisions::registry::Rule;

/// Verdict for one rule, carrying the registry entry for narrative rendering.
pub(crate) struct RuleVerdict<'a> {
    pub rule: &'a Rule,
    pub status: RuleStatus,
}

impl RuleVerdict<'_> {
    pub fn is_failed(&self) -> bool {
        self.status == RuleStatus::Failed
    }

    pub fn is_passed_mandatory(&self) -> bool {
        self.status == RuleStatus::Passed && self.rule.severity.is_mandatory()
    }

    pub fn to_evaluated(&self) -> EvaluatedRule {
        EvaluatedRule {
            rule_id: self.rule.id.clone(),
            title: self.rule.title.clone(),
            severity: self.rule.severity,
            status: self.status,
            citation: self.rule.citation.clone(),
            jurisdiction: self.rule.jurisdiction.clone(),
            requirement_text: self.rule.requirement_text.clone(),
        }
    }
}

/// Apply every rule in table order; exactly one verdict per rule.
pub(crate) fn apply_rules<'a>(rules: &'a [Rule], evidence: &Evidence) -> Vec<RuleVerdict<'a>> {
    rules
        .iter()
        .map(|rule| RuleVerdict {
            rule,
            status: classify(rule, evidence),
        })
        .collect()
}

fn classify(rule: &Rule, evidence: &Evidence) -> RuleStatus {
    match rule.severity {
        Severity::Info => RuleStatus::Info,
        Severity::Block | Severity::Review => {
            if rule.predicate.is_satisfied(evidence) {
                RuleStatus::Passed
            } else {
                RuleStatus::Failed
            }
        }
    }
}
