use crate::decisions::domain::{DecisionOutcome, Severity};

use super::rules::RuleVerdict;

/// Strict severity precedence: any failed blocker wins, then any failed review item.
/// Rule order never influences the outcome.
pub(crate) fn decide_outcome(verdicts: &[RuleVerdict<'_>]) -> DecisionOutcome {
    let failed_with = |severity: Severity| {
        verdicts
            .iter()
            .any(|verdict| verdict.is_failed() && verdict.rule.severity == severity)
    };

    if failed_with(Severity::Block) {
        DecisionOutcome::Blocked
    } else if failed_with(Severity::Review) {
        DecisionOutcome::NeedsReview
    } else {
        DecisionOutcome::Approved
    }
}

pub(crate) fn summarize(
    outcome: DecisionOutcome,
    verdicts: &[RuleVerdict<'_>],
    satisfied_count: usize,
) -> String {
    match outcome {
        DecisionOutcome::Approved => {
            let mandatory_passed = verdicts
                .iter()
                .filter(|verdict| {
                    verdict.is_passed_mandatory() && verdict.rule.severity == Severity::Block
                })
                .count();
            format!(
                "Approved: all {} mandatory checks passed and {} requirement(s) are satisfied.",
                mandatory_passed, satisfied_count
            )
        }
        DecisionOutcome::NeedsReview => {
            let review = failed_titles(verdicts, Severity::Review);
            format!(
                "Needs review: {} item(s) require human judgment ({}). No blocking violations were found.",
                review.len(),
                review.join("; ")
            )
        }
        DecisionOutcome::Blocked => {
            let blocking = failed_titles(verdicts, Severity::Block);
            let review = failed_titles(verdicts, Severity::Review);
            let mut summary = format!(
                "Blocked: {} blocking violation(s) ({}).",
                blocking.len(),
                blocking.join("; ")
            );
            if !review.is_empty() {
                summary.push_str(&format!(
                    " {} additional item(s) also need review.",
                    review.len()
                ));
            }
            summary
        }
    }
}

fn failed_titles<'v>(verdicts: &'v [RuleVerdict<'_>], severity: Severity) -> Vec<&'v str> {
    verdicts
        .iter()
        .filter(|verdict| verdict.is_failed() && verdict.rule.severity == severity)
        .map(|verdict| verdict.rule.title.as_str())
        .collect()
}
