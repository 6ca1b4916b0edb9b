use serde::Serialize;

use crate::decisions::evidence::{Evidence, EvidenceValue};

use super::RegistryError;

/// Declarative requirement over an [`Evidence`] map.
///
/// Every variant treats an absent or mistyped field as "not satisfied", with one
/// deliberate exception: [`Predicate::When`] is vacuously satisfied when its
/// condition does not hold, so conditional requirements only bind applicants
/// they apply to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Field is the boolean `true`.
    IsTrue { field: String },
    /// Field is the boolean `false`; absence does not count.
    IsFalse { field: String },
    /// Field is text matching one of `allowed`, ignoring case and padding.
    TextIn { field: String, allowed: Vec<String> },
    /// Field is a finite number `>= min`.
    AtLeast { field: String, min: f64 },
    /// Field holds a non-blank string, a non-empty list, a number or a flag.
    Present { field: String },
    /// Every entry of the `requested` list appears in the `granted` list.
    Covers { granted: String, requested: String },
    /// If `condition` holds, `then` must hold too.
    When {
        condition: Box<Predicate>,
        then: Box<Predicate>,
    },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
}

impl Predicate {
    pub fn is_true(field: &str) -> Self {
        Predicate::IsTrue {
            field: field.to_string(),
        }
    }

    pub fn is_false(field: &str) -> Self {
        Predicate::IsFalse {
            field: field.to_string(),
        }
    }

    pub fn text_in(field: &str, allowed: &[&str]) -> Self {
        Predicate::TextIn {
            field: field.to_string(),
            allowed: allowed.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn at_least(field: &str, min: f64) -> Self {
        Predicate::AtLeast {
            field: field.to_string(),
            min,
        }
    }

    pub fn present(field: &str) -> Self {
        Predicate::Present {
            field: field.to_string(),
        }
    }

    pub fn covers(granted: &str, requested: &str) -> Self {
        Predicate::Covers {
            granted: granted.to_string(),
            requested: requested.to_string(),
        }
    }

    pub fn when(condition: Predicate, then: Predicate) -> Self {
        Predicate::When {
            condition: Box::new(condition),
            then: Box::new(then),
        }
    }

    pub fn all(of: Vec<Predicate>) -> Self {
        Predicate::All { of }
    }

    pub fn any(of: Vec<Predicate>) -> Self {
        Predicate::Any { of }
    }

    /// Pure evaluation; never panics on any evidence shape.
    pub fn is_satisfied(&self, evidence: &Evidence) -> bool {
        match self {
            Predicate::IsTrue { field } => evidence.flag(field) == Some(true),
            Predicate::IsFalse { field } => evidence.flag(field) == Some(false),
            Predicate::TextIn { field, allowed } => evidence
                .text(field)
                .map(|value| {
                    let value = value.trim();
                    allowed
                        .iter()
                        .any(|candidate| candidate.eq_ignore_ascii_case(value))
                })
                .unwrap_or(false),
            Predicate::AtLeast { field, min } => evidence
                .number(field)
                .map(|value| value >= *min)
                .unwrap_or(false),
            Predicate::Present { field } => match evidence.get(field) {
                Some(EvidenceValue::Text(value)) => !value.trim().is_empty(),
                Some(EvidenceValue::List(values)) => {
                    values.iter().any(|value| !value.trim().is_empty())
                }
                Some(EvidenceValue::Number(value)) => value.is_finite(),
                Some(EvidenceValue::Flag(_)) => true,
                Some(EvidenceValue::Other(_)) | None => false,
            },
            Predicate::Covers { granted, requested } => {
                match (evidence.list(granted), evidence.list(requested)) {
                    (Some(granted), Some(requested)) => requested.iter().all(|wanted| {
                        granted
                            .iter()
                            .any(|held| normalize_code(held) == normalize_code(wanted))
                    }),
                    _ => false,
                }
            }
            Predicate::When { condition, then } => {
                !condition.is_satisfied(evidence) || then.is_satisfied(evidence)
            }
            Predicate::All { of } => of.iter().all(|predicate| predicate.is_satisfied(evidence)),
            Predicate::Any { of } => of.iter().any(|predicate| predicate.is_satisfied(evidence)),
        }
    }

    /// Evidence fields the predicate reads, in declaration order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::IsTrue { field }
            | Predicate::IsFalse { field }
            | Predicate::TextIn { field, .. }
            | Predicate::AtLeast { field, .. }
            | Predicate::Present { field } => out.push(field),
            Predicate::Covers { granted, requested } => {
                out.push(granted);
                out.push(requested);
            }
            Predicate::When { condition, then } => {
                condition.collect_fields(out);
                then.collect_fields(out);
            }
            Predicate::All { of } | Predicate::Any { of } => {
                for predicate in of {
                    predicate.collect_fields(out);
                }
            }
        }
    }

    pub(crate) fn validate(&self, rule_id: &str) -> Result<(), RegistryError> {
        let malformed = |reason: String| RegistryError::MalformedPredicate {
            rule_id: rule_id.to_string(),
            reason,
        };

        match self {
            Predicate::IsTrue { field }
            | Predicate::IsFalse { field }
            | Predicate::Present { field } => validate_field(field).map_err(malformed),
            Predicate::TextIn { field, allowed } => {
                validate_field(field).map_err(malformed)?;
                if allowed.iter().all(|value| value.trim().is_empty()) {
                    return Err(malformed(format!("text_in on '{field}' allows no values")));
                }
                Ok(())
            }
            Predicate::AtLeast { field, min } => {
                validate_field(field).map_err(malformed)?;
                if !min.is_finite() {
                    return Err(malformed(format!("threshold for '{field}' is not finite")));
                }
                Ok(())
            }
            Predicate::Covers { granted, requested } => {
                validate_field(granted).map_err(malformed)?;
                validate_field(requested).map_err(malformed)?;
                if granted == requested {
                    return Err(malformed(format!(
                        "covers compares '{granted}' against itself"
                    )));
                }
                Ok(())
            }
            Predicate::When { condition, then } => {
                condition.validate(rule_id)?;
                then.validate(rule_id)
            }
            Predicate::All { of } | Predicate::Any { of } => {
                if of.is_empty() {
                    return Err(malformed("combinator has no operands".to_string()));
                }
                of.iter().try_for_each(|predicate| predicate.validate(rule_id))
            }
        }
    }
}

fn validate_field(field: &str) -> Result<(), String> {
    let well_formed = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if well_formed {
        Ok(())
    } else {
        Err(format!("evidence field '{field}' must be non-empty snake_case"))
    }
}

fn normalize_code(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
