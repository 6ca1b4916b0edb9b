//! Deterministic paraphrases of canonical questions.
//!
//! Every transformation is a row in one of the tables below so reviewers can
//! audit exactly how a question may be reworded. No randomness, no model calls.

use std::collections::HashSet;

use crate::decisions::domain::{DecisionType, Jurisdiction};

pub const MIN_VARIANTS: usize = 3;
pub const MAX_VARIANTS: usize = 5;
const MAX_SYNONYM_VARIANTS: usize = 2;

/// Whole-word substitutions, applied left-to-right or right-to-left.
const SYNONYMS: &[(&str, &str)] = &[
    ("license", "registration"),
    ("licenses", "registrations"),
    ("renew", "extend"),
    ("requirements", "rules"),
    ("prescriber", "practitioner"),
    ("pharmacy", "dispensary"),
    ("expire", "lapse"),
    ("obtain", "get"),
    ("submit", "file"),
    ("form", "application"),
];

/// Leading-clause rewrites, matched case-insensitively against the question start.
const REORDERINGS: &[(&str, &str)] = &[
    ("how do i ", "What is the process to "),
    ("how can i ", "What is the process to "),
    ("how do we ", "What is the process for us to "),
    ("what is the process to ", "How do I "),
    ("what do i need to ", "What is required to "),
    ("do i need ", "Is it required to have "),
    ("is it required to have ", "Do I need "),
    ("can i ", "Is it permitted to "),
    ("can we ", "Is it permitted for us to "),
    ("what are the requirements for ", "What is required for "),
    ("when does ", "At what point does "),
    ("who can ", "Which parties may "),
];

const LOCATIONS: &[&str] = &["in Ohio", "in New York", "under federal law"];

/// Place names that mark a question as already scoped.
const PLACE_NAMES: &[&str] = &["ohio", "new york", "federal"];

/// Padding that adds no jurisdiction or entity.
const NEUTRAL_QUALIFIERS: &[&str] = &["at this time", "in plain terms", "for compliance purposes"];

/// Qualifier phrase and the noun whose presence makes it redundant.
const ENTITY_QUALIFIERS: &[(&str, &str)] = &[
    ("for a pharmacy", "pharmacy"),
    ("for a hospital", "hospital"),
    ("for a practitioner", "practitioner"),
    ("for a clinic", "clinic"),
];

/// Optional hints that steer context insertion toward an entry's own scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantContext {
    pub jurisdiction: Option<Jurisdiction>,
    pub entity: Option<String>,
}

impl VariantContext {
    /// Scope taken from an entry's jurisdiction and decision type.
    pub fn for_entry(jurisdiction: &Jurisdiction, decision_type: Option<DecisionType>) -> Self {
        Self {
            jurisdiction: Some(jurisdiction.clone()),
            entity: decision_type.map(|decision_type| entity_noun(decision_type).to_string()),
        }
    }
}

fn entity_noun(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::CsfPractitioner => "practitioner",
        DecisionType::CsfFacility | DecisionType::OhioTddd => "facility",
        DecisionType::NyPharmacyLicense => "pharmacy",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionVariantGenerator;

impl QuestionVariantGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Between [`MIN_VARIANTS`] and [`MAX_VARIANTS`] paraphrases of `question`.
    pub fn generate_variants(&self, question: &str) -> Vec<String> {
        self.generate_for(question, &VariantContext::default())
    }

    pub fn generate_for(&self, question: &str, context: &VariantContext) -> Vec<String> {
        let question = collapse_whitespace(question);
        let lowered = question.to_lowercase();
        let mut variants = VariantSet::new(&question);

        if let Some(reordered) = reorder(&question) {
            variants.push(reordered);
        }

        SYNONYMS
            .iter()
            .filter_map(|(left, right)| substitute(&question, left, right))
            .take(MAX_SYNONYM_VARIANTS)
            .for_each(|variant| variants.push(variant));

        let names_place = names_place(context, &lowered);
        if !names_place {
            variants.push(with_suffix(&question, &location_phrase(context)));
        }

        let entity = entity_phrase(context, &lowered);
        if let Some(entity) = &entity {
            variants.push(with_suffix(&question, entity));
        }

        // Scoped entries are only ever padded with their own entity or neutral wording.
        let scoped = matches!(
            context.jurisdiction,
            Some(Jurisdiction::State(_) | Jurisdiction::Federal)
        );
        let entities: Vec<&str> = if context.entity.is_some() {
            Vec::new()
        } else {
            ENTITY_QUALIFIERS
                .iter()
                .filter(|(_, noun)| !lowered.contains(noun))
                .map(|(phrase, _)| *phrase)
                .collect()
        };
        let locations: &[&str] = if scoped || names_place { &[] } else { LOCATIONS };
        let padding = entities
            .into_iter()
            .chain(locations.iter().copied())
            .chain(NEUTRAL_QUALIFIERS.iter().copied());
        for phrase in padding {
            if variants.len() >= MIN_VARIANTS {
                break;
            }
            variants.push(with_suffix(&question, phrase));
        }

        variants.into_vec()
    }
}

/// Convenience wrapper over the default generator.
pub fn generate_variants(question: &str) -> Vec<String> {
    QuestionVariantGenerator.generate_variants(question)
}

struct VariantSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl VariantSet {
    fn new(canonical: &str) -> Self {
        let mut seen = HashSet::new();
        seen.insert(normalized_key(canonical));
        Self {
            seen,
            items: Vec::new(),
        }
    }

    fn push(&mut self, candidate: String) {
        if self.items.len() >= MAX_VARIANTS {
            return;
        }
        let candidate = collapse_whitespace(&candidate);
        if candidate.is_empty() {
            return;
        }
        if self.seen.insert(normalized_key(&candidate)) {
            self.items.push(candidate);
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

fn reorder(question: &str) -> Option<String> {
    let lowered = question.to_lowercase();
    for (prefix, replacement) in REORDERINGS {
        if lowered.starts_with(prefix) && question.is_char_boundary(prefix.len()) {
            return Some(format!("{replacement}{}", &question[prefix.len()..]));
        }
    }

    let (head, tail) = question.split_once(" for ")?;
    let tail = trim_terminal(tail);
    if head.is_empty() || tail.is_empty() {
        return None;
    }
    Some(format!("For {tail}, {}?", lowercase_first(head)))
}

fn substitute(question: &str, left: &str, right: &str) -> Option<String> {
    replace_word(question, left, right).or_else(|| replace_word(question, right, left))
}

fn replace_word(question: &str, from: &str, to: &str) -> Option<String> {
    let mut replaced = false;
    let words: Vec<String> = question
        .split(' ')
        .map(|word| {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if !core.is_empty() && core.eq_ignore_ascii_case(from) {
                replaced = true;
                word.replacen(core, &match_case(core, to), 1)
            } else {
                word.to_string()
            }
        })
        .collect();

    replaced.then(|| words.join(" "))
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

fn names_place(context: &VariantContext, lowered_question: &str) -> bool {
    let own = context
        .jurisdiction
        .as_ref()
        .map(|jurisdiction| jurisdiction.display_name().to_lowercase());
    PLACE_NAMES
        .iter()
        .any(|place| lowered_question.contains(place))
        || own.is_some_and(|place| lowered_question.contains(&place))
}

fn location_phrase(context: &VariantContext) -> String {
    match &context.jurisdiction {
        Some(Jurisdiction::Federal) => "under federal law".to_string(),
        Some(jurisdiction @ Jurisdiction::State(_)) => {
            format!("in {}", jurisdiction.display_name())
        }
        Some(Jurisdiction::Global) | None => LOCATIONS[0].to_string(),
    }
}

/// `None` when the question already names the entity it would add.
fn entity_phrase(context: &VariantContext, lowered_question: &str) -> Option<String> {
    if let Some(entity) = context
        .entity
        .as_deref()
        .map(str::trim)
        .filter(|entity| !entity.is_empty())
    {
        let entity = entity.to_lowercase();
        return (!lowered_question.contains(&entity)).then(|| format!("for a {entity}"));
    }

    ENTITY_QUALIFIERS
        .iter()
        .find(|(_, noun)| !lowered_question.contains(noun))
        .map(|(phrase, _)| phrase.to_string())
}

fn with_suffix(question: &str, suffix: &str) -> String {
    let base = trim_terminal(question);
    if base.is_empty() {
        return format!("{}?", capitalize(suffix));
    }
    format!("{base} {suffix}?")
}

fn trim_terminal(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '.' | '!' | ' '))
}

fn normalized_key(text: &str) -> String {
    collapse_whitespace(trim_terminal(text)).to_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
