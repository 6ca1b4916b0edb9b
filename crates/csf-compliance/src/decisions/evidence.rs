use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value representation for a single evidence field.
///
/// The trailing `Other` variant keeps deserialization total: any JSON shape a
/// caller sends is accepted, and predicates that expected something else simply
/// report the requirement as not met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl From<bool> for EvidenceValue {
    fn from(value: bool) -> Self {
        EvidenceValue::Flag(value)
    }
}

impl From<i64> for EvidenceValue {
    fn from(value: i64) -> Self {
        EvidenceValue::Number(value as f64)
    }
}

impl From<f64> for EvidenceValue {
    fn from(value: f64) -> Self {
        EvidenceValue::Number(value)
    }
}

impl From<&str> for EvidenceValue {
    fn from(value: &str) -> Self {
        EvidenceValue::Text(value.to_string())
    }
}

impl From<String> for EvidenceValue {
    fn from(value: String) -> Self {
        EvidenceValue::Text(value)
    }
}

impl From<Vec<&str>> for EvidenceValue {
    fn from(value: Vec<&str>) -> Self {
        EvidenceValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for EvidenceValue {
    fn from(value: Vec<String>) -> Self {
        EvidenceValue::List(value)
    }
}

/// Open key/value description of an applicant. No schema is enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(BTreeMap<String, EvidenceValue>);

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<EvidenceValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EvidenceValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            EvidenceValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            EvidenceValue::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            EvidenceValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key)? {
            EvidenceValue::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Evidence
where
    K: Into<String>,
    V: Into<EvidenceValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
