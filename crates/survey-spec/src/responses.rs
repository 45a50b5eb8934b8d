use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A collected answer: a scalar or, for multi-choice, an ordered selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl ResponseValue {
    /// Scalar form as a string, numbers rendered without a trailing `.0`.
    /// Lists have no scalar form.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            ResponseValue::Text(text) => Some(text.clone()),
            ResponseValue::Number(number) => Some(number_to_string(*number)),
            ResponseValue::List(_) => None,
        }
    }

    /// Numeric reading of a scalar; unparsable text and lists yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(number) if number.is_finite() => Some(*number),
            ResponseValue::Number(_) => None,
            ResponseValue::Text(text) => parse_number(text),
            ResponseValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ResponseValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Empty string or empty list. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseValue::Text(text) => text.is_empty(),
            ResponseValue::Number(_) => false,
            ResponseValue::List(items) => items.is_empty(),
        }
    }

    /// Human-friendly rendering used by text outputs.
    pub fn to_display(&self) -> String {
        match self {
            ResponseValue::List(items) => items.join(", "),
            scalar => scalar.as_scalar_string().unwrap_or_default(),
        }
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        ResponseValue::Text(value.to_string())
    }
}

impl From<String> for ResponseValue {
    fn from(value: String) -> Self {
        ResponseValue::Text(value)
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        ResponseValue::Number(value)
    }
}

impl From<i64> for ResponseValue {
    fn from(value: i64) -> Self {
        ResponseValue::Number(value as f64)
    }
}

impl From<Vec<String>> for ResponseValue {
    fn from(value: Vec<String>) -> Self {
        ResponseValue::List(value)
    }
}

impl From<Vec<&str>> for ResponseValue {
    fn from(value: Vec<&str>) -> Self {
        ResponseValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Parses trimmed text as a finite number.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn number_to_string(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// Current answer per question id.
///
/// An absent key means "not answered yet", which is distinct from an empty
/// string. Values of questions that become hidden are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseStore {
    values: BTreeMap<String, ResponseValue>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON object, skipping entries that are neither
    /// strings, numbers nor string arrays.
    pub fn from_json(value: &Value) -> Self {
        let mut store = Self::new();
        if let Some(map) = value.as_object() {
            for (key, entry) in map {
                match serde_json::from_value::<ResponseValue>(entry.clone()) {
                    Ok(parsed) => store.set(key.clone(), parsed),
                    Err(_) => {
                        tracing::warn!(question_id = %key, "ignoring response with unsupported shape")
                    }
                }
            }
        }
        store
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(key, value)| {
                (
                    key.clone(),
                    serde_json::to_value(value).unwrap_or(Value::Null),
                )
            })
            .collect();
        Value::Object(map)
    }

    pub fn set(&mut self, question_id: impl Into<String>, value: impl Into<ResponseValue>) {
        self.values.insert(question_id.into(), value.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&ResponseValue> {
        self.values.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.values.contains_key(question_id)
    }

    pub fn remove(&mut self, question_id: &str) -> Option<ResponseValue> {
        self.values.remove(question_id)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Copies every entry of `other` into this store; `other` wins on conflicts.
    pub fn merge(&mut self, other: ResponseStore) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResponseValue)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
