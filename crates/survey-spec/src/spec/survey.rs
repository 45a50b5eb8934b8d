use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::question::Question;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("failed to parse survey: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered question sequence plus presentation metadata.
///
/// Question order is both the presentation order and the dependency order:
/// skip logic may only look backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Survey {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            questions,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SurveyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSON schema describing the authored survey document.
    pub fn json_schema() -> Value {
        serde_json::to_value(schemars::schema_for!(Survey)).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn index_of(&self, question_id: &str) -> Option<usize> {
        self.questions
            .iter()
            .position(|question| question.id == question_id)
    }

    pub fn question_by_id(&self, question_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }
}
