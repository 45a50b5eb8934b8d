use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::spec::skip_logic::SkipLogic;

/// Closed set of question kinds a survey can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[serde(alias = "short_text", alias = "text")]
    ShortText,
    #[serde(alias = "long_text", alias = "textarea")]
    LongText,
    Email,
    Number,
    Date,
    #[serde(alias = "single_choice", alias = "radio")]
    SingleChoice,
    #[serde(alias = "multi_choice", alias = "checkbox")]
    MultiChoice,
    #[serde(alias = "select")]
    Dropdown,
    #[serde(alias = "rating_scale", alias = "rating")]
    RatingScale,
}

impl QuestionType {
    /// Kebab-case label used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortText => "short-text",
            QuestionType::LongText => "long-text",
            QuestionType::Email => "email",
            QuestionType::Number => "number",
            QuestionType::Date => "date",
            QuestionType::SingleChoice => "single-choice",
            QuestionType::MultiChoice => "multi-choice",
            QuestionType::Dropdown => "dropdown",
            QuestionType::RatingScale => "rating-scale",
        }
    }

    /// Whether answers are picked from the question's option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultiChoice | QuestionType::Dropdown
        )
    }
}

/// Labeled option for choice questions.
///
/// Authors may write an option as a bare string or as a `{label, value}`
/// object; both shapes collapse into this record when the survey is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum OptionRepr {
    Plain(String),
    Labeled {
        label: String,
        #[serde(default)]
        value: Option<String>,
    },
}

impl<'de> Deserialize<'de> for ChoiceOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match OptionRepr::deserialize(deserializer)? {
            OptionRepr::Plain(text) => ChoiceOption::new(text.clone(), text),
            OptionRepr::Labeled { label, value } => {
                let value = value.unwrap_or_else(|| label.clone());
                ChoiceOption { label, value }
            }
        })
    }
}

/// A single question in the survey sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Vec<OptionRepr>")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "skip_logic")]
    pub skip_logic: Option<SkipLogic>,
}

impl Question {
    /// Minimal question with no options, bounds or skip logic.
    pub fn new(id: impl Into<String>, kind: QuestionType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: None,
            required: false,
            options: Vec::new(),
            min: None,
            max: None,
            skip_logic: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                ChoiceOption::new(value.clone(), value)
            })
            .collect();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_skip_logic(mut self, skip_logic: SkipLogic) -> Self {
        self.skip_logic = Some(skip_logic);
        self
    }

    /// Looks up the option carrying `value`.
    pub fn option(&self, value: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_accept_strings_and_objects() {
        let question: Question = serde_json::from_value(json!({
            "id": "color",
            "type": "single-choice",
            "title": "Color",
            "options": ["Red", { "label": "Sky blue", "value": "blue" }, { "label": "Green" }]
        }))
        .expect("deserialize");

        assert_eq!(question.options[0], ChoiceOption::new("Red", "Red"));
        assert_eq!(question.options[1], ChoiceOption::new("Sky blue", "blue"));
        assert_eq!(question.options[2].value, "Green");
        assert!(!question.required);
    }

    #[test]
    fn legacy_type_labels_are_accepted() {
        let kinds: Vec<QuestionType> =
            serde_json::from_value(json!(["text", "textarea", "multi_choice", "rating"]))
                .expect("deserialize");
        assert_eq!(
            kinds,
            vec![
                QuestionType::ShortText,
                QuestionType::LongText,
                QuestionType::MultiChoice,
                QuestionType::RatingScale
            ]
        );
    }
}
