use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::responses::{ResponseStore, ResponseValue};
use crate::spec::{Question, QuestionType, Survey};
use crate::visibility::is_visible;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));

/// Advisory problem with an answer's shape. Never blocks navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub question_id: String,
    pub message: String,
    pub code: String,
}

/// Full validation outcome over every visible question.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub missing_required: Vec<String>,
    pub unmet_titles: Vec<String>,
    pub errors: Vec<ValidationError>,
    pub unknown_fields: Vec<String>,
}

/// Whether `question`'s completion constraint holds for `value`.
///
/// Optional questions are always satisfied.
pub fn is_satisfied(question: &Question, value: Option<&ResponseValue>) -> bool {
    if !question.required {
        return true;
    }
    let Some(value) = value else {
        return false;
    };

    match question.kind {
        QuestionType::MultiChoice => value.as_list().is_some_and(|items| !items.is_empty()),
        QuestionType::SingleChoice | QuestionType::Dropdown | QuestionType::RatingScale => {
            !value.is_empty()
        }
        QuestionType::ShortText
        | QuestionType::LongText
        | QuestionType::Email
        | QuestionType::Number
        | QuestionType::Date => match value {
            ResponseValue::Text(text) => !text.trim().is_empty(),
            ResponseValue::Number(_) => true,
            ResponseValue::List(items) => items.iter().any(|item| !item.trim().is_empty()),
        },
    }
}

/// Titles of visible required questions whose constraint is unmet, in order.
pub fn validate_all(survey: &Survey, responses: &ResponseStore) -> Vec<String> {
    unmet_required(survey, responses)
        .map(|question| question.title.clone())
        .collect()
}

fn unmet_required<'a>(
    survey: &'a Survey,
    responses: &'a ResponseStore,
) -> impl Iterator<Item = &'a Question> + 'a {
    survey
        .questions
        .iter()
        .enumerate()
        .filter(move |(index, _)| is_visible(survey, *index, responses))
        .map(|(_, question)| question)
        .filter(move |question| !is_satisfied(question, responses.get(&question.id)))
}

/// Required-ness, answer shape and unknown-key checks in one report.
pub fn validate(survey: &Survey, responses: &ResponseStore) -> ValidationReport {
    let mut missing_required = Vec::new();
    let mut unmet_titles = Vec::new();
    for question in unmet_required(survey, responses) {
        missing_required.push(question.id.clone());
        unmet_titles.push(question.title.clone());
    }

    let errors: Vec<ValidationError> = survey
        .questions
        .iter()
        .enumerate()
        .filter(|(index, _)| is_visible(survey, *index, responses))
        .filter_map(|(_, question)| {
            responses
                .get(&question.id)
                .filter(|value| !value.is_empty())
                .and_then(|value| check_shape(question, value))
        })
        .collect();

    let unknown_fields: Vec<String> = responses
        .keys()
        .filter(|key| survey.index_of(key).is_none())
        .cloned()
        .collect();

    ValidationReport {
        valid: missing_required.is_empty() && errors.is_empty() && unknown_fields.is_empty(),
        missing_required,
        unmet_titles,
        errors,
        unknown_fields,
    }
}

fn check_shape(question: &Question, value: &ResponseValue) -> Option<ValidationError> {
    match question.kind {
        QuestionType::Number | QuestionType::RatingScale => {
            let Some(number) = value.as_number() else {
                return Some(error(question, "expected a number", "type_mismatch"));
            };
            if question.min.is_some_and(|min| number < min) {
                return Some(error(question, "value below minimum", "min"));
            }
            if question.max.is_some_and(|max| number > max) {
                return Some(error(question, "value above maximum", "max"));
            }
            None
        }
        QuestionType::MultiChoice => {
            let Some(items) = value.as_list() else {
                return Some(error(question, "expected a list of options", "type_mismatch"));
            };
            items
                .iter()
                .find(|item| !question.options.is_empty() && question.option(item).is_none())
                .map(|item| error(question, &format!("unknown option '{}'", item), "enum_mismatch"))
        }
        QuestionType::SingleChoice | QuestionType::Dropdown => {
            let Some(text) = value.as_scalar_string() else {
                return Some(error(question, "expected a single option", "type_mismatch"));
            };
            if !question.options.is_empty() && question.option(&text).is_none() {
                return Some(error(
                    question,
                    &format!("unknown option '{}'", text),
                    "enum_mismatch",
                ));
            }
            None
        }
        QuestionType::Email => {
            matches_pattern(&EMAIL, question, value, "invalid email address", "email_format")
        }
        QuestionType::Date => {
            matches_pattern(&DATE, question, value, "expected YYYY-MM-DD", "date_format")
        }
        QuestionType::ShortText | QuestionType::LongText => value
            .as_list()
            .map(|_| error(question, "expected text", "type_mismatch")),
    }
}

fn matches_pattern(
    pattern: &Regex,
    question: &Question,
    value: &ResponseValue,
    message: &str,
    code: &str,
) -> Option<ValidationError> {
    let Some(text) = value.as_scalar_string() else {
        return Some(error(question, "expected text", "type_mismatch"));
    };
    (!pattern.is_match(text.trim())).then(|| error(question, message, code))
}

fn error(question: &Question, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: question.id.clone(),
        message: message.into(),
        code: code.into(),
    }
}
