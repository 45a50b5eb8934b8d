use std::collections::BTreeSet;

use serde::Serialize;

use crate::spec::question::Question;
use crate::spec::survey::Survey;

/// Authoring-time problem found in a survey document.
///
/// The navigation engine never consults these; it fails closed on the same
/// inputs. They exist so editors can reject a survey before it ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoringIssue {
    pub question_id: String,
    pub code: &'static str,
    pub message: String,
}

impl AuthoringIssue {
    fn new(question: &Question, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            question_id: question.id.clone(),
            code,
            message: message.into(),
        }
    }
}

impl Survey {
    /// Checks identity, skip-logic ordering and parameter sanity.
    pub fn lint(&self) -> Vec<AuthoringIssue> {
        let mut issues = Vec::new();
        let mut seen = BTreeSet::new();

        for (index, question) in self.questions.iter().enumerate() {
            if !seen.insert(question.id.as_str()) {
                issues.push(AuthoringIssue::new(
                    question,
                    "duplicate_id",
                    format!("question id '{}' is used more than once", question.id),
                ));
            }

            if question.kind.has_options() && question.options.is_empty() {
                issues.push(AuthoringIssue::new(
                    question,
                    "missing_options",
                    "choice question has no options",
                ));
            }

            if let (Some(min), Some(max)) = (question.min, question.max)
                && min > max
            {
                issues.push(AuthoringIssue::new(
                    question,
                    "invalid_range",
                    format!("min {} is greater than max {}", min, max),
                ));
            }

            if let Some(logic) = &question.skip_logic {
                match self.index_of(&logic.field_id) {
                    None => issues.push(AuthoringIssue::new(
                        question,
                        "unknown_field",
                        format!("skip logic references unknown question '{}'", logic.field_id),
                    )),
                    Some(target) if target >= index => issues.push(AuthoringIssue::new(
                        question,
                        "forward_reference",
                        format!(
                            "skip logic must reference an earlier question, '{}' is not",
                            logic.field_id
                        ),
                    )),
                    Some(_) => {}
                }

                match (&logic.value, logic.operator.takes_value()) {
                    (None, true) => issues.push(AuthoringIssue::new(
                        question,
                        "missing_value",
                        format!("operator '{}' needs a value", logic.operator.as_str()),
                    )),
                    (Some(value), true)
                        if logic.operator.is_numeric()
                            && value.trim().parse::<f64>().is_err() =>
                    {
                        issues.push(AuthoringIssue::new(
                            question,
                            "non_numeric_value",
                            format!(
                                "operator '{}' needs a numeric value, got '{}'",
                                logic.operator.as_str(),
                                value
                            ),
                        ))
                    }
                    _ => {}
                }
            }
        }

        issues
    }
}
