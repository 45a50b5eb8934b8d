//! Skip-logic predicate evaluation.
//!
//! Evaluation is total: every malformed or indeterminate input resolves to
//! `false` so the dependent question stays hidden.

use crate::responses::{ResponseStore, ResponseValue, parse_number};
use crate::spec::{Operator, SkipLogic};

/// Evaluates `predicate` against the stored answer of its antecedent question.
pub fn evaluate(predicate: &SkipLogic, responses: &ResponseStore) -> bool {
    let answer = responses.get(&predicate.field_id);

    match predicate.operator {
        Operator::IsEmpty => is_blank(answer),
        Operator::IsNotEmpty => !is_blank(answer),
        operator => {
            let Some(answer) = answer else {
                return false;
            };
            let Some(target) = predicate.value.as_deref() else {
                tracing::debug!(
                    field_id = %predicate.field_id,
                    operator = operator.as_str(),
                    "predicate has no value, failing closed"
                );
                return false;
            };
            compare(operator, answer, target)
        }
    }
}

fn is_blank(answer: Option<&ResponseValue>) -> bool {
    answer.is_none_or(ResponseValue::is_empty)
}

fn compare(operator: Operator, answer: &ResponseValue, target: &str) -> bool {
    match operator {
        Operator::Equals => answer.as_scalar_string().is_some_and(|text| text == target),
        Operator::NotEquals => answer.as_scalar_string().is_none_or(|text| text != target),
        Operator::Contains => match answer {
            ResponseValue::List(items) => items.iter().any(|item| item == target),
            scalar => scalar
                .as_scalar_string()
                .is_some_and(|text| text.contains(target)),
        },
        Operator::GreaterThan | Operator::LessThan => {
            match (answer.as_number(), parse_number(target)) {
                (Some(left), Some(right)) if operator == Operator::GreaterThan => left > right,
                (Some(left), Some(right)) => left < right,
                _ => false,
            }
        }
        Operator::IsEmpty => answer.is_empty(),
        Operator::IsNotEmpty => !answer.is_empty(),
    }
}
