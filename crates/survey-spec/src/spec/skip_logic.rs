use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Comparison applied between an earlier answer and the predicate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Equals,
    #[serde(alias = "not_equals")]
    NotEquals,
    Contains,
    #[serde(alias = "greater_than")]
    GreaterThan,
    #[serde(alias = "less_than")]
    LessThan,
    #[serde(alias = "is_empty")]
    IsEmpty,
    #[serde(alias = "is_not_empty")]
    IsNotEmpty,
}

impl Operator {
    /// Whether the operator reads `SkipLogic::value`.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    /// Whether the operator compares numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Operator::GreaterThan | Operator::LessThan)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not-equals",
            Operator::Contains => "contains",
            Operator::GreaterThan => "greater-than",
            Operator::LessThan => "less-than",
            Operator::IsEmpty => "is-empty",
            Operator::IsNotEmpty => "is-not-empty",
        }
    }
}

/// Single-antecedent visibility predicate: `(field_id, operator, value)`.
///
/// `field_id` must name a question strictly earlier in the survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkipLogic {
    #[serde(alias = "field_id")]
    pub field_id: String,
    pub operator: Operator,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_string"
    )]
    #[schemars(with = "Option<Literal>")]
    pub value: Option<String>,
}

impl SkipLogic {
    pub fn new(field_id: impl Into<String>, operator: Operator, value: Option<&str>) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: value.map(str::to_string),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum Literal {
    Text(String),
    Number(f64),
    Flag(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<Literal>::deserialize(deserializer)?.map(|literal| match literal {
            Literal::Text(text) => text,
            Literal::Number(number) => number.to_string(),
            Literal::Flag(flag) => flag.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_values_normalize_to_strings() {
        let logic: SkipLogic = serde_json::from_value(json!({
            "fieldId": "age",
            "operator": "greater-than",
            "value": 18
        }))
        .expect("deserialize");
        assert_eq!(logic.value.as_deref(), Some("18"));
        assert_eq!(logic.operator, Operator::GreaterThan);
    }

    #[test]
    fn value_is_optional_and_snake_case_is_accepted() {
        let logic: SkipLogic = serde_json::from_value(json!({
            "field_id": "notes",
            "operator": "is_not_empty"
        }))
        .expect("deserialize");
        assert_eq!(logic.value, None);
        assert!(!logic.operator.takes_value());
    }
}
