use serde_json::{Map, Value, json};

use crate::{
    responses::ResponseValue,
    session::Session,
    spec::{ChoiceOption, QuestionType},
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A question is active and waiting for input.
    NeedInput,
    /// Past the last visible question and every requirement is met.
    ReadyToSubmit,
    /// Past the last visible question but an earlier requirement is unmet.
    Blocked,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::ReadyToSubmit => "ready_to_submit",
            RenderStatus::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub position: usize,
    pub total: usize,
    pub fraction: f64,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuestionType,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<ResponseValue>,
    pub options: Vec<ChoiceOption>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Everything a host needs to draw the current step.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub survey_id: String,
    pub survey_title: String,
    pub status: RenderStatus,
    pub current_question_id: Option<String>,
    pub progress: RenderProgress,
    pub help: Option<String>,
    pub questions: Vec<RenderQuestion>,
    pub unmet: Vec<String>,
}

pub fn build_render_payload(session: &Session) -> RenderPayload {
    let survey = session.survey();
    let responses = session.responses();
    let visibility = resolve_visibility(survey, responses);
    let (position, total) = session.position();
    let unmet = session.validate_all();

    let current_question_id = session.current_question().map(|question| question.id.clone());
    let status = match (&current_question_id, unmet.is_empty()) {
        (Some(_), _) => RenderStatus::NeedInput,
        (None, true) => RenderStatus::ReadyToSubmit,
        (None, false) => RenderStatus::Blocked,
    };

    let questions = survey
        .questions
        .iter()
        .map(|question| RenderQuestion {
            id: question.id.clone(),
            title: question.title.clone(),
            description: question.description.clone(),
            kind: question.kind,
            required: question.required,
            visible: visibility.get(&question.id).copied().unwrap_or(false),
            current_value: responses.get(&question.id).cloned(),
            options: question.options.clone(),
            min: question.min,
            max: question.max,
        })
        .collect();

    RenderPayload {
        survey_id: survey.id.clone(),
        survey_title: survey.title.clone(),
        status,
        current_question_id,
        progress: RenderProgress {
            position,
            total,
            fraction: session.progress_fraction(),
        },
        help: survey.description.clone(),
        questions,
        unmet,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(question.id.clone()));
            map.insert("title".into(), Value::String(question.title.clone()));
            map.insert(
                "description".into(),
                question
                    .description
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
            map.insert("type".into(), Value::String(question.kind.as_str().into()));
            map.insert("required".into(), Value::Bool(question.required));
            map.insert("visible".into(), Value::Bool(question.visible));
            if let Some(current_value) = &question.current_value {
                map.insert(
                    "currentValue".into(),
                    serde_json::to_value(current_value).unwrap_or(Value::Null),
                );
            }
            if !question.options.is_empty() {
                map.insert(
                    "options".into(),
                    serde_json::to_value(&question.options).unwrap_or(Value::Null),
                );
            }
            if let Some(min) = question.min {
                map.insert("min".into(), json!(min));
            }
            if let Some(max) = question.max {
                map.insert("max".into(), json!(max));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "surveyId": payload.survey_id,
        "surveyTitle": payload.survey_title,
        "status": payload.status.as_str(),
        "currentQuestionId": payload.current_question_id,
        "progress": {
            "position": payload.progress.position,
            "total": payload.progress.total,
            "fraction": payload.progress.fraction,
        },
        "help": payload.help,
        "unmet": payload.unmet,
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Survey: {} ({})",
        payload.survey_title, payload.survey_id
    ));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.position,
        payload.progress.total
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    match payload
        .current_question_id
        .as_ref()
        .and_then(|id| payload.questions.iter().find(|question| &question.id == id))
    {
        Some(question) => {
            lines.push(format!("Current question: {}", question.id));
            lines.push(format!("  Title: {}", question.title));
            if let Some(description) = &question.description {
                lines.push(format!("  Description: {}", description));
            }
            if question.required {
                lines.push("  Required: yes".to_string());
            }
            if !question.options.is_empty() {
                let labels: Vec<_> = question
                    .options
                    .iter()
                    .map(|option| option.label.as_str())
                    .collect();
                lines.push(format!("  Options: {}", labels.join(", ")));
            }
            if let Some(value) = &question.current_value {
                lines.push(format!("  Current value: {}", value.to_display()));
            }
        }
        None if payload.unmet.is_empty() => {
            lines.push("All visible questions are answered.".to_string());
        }
        None => {
            lines.push(format!("Unanswered required: {}", payload.unmet.join(", ")));
        }
    }

    lines.push("Visible questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(" - {} ({})", question.id, question.title);
        if question.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", current_value.to_display()));
        }
        lines.push(entry);
    }

    lines.join("\n")
}
