use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use survey_spec::{
    AdvanceOutcome, NavigationState, ResponseStore, ResponseValue, Session, SessionError, Survey,
    build_render_payload, render_json_ui as spec_render_json_ui,
    render_text as spec_render_text, validate,
};

const DEFAULT_SURVEY: &str = include_str!("../../survey-spec/tests/fixtures/customer_feedback.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse survey: {0}")]
    SurveyParse(#[source] serde_json::Error),
    #[error("failed to parse navigation state: {0}")]
    StateParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswersParse(#[source] serde_json::Error),
    #[error("failed to parse answer value: {0}")]
    ValueParse(#[source] serde_json::Error),
    #[error("survey '{0}' is not available")]
    SurveyUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    survey_json: Option<String>,
}

fn load_survey(config_json: &str) -> Result<Survey, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let survey_json = config.survey_json.as_deref().unwrap_or(DEFAULT_SURVEY);
    serde_json::from_str(survey_json).map_err(ComponentError::SurveyParse)
}

fn ensure_survey(survey_id: &str, config_json: &str) -> Result<Survey, ComponentError> {
    let survey = load_survey(config_json)?;
    if survey.id != survey_id {
        Err(ComponentError::SurveyUnavailable(survey_id.to_string()))
    } else {
        Ok(survey)
    }
}

fn parse_answers(answers_json: &str) -> Result<ResponseStore, ComponentError> {
    if answers_json.trim().is_empty() {
        return Ok(ResponseStore::new());
    }
    serde_json::from_str::<Value>(answers_json)
        .map(|value| ResponseStore::from_json(&value))
        .map_err(ComponentError::AnswersParse)
}

fn parse_state(state_json: &str) -> Result<Option<NavigationState>, ComponentError> {
    if state_json.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(state_json)
        .map(Some)
        .map_err(ComponentError::StateParse)
}

/// Rebuilds the session a stateless caller described; no state means a new
/// session positioned at the first visible question.
fn open_session(
    survey_id: &str,
    config_json: &str,
    state_json: &str,
    answers_json: &str,
) -> Result<Session, ComponentError> {
    let survey = ensure_survey(survey_id, config_json)?;
    let responses = parse_answers(answers_json)?;
    Ok(match parse_state(state_json)? {
        Some(state) => Session::resume(survey, responses, state),
        None => Session::with_responses(survey, responses),
    })
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ComponentError> {
    serde_json::to_value(value).map_err(ComponentError::JsonEncode)
}

fn session_view(session: &Session) -> Result<Value, ComponentError> {
    let (position, total) = session.position();
    Ok(json!({
        "state": encode(&session.state())?,
        "currentQuestionId": session.current_question().map(|question| question.id.clone()),
        "progress": {
            "position": position,
            "total": total,
            "fraction": session.progress_fraction(),
        },
        "canSubmit": session.can_submit(),
        "answers": session.responses().to_json(),
    }))
}

pub fn describe(survey_id: &str, config_json: &str) -> String {
    respond(ensure_survey(survey_id, config_json).and_then(|survey| encode(&survey)))
}

pub fn survey_schema() -> String {
    respond(Ok(Survey::json_schema()))
}

pub fn validate_answers(survey_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_survey(survey_id, config_json).and_then(|survey| {
        encode(&validate(&survey, &parse_answers(answers_json)?))
    }))
}

pub fn status(survey_id: &str, config_json: &str, state_json: &str, answers_json: &str) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json)
            .and_then(|session| session_view(&session)),
    )
}

pub fn advance(survey_id: &str, config_json: &str, state_json: &str, answers_json: &str) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json).and_then(|mut session| {
            let outcome = session.advance();
            let mut view = session_view(&session)?;
            view["ok"] = Value::Bool(outcome.is_ok());
            if let AdvanceOutcome::Blocked {
                question_id,
                unmet_title,
            } = outcome
            {
                view["unmetTitle"] = Value::String(unmet_title);
                view["unmetQuestionId"] = Value::String(question_id);
            }
            Ok(view)
        }),
    )
}

pub fn retreat(survey_id: &str, config_json: &str, state_json: &str, answers_json: &str) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json).and_then(|mut session| {
            session.retreat();
            session_view(&session)
        }),
    )
}

pub fn can_submit(
    survey_id: &str,
    config_json: &str,
    state_json: &str,
    answers_json: &str,
) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json).map(|session| {
            json!({
                "canSubmit": session.can_submit(),
                "unmet": session.validate_all(),
            })
        }),
    )
}

/// Records one answer and reports the resulting session view. The position
/// does not move; callers follow up with `advance`.
pub fn submit_patch(
    survey_id: &str,
    config_json: &str,
    state_json: &str,
    answers_json: &str,
    question_id: &str,
    value_json: &str,
) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json).and_then(|mut session| {
            let value: ResponseValue =
                serde_json::from_str(value_json).map_err(ComponentError::ValueParse)?;
            session.submit_answer(question_id, value)?;
            session_view(&session)
        }),
    )
}

pub fn render_text(survey_id: &str, config_json: &str, state_json: &str, answers_json: &str) -> String {
    respond_string(
        open_session(survey_id, config_json, state_json, answers_json)
            .map(|session| spec_render_text(&build_render_payload(&session))),
    )
}

pub fn render_json_ui(
    survey_id: &str,
    config_json: &str,
    state_json: &str,
    answers_json: &str,
) -> String {
    respond(
        open_session(survey_id, config_json, state_json, answers_json).and_then(|session| {
            let mut ui = spec_render_json_ui(&build_render_payload(&session));
            ui["state"] = encode(&session.state())?;
            Ok(ui)
        }),
    )
}
