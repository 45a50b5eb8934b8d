use thiserror::Error;

use crate::navigation::{AdvanceOutcome, NavigationController, NavigationState};
use crate::responses::{ResponseStore, ResponseValue};
use crate::snapshot::RecoverySnapshot;
use crate::spec::{Question, Survey};
use crate::validate::{ValidationReport, validate, validate_all};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question '{0}' is not part of survey '{1}'")]
    UnknownQuestion(String, String),
    #[error("snapshot belongs to survey '{found}', expected '{expected}'")]
    SurveyMismatch { expected: String, found: String },
}

/// One user's pass through one survey: the survey, the answers collected so
/// far and the navigation position, passed around explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    controller: NavigationController,
    responses: ResponseStore,
}

impl Session {
    pub fn new(survey: Survey) -> Self {
        Self::with_responses(survey, ResponseStore::new())
    }

    pub fn with_responses(survey: Survey, responses: ResponseStore) -> Self {
        let controller = NavigationController::new(survey, &responses);
        Self {
            controller,
            responses,
        }
    }

    /// Continues a session at a stored navigation state.
    pub fn resume(survey: Survey, responses: ResponseStore, state: NavigationState) -> Self {
        let controller = NavigationController::resume(survey, state, &responses);
        Self {
            controller,
            responses,
        }
    }

    /// Starts over from a recovery snapshot. Answers to questions that are
    /// currently hidden are kept.
    pub fn restore(survey: Survey, snapshot: RecoverySnapshot) -> Result<Self, SessionError> {
        if snapshot.survey_id != survey.id {
            tracing::warn!(
                expected = %survey.id,
                found = %snapshot.survey_id,
                "rejecting snapshot for another survey"
            );
            return Err(SessionError::SurveyMismatch {
                expected: survey.id,
                found: snapshot.survey_id,
            });
        }
        Ok(Self::with_responses(survey, snapshot.responses))
    }

    pub fn snapshot(&self, timestamp: u64) -> RecoverySnapshot {
        RecoverySnapshot::new(
            self.survey().id.clone(),
            self.responses.clone(),
            timestamp,
        )
    }

    pub fn survey(&self) -> &Survey {
        self.controller.survey()
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn state(&self) -> NavigationState {
        self.controller.state()
    }

    /// Records the answer for `question_id`, replacing any earlier one.
    pub fn submit_answer(
        &mut self,
        question_id: &str,
        value: impl Into<ResponseValue>,
    ) -> Result<(), SessionError> {
        self.ensure_known(question_id)?;
        self.responses.set(question_id, value);
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: &str) -> Result<Option<ResponseValue>, SessionError> {
        self.ensure_known(question_id)?;
        Ok(self.responses.remove(question_id))
    }

    fn ensure_known(&self, question_id: &str) -> Result<(), SessionError> {
        if self.survey().index_of(question_id).is_some() {
            return Ok(());
        }
        tracing::warn!(question_id, "answer for unknown question rejected");
        Err(SessionError::UnknownQuestion(
            question_id.to_string(),
            self.survey().id.clone(),
        ))
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.controller.current_question()
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        self.controller.advance(&self.responses)
    }

    pub fn retreat(&mut self) -> NavigationState {
        self.controller.retreat(&self.responses)
    }

    pub fn can_submit(&self) -> bool {
        self.controller.can_submit(&self.responses)
    }

    pub fn position(&self) -> (usize, usize) {
        self.controller.position(&self.responses)
    }

    pub fn progress_fraction(&self) -> f64 {
        self.controller.progress_fraction(&self.responses)
    }

    pub fn validate_all(&self) -> Vec<String> {
        validate_all(self.survey(), &self.responses)
    }

    pub fn validate(&self) -> ValidationReport {
        validate(self.survey(), &self.responses)
    }
}
