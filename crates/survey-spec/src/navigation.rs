//! Forward/backward paging over the visible question sequence.

use serde::{Deserialize, Serialize};

use crate::responses::ResponseStore;
use crate::spec::{Question, Survey};
use crate::validate::{is_satisfied, validate_all};
use crate::visibility::{first_visible_from, is_visible, last_visible_before, visible_indices};

/// Where a navigation session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavigationState {
    /// Showing the question at `index`.
    Active { index: usize },
    /// Past the last visible question.
    ReadyToSubmit,
}

impl NavigationState {
    pub fn index(&self) -> Option<usize> {
        match self {
            NavigationState::Active { index } => Some(*index),
            NavigationState::ReadyToSubmit => None,
        }
    }

    fn entering(index: Option<usize>) -> Self {
        match index {
            Some(index) => NavigationState::Active { index },
            None => NavigationState::ReadyToSubmit,
        }
    }
}

/// Result of trying to leave the current question forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved(NavigationState),
    Blocked {
        question_id: String,
        unmet_title: String,
    },
}

impl AdvanceOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, AdvanceOutcome::Moved(_))
    }

    pub fn unmet_title(&self) -> Option<&str> {
        match self {
            AdvanceOutcome::Moved(_) => None,
            AdvanceOutcome::Blocked { unmet_title, .. } => Some(unmet_title),
        }
    }
}

/// State machine over one survey's questions.
///
/// The controller owns the survey for the whole session; answers are passed
/// in on every call so the caller stays the single writer.
#[derive(Debug, Clone)]
pub struct NavigationController {
    survey: Survey,
    state: NavigationState,
}

impl NavigationController {
    /// Positions at the first visible question, or `ReadyToSubmit` when
    /// nothing is visible.
    pub fn new(survey: Survey, responses: &ResponseStore) -> Self {
        let state = NavigationState::entering(first_visible_from(&survey, 0, responses));
        tracing::debug!(survey_id = %survey.id, ?state, "navigation started");
        Self { survey, state }
    }

    /// Re-enters at a previously stored state. An index that is out of range
    /// or no longer visible moves forward to the next visible question.
    pub fn resume(survey: Survey, state: NavigationState, responses: &ResponseStore) -> Self {
        let state = match state {
            NavigationState::Active { index } if is_visible(&survey, index, responses) => state,
            NavigationState::Active { index } => {
                NavigationState::entering(first_visible_from(&survey, index, responses))
            }
            NavigationState::ReadyToSubmit => NavigationState::ReadyToSubmit,
        };
        tracing::debug!(survey_id = %survey.id, ?state, "navigation resumed");
        Self { survey, state }
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn is_ready_to_submit(&self) -> bool {
        self.state == NavigationState::ReadyToSubmit
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state
            .index()
            .and_then(|index| self.survey.question(index))
    }

    /// Leaves the current question forwards unless its requirement is unmet.
    pub fn advance(&mut self, responses: &ResponseStore) -> AdvanceOutcome {
        let NavigationState::Active { index } = self.state else {
            return AdvanceOutcome::Moved(self.state);
        };

        if let Some(question) = self.survey.question(index)
            && is_visible(&self.survey, index, responses)
            && !is_satisfied(question, responses.get(&question.id))
        {
            tracing::debug!(question_id = %question.id, "advance blocked by unmet requirement");
            return AdvanceOutcome::Blocked {
                question_id: question.id.clone(),
                unmet_title: question.title.clone(),
            };
        }

        self.state = NavigationState::entering(first_visible_from(&self.survey, index + 1, responses));
        tracing::debug!(from = index, to = ?self.state, "advanced");
        AdvanceOutcome::Moved(self.state)
    }

    /// Steps back to the previous visible question. A no-op on the first one.
    pub fn retreat(&mut self, responses: &ResponseStore) -> NavigationState {
        let before = match self.state {
            NavigationState::Active { index } => index,
            NavigationState::ReadyToSubmit => self.survey.len(),
        };
        if let Some(index) = last_visible_before(&self.survey, before, responses) {
            self.state = NavigationState::Active { index };
            tracing::debug!(from = before, to = index, "retreated");
        }
        self.state
    }

    /// `ReadyToSubmit` and every visible required question satisfied,
    /// rechecked over the whole survey.
    pub fn can_submit(&self, responses: &ResponseStore) -> bool {
        self.is_ready_to_submit() && validate_all(&self.survey, responses).is_empty()
    }

    /// `(ordinal, visible_total)`: the 1-based rank of the current question
    /// among visible ones, or the total once ready to submit.
    pub fn position(&self, responses: &ResponseStore) -> (usize, usize) {
        let visible = visible_indices(&self.survey, responses);
        let ordinal = match self.state {
            NavigationState::Active { index } => visible.iter().filter(|&&v| v <= index).count(),
            NavigationState::ReadyToSubmit => visible.len(),
        };
        (ordinal, visible.len())
    }

    /// Share of visible questions reached so far, in `[0, 1]`.
    pub fn progress_fraction(&self, responses: &ResponseStore) -> f64 {
        match self.position(responses) {
            (_, 0) => 0.0,
            (ordinal, total) => ordinal as f64 / total as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Operator, QuestionType, SkipLogic};

    fn survey() -> Survey {
        Survey::new(
            "nav",
            "Nav",
            vec![
                Question::new("q1", QuestionType::SingleChoice, "First")
                    .with_options(["A", "B"])
                    .required(),
                Question::new("q2", QuestionType::ShortText, "Second")
                    .required()
                    .with_skip_logic(SkipLogic::new("q1", Operator::Equals, Some("A"))),
                Question::new("q3", QuestionType::ShortText, "Third"),
            ],
        )
    }

    #[test]
    fn starts_on_first_visible_question() {
        let controller = NavigationController::new(survey(), &ResponseStore::new());
        assert_eq!(controller.state(), NavigationState::Active { index: 0 });
        assert_eq!(controller.current_question().map(|q| q.id.as_str()), Some("q1"));
    }

    #[test]
    fn advance_on_ready_to_submit_stays_put() {
        let mut responses = ResponseStore::new();
        responses.set("q1", "B");
        let mut controller = NavigationController::new(survey(), &responses);
        assert!(controller.advance(&responses).is_ok());
        assert!(controller.advance(&responses).is_ok());
        assert!(controller.is_ready_to_submit());
        assert_eq!(
            controller.advance(&responses),
            AdvanceOutcome::Moved(NavigationState::ReadyToSubmit)
        );
    }

    #[test]
    fn retreat_from_first_question_is_a_no_op() {
        let responses = ResponseStore::new();
        let mut controller = NavigationController::new(survey(), &responses);
        assert_eq!(
            controller.retreat(&responses),
            NavigationState::Active { index: 0 }
        );
    }

    #[test]
    fn resume_moves_off_hidden_positions() {
        let mut responses = ResponseStore::new();
        responses.set("q1", "B");
        let controller =
            NavigationController::resume(survey(), NavigationState::Active { index: 1 }, &responses);
        assert_eq!(controller.state(), NavigationState::Active { index: 2 });

        let controller =
            NavigationController::resume(survey(), NavigationState::Active { index: 7 }, &responses);
        assert!(controller.is_ready_to_submit());
    }

    #[test]
    fn hidden_current_question_does_not_gate() {
        let mut responses = ResponseStore::new();
        responses.set("q1", "A");
        let mut controller = NavigationController::new(survey(), &responses);
        controller.advance(&responses);
        assert_eq!(controller.state(), NavigationState::Active { index: 1 });

        responses.set("q1", "B");
        assert_eq!(
            controller.advance(&responses),
            AdvanceOutcome::Moved(NavigationState::Active { index: 2 })
        );
    }

    #[test]
    fn state_serializes_with_tag() {
        let value = serde_json::to_value(NavigationState::Active { index: 3 }).expect("encode");
        assert_eq!(value, serde_json::json!({ "state": "active", "index": 3 }));
        let ready: NavigationState =
            serde_json::from_value(serde_json::json!({ "state": "ready_to_submit" }))
                .expect("decode");
        assert_eq!(ready, NavigationState::ReadyToSubmit);
    }
}
