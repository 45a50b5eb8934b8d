#![allow(missing_docs)]

pub mod navigation;
pub mod predicate;
pub mod render;
pub mod responses;
pub mod session;
pub mod snapshot;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use navigation::{AdvanceOutcome, NavigationController, NavigationState};
pub use predicate::evaluate;
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use responses::{ResponseStore, ResponseValue};
pub use session::{Session, SessionError};
pub use snapshot::{DEFAULT_RETENTION, RecoverySnapshot, SnapshotError};
pub use spec::{
    AuthoringIssue, ChoiceOption, Operator, Question, QuestionType, SkipLogic, Survey, SurveyError,
};
pub use validate::{ValidationError, ValidationReport, is_satisfied, validate, validate_all};
pub use visibility::{
    VisibilityMap, first_visible_from, is_visible, last_visible_before, resolve_visibility,
    visible_indices,
};
