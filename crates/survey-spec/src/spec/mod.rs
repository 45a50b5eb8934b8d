pub mod lint;
pub mod question;
pub mod skip_logic;
pub mod survey;

pub use lint::AuthoringIssue;
pub use question::{ChoiceOption, Question, QuestionType};
pub use skip_logic::{Operator, SkipLogic};
pub use survey::{Survey, SurveyError};
