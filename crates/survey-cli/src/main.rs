mod logging;
mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use survey_component::{
    advance as component_advance, can_submit as component_can_submit,
    render_json_ui as component_render_json_ui, render_text as component_render_text,
    retreat as component_retreat, status as component_status,
};
use survey_spec::{
    AdvanceOutcome, NavigationState, Question, QuestionType, RecoverySnapshot, ResponseStore,
    ResponseValue, Session, Survey, ValidationReport, build_render_payload, render_json_ui,
    validate,
};
use wizard::{Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Conditional survey runner",
    long_about = "Runs surveys with skip logic in a text shell and exposes the navigation engine to scripts"
)]
struct Cli {
    /// Show debug diagnostics on stderr (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StepAction {
    Status,
    Advance,
    Retreat,
    CanSubmit,
    Render,
    Text,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a survey interactively, one visible question at a time.
    Run {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Recovery snapshot to continue from, ignored when older than the retention window.
        #[arg(long, value_name = "SNAPSHOT")]
        resume: Option<PathBuf>,
        /// Where to save a recovery snapshot after every answer.
        #[arg(long, value_name = "SNAPSHOT")]
        snapshot: Option<PathBuf>,
        /// Snapshots older than this many hours are discarded.
        #[arg(long, env = "SURVEY_RETENTION_HOURS", default_value_t = 24)]
        retention_hours: u64,
        /// Status output before each prompt.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Apply one navigation action to a stored state and print the JSON result.
    Step {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// JSON file with the answers collected so far.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Navigation state JSON, e.g. '{"state":"active","index":2}'.
        #[arg(long, value_name = "STATE")]
        state: Option<String>,
        #[arg(long, value_enum, default_value_t = StepAction::Status)]
        action: StepAction,
    },
    /// Validate answers against a survey.
    Validate {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Report authoring problems such as skip logic pointing forwards.
    Check {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
    /// Print the JSON schema for survey documents.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Run {
            spec,
            answers,
            resume,
            snapshot,
            retention_hours,
            format,
        } => run_survey(RunOptions {
            spec,
            answers,
            resume,
            snapshot,
            retention: Duration::from_secs(retention_hours.saturating_mul(3_600)),
            format,
            verbosity: Verbosity::from_verbose(cli.verbose),
        }),
        Command::Step {
            spec,
            answers,
            state,
            action,
        } => run_step(spec, answers, state, action),
        Command::Validate { spec, answers } => run_validate(spec, answers),
        Command::Check { spec } => run_check(spec),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&Survey::json_schema())?);
            Ok(())
        }
    }
}

struct RunOptions {
    spec: PathBuf,
    answers: Option<PathBuf>,
    resume: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    retention: Duration,
    format: RenderMode,
    verbosity: Verbosity,
}

fn load_survey(path: &Path) -> CliResult<Survey> {
    let contents = fs::read_to_string(path)?;
    Ok(Survey::from_json(&contents)?)
}

fn load_answers(path: Option<&Path>) -> CliResult<ResponseStore> {
    match path {
        Some(path) => {
            let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            Ok(ResponseStore::from_json(&value))
        }
        None => Ok(ResponseStore::new()),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Loads a snapshot if it exists and is inside the retention window.
fn load_fresh_snapshot(path: &Path, retention: Duration) -> CliResult<Option<RecoverySnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let snapshot = RecoverySnapshot::from_json(&fs::read_to_string(path)?)?;
    if snapshot.is_fresh(now_secs(), retention) {
        Ok(Some(snapshot))
    } else {
        tracing::warn!(path = %path.display(), "discarding expired snapshot");
        println!("Saved progress is too old and was discarded.");
        Ok(None)
    }
}

fn save_snapshot(path: Option<&Path>, session: &Session) -> CliResult<()> {
    if let Some(path) = path {
        fs::write(path, session.snapshot(now_secs()).to_json_pretty()?)?;
        tracing::debug!(path = %path.display(), "snapshot saved");
    }
    Ok(())
}

fn open_session(options: &RunOptions) -> CliResult<Session> {
    let survey = load_survey(&options.spec)?;
    let mut responses = load_answers(options.answers.as_deref())?;
    let snapshot = match &options.resume {
        Some(path) => load_fresh_snapshot(path, options.retention)?,
        None => None,
    };
    match snapshot {
        Some(snapshot) => {
            let survey_id = snapshot.survey_id.clone();
            responses.merge(snapshot.responses);
            let merged = RecoverySnapshot::new(survey_id, responses, snapshot.timestamp);
            Ok(Session::restore(survey, merged)?)
        }
        None => Ok(Session::with_responses(survey, responses)),
    }
}

enum Input {
    Back,
    Quit,
    Keep,
    Answer(String),
}

fn read_input(lines: &mut impl Iterator<Item = io::Result<String>>) -> CliResult<Input> {
    print!("> ");
    io::stdout().flush()?;
    let line = match lines.next() {
        Some(line) => line?,
        None => return Err("input closed before the survey was submitted".into()),
    };
    let trimmed = line.trim();
    Ok(match trimmed {
        ":back" | ":b" => Input::Back,
        ":quit" | ":q" => Input::Quit,
        "" => Input::Keep,
        _ => Input::Answer(trimmed.to_string()),
    })
}

fn run_survey(options: RunOptions) -> CliResult<()> {
    let mut session = open_session(&options)?;
    let mut presenter = WizardPresenter::new(options.verbosity);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    presenter.show_header(&session);

    loop {
        print_render_output(&presenter, &session, options.format)?;
        let Some(question) = session.current_question().cloned() else {
            if !session.can_submit() {
                presenter.show_unmet(&session.validate_all());
                session = jump_to_first_unmet(session);
                continue;
            }
            presenter.show_review(&session);
            println!("Submit? (yes to submit, ':back' to review)");
            match read_input(&mut lines)? {
                Input::Answer(answer) if is_yes(&answer) => {
                    let answers = serde_json::to_string_pretty(&session.responses().to_json())?;
                    presenter.show_completion(&answers);
                    if let Some(path) = &options.snapshot
                        && path.exists()
                    {
                        fs::remove_file(path)?;
                    }
                    return Ok(());
                }
                Input::Quit => {
                    save_snapshot(options.snapshot.as_deref(), &session)?;
                    println!("Progress saved.");
                    return Ok(());
                }
                Input::Back => {
                    session.retreat();
                }
                Input::Keep | Input::Answer(_) => {
                    println!("Type 'yes' to submit or ':back' to review.");
                }
            }
            continue;
        };

        presenter.show_prompt(&session, &question);
        match read_input(&mut lines)? {
            Input::Back => {
                session.retreat();
                continue;
            }
            Input::Quit => {
                save_snapshot(options.snapshot.as_deref(), &session)?;
                println!("Progress saved.");
                return Ok(());
            }
            Input::Keep => {}
            Input::Answer(raw) => match parse_answer(&question, &raw) {
                Ok(value) => {
                    session.submit_answer(&question.id, value)?;
                    save_snapshot(options.snapshot.as_deref(), &session)?;
                }
                Err(message) => {
                    presenter.show_parse_error(&message);
                    continue;
                }
            },
        }

        if let AdvanceOutcome::Blocked { unmet_title, .. } = session.advance() {
            presenter.show_blocked(&unmet_title);
        }
    }
}

/// Re-enters the survey at the first visible question that still needs an
/// answer, or at its last visible question.
fn jump_to_first_unmet(mut session: Session) -> Session {
    let target = session
        .validate()
        .missing_required
        .first()
        .and_then(|id| session.survey().index_of(id));
    match target {
        Some(index) => Session::resume(
            session.survey().clone(),
            session.responses().clone(),
            NavigationState::Active { index },
        ),
        None => {
            session.retreat();
            session
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_render_output(
    presenter: &WizardPresenter,
    session: &Session,
    format: RenderMode,
) -> CliResult<()> {
    let payload = build_render_payload(session);
    match format {
        RenderMode::Text => presenter.show_status(&payload),
        RenderMode::Json => println!("{}", serde_json::to_string_pretty(&render_json_ui(&payload))?),
    }
    Ok(())
}

fn parse_answer(question: &Question, raw: &str) -> Result<ResponseValue, String> {
    match question.kind {
        QuestionType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(ResponseValue::Number)
            .ok_or_else(|| format!("'{}' is not a number", raw)),
        QuestionType::RatingScale => {
            let number = raw
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| format!("'{}' is not a rating", raw))?;
            let below = question.min.is_some_and(|min| number < min);
            let above = question.max.is_some_and(|max| number > max);
            if below || above {
                return Err(format!(
                    "rating must be between {} and {}",
                    question.min.unwrap_or(number),
                    question.max.unwrap_or(number)
                ));
            }
            Ok(ResponseValue::Number(number))
        }
        QuestionType::SingleChoice | QuestionType::Dropdown => {
            resolve_option(question, raw).map(ResponseValue::Text)
        }
        QuestionType::MultiChoice => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| resolve_option(question, part))
            .collect::<Result<Vec<_>, _>>()
            .map(ResponseValue::List),
        QuestionType::ShortText
        | QuestionType::LongText
        | QuestionType::Email
        | QuestionType::Date => Ok(ResponseValue::Text(raw.to_string())),
    }
}

/// Accepts an option's value, its label (case-insensitive) or its 1-based number.
fn resolve_option(question: &Question, raw: &str) -> Result<String, String> {
    if question.options.is_empty() {
        return Ok(raw.to_string());
    }
    if let Ok(number) = raw.parse::<usize>()
        && let Some(option) = number.checked_sub(1).and_then(|i| question.options.get(i))
    {
        return Ok(option.value.clone());
    }
    question
        .options
        .iter()
        .find(|option| option.value == raw || option.label.eq_ignore_ascii_case(raw))
        .map(|option| option.value.clone())
        .ok_or_else(|| {
            let labels: Vec<_> = question
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect();
            format!("'{}' is not one of: {}", raw, labels.join(", "))
        })
}

fn run_step(
    spec: PathBuf,
    answers: Option<PathBuf>,
    state: Option<String>,
    action: StepAction,
) -> CliResult<()> {
    let survey_json = fs::read_to_string(&spec)?;
    let survey_id = Survey::from_json(&survey_json)?.id;
    let config = json!({ "survey_json": survey_json }).to_string();
    let answers_json = match answers {
        Some(path) => fs::read_to_string(path)?,
        None => "{}".to_string(),
    };
    let state_json = state.unwrap_or_default();

    let call = match action {
        StepAction::Status => component_status,
        StepAction::Advance => component_advance,
        StepAction::Retreat => component_retreat,
        StepAction::CanSubmit => component_can_submit,
        StepAction::Render => component_render_json_ui,
        StepAction::Text => component_render_text,
    };
    let response = call(&survey_id, &config, &state_json, &answers_json);
    if matches!(action, StepAction::Text) {
        println!("{}", response);
        return Ok(());
    }
    let parsed = parse_component_result(&response)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    Ok(value)
}

fn run_validate(spec_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let survey = load_survey(&spec_path)?;
    let answers = load_answers(Some(&answers_path))?;
    let report = validate(&survey, &answers);
    describe_validation(&report);
    if report.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(report: &ValidationReport) {
    if report.valid {
        println!("All answers are valid.");
        return;
    }
    if !report.missing_required.is_empty() {
        println!("Missing required answers:");
        for (id, title) in report.missing_required.iter().zip(&report.unmet_titles) {
            println!(" - {} ({})", id, title);
        }
    }
    if !report.errors.is_empty() {
        println!("Invalid answers:");
        for error in &report.errors {
            println!(" - {}: {} [{}]", error.question_id, error.message, error.code);
        }
    }
    if !report.unknown_fields.is_empty() {
        println!("Unknown fields: {}", report.unknown_fields.join(", "));
    }
}

fn run_check(spec_path: PathBuf) -> CliResult<()> {
    let survey = load_survey(&spec_path)?;
    let issues = survey.lint();
    if issues.is_empty() {
        println!("Survey '{}' looks good ({} questions).", survey.id, survey.len());
        return Ok(());
    }
    for issue in &issues {
        println!(" - {}: {} [{}]", issue.question_id, issue.message, issue.code);
    }
    Err(format!("{} authoring issue(s) found", issues.len()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice() -> Question {
        Question {
            options: vec![
                survey_spec::ChoiceOption::new("Sky blue", "blue"),
                survey_spec::ChoiceOption::new("Red", "red"),
            ],
            ..Question::new("color", QuestionType::MultiChoice, "Colors")
        }
    }

    #[test]
    fn options_resolve_by_number_label_or_value() {
        let question = choice();
        assert_eq!(resolve_option(&question, "1"), Ok("blue".to_string()));
        assert_eq!(resolve_option(&question, "sky BLUE"), Ok("blue".to_string()));
        assert_eq!(resolve_option(&question, "red"), Ok("red".to_string()));
        assert!(resolve_option(&question, "3").is_err());
    }

    #[test]
    fn multi_choice_answers_split_on_commas() {
        let question = choice();
        assert_eq!(
            parse_answer(&question, "2, 1"),
            Ok(ResponseValue::List(vec!["red".into(), "blue".into()]))
        );
        assert!(parse_answer(&question, "green").is_err());
    }

    #[test]
    fn rating_respects_range() {
        let question =
            Question::new("score", QuestionType::RatingScale, "Score").with_range(1.0, 5.0);
        assert_eq!(parse_answer(&question, "4"), Ok(ResponseValue::Number(4.0)));
        assert!(parse_answer(&question, "6").is_err());
        assert!(parse_answer(&question, "great").is_err());
    }

    #[test]
    fn component_errors_surface() {
        assert!(parse_component_result(r#"{"error":"boom"}"#).is_err());
        assert!(parse_component_result(r#"{"ok":true}"#).is_ok());
    }
}
