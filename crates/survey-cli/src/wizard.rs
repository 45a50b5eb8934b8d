use survey_spec::{
    Question, QuestionType, RenderPayload, ResponseValue, Session, is_visible, render_text,
};

/// Controls which bits of state the runner prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: status, visible questions and progress details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and outcomes for the interactive runner.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, session: &Session) {
        if self.header_printed {
            return;
        }
        let survey = session.survey();
        println!("Survey: {}", survey.title);
        if let Some(description) = &survey.description {
            println!("{}", description);
        }
        println!("Type an answer and press enter. ':back' goes back, ':quit' saves and exits.");
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if self.verbosity.is_verbose() {
            println!("{}", render_text(payload));
        }
    }

    pub fn show_prompt(&self, session: &Session, question: &Question) {
        let (position, total) = session.position();
        let mut line = format!("{}/{} {}", position, total, question.title);
        if question.required {
            line.push_str(" *");
        }
        if let Some(hint) = hint(question) {
            line.push(' ');
            line.push_str(&hint);
        }
        println!("{}", line);
        if let Some(description) = &question.description {
            println!("{}", description);
        }
        if !question.options.is_empty() {
            for (number, option) in question.options.iter().enumerate() {
                println!("  {}) {}", number + 1, option.label);
            }
        }
        if let Some(value) = session.responses().get(&question.id) {
            println!("Current answer: {} (press enter to keep)", value.to_display());
        }
    }

    pub fn show_parse_error(&self, message: &str) {
        eprintln!("Invalid answer: {}", message);
    }

    pub fn show_blocked(&self, title: &str) {
        eprintln!("An answer is required: {}", title);
    }

    pub fn show_unmet(&self, titles: &[String]) {
        println!("Some required questions still need answers:");
        for title in titles {
            println!(" - {}", title);
        }
    }

    pub fn show_review(&self, session: &Session) {
        println!("Review your answers:");
        let survey = session.survey();
        for (index, question) in survey.questions.iter().enumerate() {
            if let Some(value) = session.responses().get(&question.id)
                && is_visible(survey, index, session.responses())
            {
                println!(" - {}: {}", question.title, display(value));
            }
        }
    }

    pub fn show_completion(&self, answers_json: &str) {
        println!("Submitted ✅");
        println!("{}", answers_json);
    }
}

fn display(value: &ResponseValue) -> String {
    match value.to_display() {
        text if text.is_empty() => "(blank)".to_string(),
        text => text,
    }
}

fn hint(question: &Question) -> Option<String> {
    match question.kind {
        QuestionType::Number => Some("(number)".to_string()),
        QuestionType::Email => Some("(email)".to_string()),
        QuestionType::Date => Some("(YYYY-MM-DD)".to_string()),
        QuestionType::MultiChoice => Some("(comma-separated choices)".to_string()),
        QuestionType::RatingScale => match (question.min, question.max) {
            (Some(min), Some(max)) => Some(format!("({}-{})", min, max)),
            _ => Some("(rating)".to_string()),
        },
        _ => None,
    }
}
