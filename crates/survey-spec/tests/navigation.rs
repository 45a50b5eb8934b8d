use survey_spec::{
    AdvanceOutcome, NavigationController, NavigationState, Operator, Question, QuestionType,
    ResponseStore, Session, SkipLogic, Survey, evaluate, first_visible_from, is_visible,
    visible_indices,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "branching_survey" => include_str!("../tests/fixtures/branching_survey.json"),
        "customer_feedback" => include_str!("../tests/fixtures/customer_feedback.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn branching() -> Survey {
    Survey::from_json(fixture("branching_survey")).expect("deserialize")
}

#[test]
fn hidden_question_is_skipped_and_excluded_from_progress() {
    let mut session = Session::new(branching());
    session.submit_answer("q1", "B").expect("known question");

    assert_eq!(
        session.advance(),
        AdvanceOutcome::Moved(NavigationState::Active { index: 2 })
    );
    assert_eq!(session.current_question().map(|q| q.id.as_str()), Some("q3"));
    assert_eq!(session.position(), (2, 2));
    assert_eq!(session.progress_fraction(), 1.0);
}

#[test]
fn revealed_required_question_blocks_advance() {
    let mut session = Session::new(branching());
    session.submit_answer("q1", "A").expect("known question");

    assert_eq!(
        session.advance(),
        AdvanceOutcome::Moved(NavigationState::Active { index: 1 })
    );
    let outcome = session.advance();
    assert!(!outcome.is_ok());
    assert_eq!(outcome.unmet_title(), Some("Tell us about A"));
    assert_eq!(session.state(), NavigationState::Active { index: 1 });
}

#[test]
fn stale_answer_of_hidden_question_does_not_block_submit() {
    let mut session = Session::new(branching());
    session.submit_answer("q1", "A").expect("known question");
    assert!(session.advance().is_ok());
    session.submit_answer("q2", "x").expect("known question");
    assert!(session.advance().is_ok());
    session.submit_answer("q3", "done").expect("known question");
    assert!(session.advance().is_ok());
    assert_eq!(session.state(), NavigationState::ReadyToSubmit);

    assert_eq!(session.retreat(), NavigationState::Active { index: 2 });
    assert_eq!(session.retreat(), NavigationState::Active { index: 1 });
    assert_eq!(session.retreat(), NavigationState::Active { index: 0 });
    session.submit_answer("q1", "B").expect("known question");

    assert!(session.advance().is_ok());
    assert!(session.advance().is_ok());
    assert!(session.can_submit());
    assert!(session.validate_all().is_empty());
    assert!(session.responses().contains("q2"));
}

#[test]
fn non_numeric_answer_keeps_dependent_hidden() {
    let survey = Survey::new(
        "numeric",
        "Numeric",
        vec![
            Question::new("q1", QuestionType::ShortText, "Count"),
            Question::new("q2", QuestionType::ShortText, "Why so many?").with_skip_logic(
                SkipLogic::new("q1", Operator::GreaterThan, Some("5")),
            ),
        ],
    );
    let mut responses = ResponseStore::new();
    responses.set("q1", "abc");

    let logic = survey.questions[1].skip_logic.as_ref().expect("logic");
    assert!(!evaluate(logic, &responses));
    assert!(!is_visible(&survey, 1, &responses));
}

#[test]
fn multi_choice_without_selection_never_submits() {
    let survey = Survey::new(
        "multi",
        "Multi",
        vec![
            Question::new("q1", QuestionType::MultiChoice, "Pick some")
                .with_options(["a", "b"])
                .required(),
        ],
    );
    let mut session = Session::new(survey);
    session
        .submit_answer("q1", Vec::<String>::new())
        .expect("known question");
    assert!(!session.advance().is_ok());
    assert!(!session.can_submit());

    session.submit_answer("q1", vec!["b"]).expect("known question");
    assert!(session.advance().is_ok());
    assert!(session.can_submit());
}

#[test]
fn empty_survey_is_immediately_submittable() {
    let session = Session::new(Survey::new("empty", "Empty", Vec::new()));
    assert_eq!(session.state(), NavigationState::ReadyToSubmit);
    assert!(session.can_submit());
    assert!(session.validate_all().is_empty());
    assert_eq!(session.progress_fraction(), 0.0);
    assert!(session.current_question().is_none());
}

#[test]
fn survey_with_no_visible_questions_starts_ready() {
    let survey = Survey::new(
        "hidden",
        "Hidden",
        vec![
            Question::new("q1", QuestionType::ShortText, "Hidden")
                .required()
                .with_skip_logic(SkipLogic::new("nowhere", Operator::IsEmpty, None)),
        ],
    );
    let mut session = Session::new(survey);
    assert_eq!(session.state(), NavigationState::ReadyToSubmit);
    assert_eq!(session.retreat(), NavigationState::ReadyToSubmit);
    assert!(session.can_submit());
}

#[test]
fn retreat_from_ready_reenters_at_last_visible_question() {
    let mut responses = ResponseStore::new();
    responses.set("q1", "B");
    responses.set("q3", "fine");
    let mut controller = NavigationController::new(branching(), &responses);
    assert!(controller.advance(&responses).is_ok());
    assert!(controller.advance(&responses).is_ok());
    assert!(controller.is_ready_to_submit());
    assert_eq!(controller.progress_fraction(&responses), 1.0);

    assert_eq!(
        controller.retreat(&responses),
        NavigationState::Active { index: 2 }
    );
    assert_eq!(
        controller.retreat(&responses),
        NavigationState::Active { index: 0 }
    );
}

#[test]
fn changing_an_earlier_answer_revalidates_at_submit() {
    let mut session = Session::new(branching());
    session.submit_answer("q1", "B").expect("known question");
    assert!(session.advance().is_ok());
    session.submit_answer("q3", "done").expect("known question");
    assert!(session.advance().is_ok());
    assert!(session.can_submit());

    session.submit_answer("q1", "A").expect("known question");
    assert_eq!(session.state(), NavigationState::ReadyToSubmit);
    assert!(!session.can_submit());
    assert_eq!(session.validate_all(), vec!["Tell us about A".to_string()]);

    session.submit_answer("q2", "because").expect("known question");
    assert!(session.can_submit());
}

#[test]
fn advance_then_retreat_round_trips() {
    let survey = Survey::from_json(fixture("customer_feedback")).expect("deserialize");
    let mut responses = ResponseStore::new();
    responses.set("email", "ada@example.com");
    responses.set("satisfaction", 2.0);
    responses.set("complaint", "slow");
    responses.set("features", vec!["alerts"]);
    responses.set("alert-detail", "SMS");

    for start in visible_indices(&survey, &responses) {
        let mut controller = NavigationController::resume(
            survey.clone(),
            NavigationState::Active { index: start },
            &responses,
        );
        assert!(controller.advance(&responses).is_ok());
        assert_eq!(
            controller.retreat(&responses),
            NavigationState::Active { index: start }
        );
    }
}

#[test]
fn advance_never_lands_on_a_hidden_question() {
    let survey = Survey::from_json(fixture("customer_feedback")).expect("deserialize");
    let answer_sets = [
        vec![("satisfaction", "5"), ("features", "")],
        vec![("satisfaction", "1"), ("complaint", "bad")],
        vec![("satisfaction", "oops")],
    ];

    for answers in answer_sets {
        let mut responses = ResponseStore::new();
        responses.set("email", "ada@example.com");
        for (id, value) in answers {
            responses.set(id, value);
        }
        responses.set("alert-detail", "Push");

        let mut controller = NavigationController::new(survey.clone(), &responses);
        while let NavigationState::Active { index } = controller.state() {
            assert!(is_visible(&survey, index, &responses));
            if !controller.advance(&responses).is_ok() {
                break;
            }
        }
    }
}

#[test]
fn later_answers_do_not_change_earlier_visibility() {
    let survey = Survey::from_json(fixture("customer_feedback")).expect("deserialize");
    let mut responses = ResponseStore::new();
    responses.set("satisfaction", 2.0);
    let before: Vec<bool> = (0..3).map(|i| is_visible(&survey, i, &responses)).collect();

    responses.set("features", vec!["alerts"]);
    responses.set("comments", "later");
    let after: Vec<bool> = (0..3).map(|i| is_visible(&survey, i, &responses)).collect();

    assert_eq!(before, after);
    assert_eq!(before, vec![true, true, true]);
    assert_eq!(
        first_visible_from(&survey, 3, &responses),
        Some(3),
        "features has no skip logic"
    );
}

#[test]
fn visibility_is_deterministic() {
    let survey = Survey::from_json(fixture("customer_feedback")).expect("deserialize");
    let mut responses = ResponseStore::new();
    responses.set("satisfaction", 1.0);
    responses.set("features", vec!["reports", "alerts"]);

    let first = visible_indices(&survey, &responses);
    for _ in 0..5 {
        assert_eq!(visible_indices(&survey, &responses), first);
    }
    assert_eq!(first, vec![0, 1, 2, 3, 4, 5]);
}
