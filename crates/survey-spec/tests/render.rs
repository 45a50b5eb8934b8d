use survey_spec::{RenderStatus, Session, Survey, build_render_payload, render_json_ui, render_text};

fn fixture(name: &str) -> &'static str {
    match name {
        "branching_survey" => include_str!("../tests/fixtures/branching_survey.json"),
        "customer_feedback" => include_str!("../tests/fixtures/customer_feedback.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn session(name: &str) -> Session {
    Session::new(Survey::from_json(fixture(name)).expect("deserialize"))
}

#[test]
fn render_text_includes_current_question() {
    let session = session("branching_survey");
    let payload = build_render_payload(&session);

    assert_eq!(payload.status, RenderStatus::NeedInput);
    assert_eq!(payload.current_question_id.as_deref(), Some("q1"));

    let text = render_text(&payload);
    assert!(text.contains("Current question: q1"));
    assert!(text.contains("Options: A, B"));
    assert!(text.contains("Visible questions"));
    assert!(!text.contains("Tell us about A"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let mut session = session("customer_feedback");
    session
        .submit_answer("satisfaction", 2.0)
        .expect("known question");
    let payload = build_render_payload(&session);

    let ui = render_json_ui(&payload);
    assert_eq!(ui["surveyId"], "customer-feedback");
    assert_eq!(ui["status"], "need_input");
    assert_eq!(ui["progress"]["total"], 5);
    assert_eq!(ui["progress"]["position"], 1);
    let questions = ui["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 6);
    assert_eq!(questions[1]["currentValue"], 2.0);
    assert_eq!(questions[2]["visible"], true);
    assert_eq!(questions[4]["visible"], false);
    assert_eq!(questions[3]["options"][0]["label"], "Reports");
}

#[test]
fn ready_session_reports_unmet_requirements() {
    let mut session = session("branching_survey");
    session.submit_answer("q1", "B").expect("known question");
    session.submit_answer("q3", "ok").expect("known question");
    assert!(session.advance().is_ok());
    assert!(session.advance().is_ok());
    let payload = build_render_payload(&session);
    assert_eq!(payload.status, RenderStatus::ReadyToSubmit);
    assert_eq!(render_json_ui(&payload)["status"], "ready_to_submit");

    session.submit_answer("q1", "A").expect("known question");
    let payload = build_render_payload(&session);
    assert_eq!(payload.status, RenderStatus::Blocked);
    assert_eq!(render_json_ui(&payload)["status"], "blocked");
    assert!(render_text(&payload).contains("Unanswered required: Tell us about A"));
}
