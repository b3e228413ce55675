use super::common::*;
use crate::workflows::loan_approval::domain::{FeatureName, RawApplication};
use crate::workflows::loan_approval::interpreter::Verdict;
use crate::workflows::loan_approval::service::LoanServiceError;
use crate::workflows::loan_approval::session::{FormSession, SessionState};

#[test]
fn session_starts_awaiting_input() {
    let (_, service) = service_with(StubClassifier::approving(0.7));
    let session = FormSession::new(&service);

    assert_eq!(session.state(), &SessionState::AwaitingInput { warning: None });
    assert_eq!(session.state().label(), "awaiting_input");
}

#[test]
fn complete_submission_displays_the_result() {
    let (_, service) = service_with(StubClassifier::rejecting(0.8));
    let mut session = FormSession::new(&service);

    let verdict = session.submit(&scenario_a()).expect("scored");

    assert_eq!(verdict, Verdict::Rejected { confidence: 0.8 });
    assert_eq!(session.state(), &SessionState::ResultDisplayed(verdict));
}

#[test]
fn incomplete_submission_stays_awaiting_input_with_a_warning() {
    let (classifier, service) = service_with(StubClassifier::approving(0.7));
    let mut session = FormSession::new(&service);
    let raw = RawApplication {
        age: Some(0),
        ..scenario_a()
    };

    let verdict = session.submit(&raw).expect("warning verdict");

    let expected = Verdict::IncompleteInput {
        missing: vec![FeatureName::PersonAge],
    };
    assert_eq!(verdict, expected);
    assert_eq!(
        session.state(),
        &SessionState::AwaitingInput {
            warning: Some(expected)
        }
    );
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn resubmission_after_a_result_starts_a_new_cycle() {
    let (classifier, service) = service_with(StubClassifier::approving(0.7));
    let mut session = FormSession::new(&service);

    session.submit(&scenario_a()).expect("first submission");
    assert_eq!(session.state().label(), "result_displayed");

    let incomplete = RawApplication {
        loan_amount: None,
        ..scenario_a()
    };
    session.submit(&incomplete).expect("warning verdict");
    assert_eq!(session.state().label(), "awaiting_input");

    session.submit(&scenario_a()).expect("second complete submission");
    assert_eq!(session.state().label(), "result_displayed");
    assert_eq!(classifier.calls(), 2);

    session.reset();
    assert_eq!(session.state(), &SessionState::AwaitingInput { warning: None });
}

#[test]
fn failed_submission_returns_the_error_and_clears_the_result() {
    let (_, service) = service_with(StubClassifier::approving(0.7));
    let mut session = FormSession::new(&service);
    session.submit(&scenario_a()).expect("first submission");

    let unknown = RawApplication {
        loan_intent: Some("yacht".to_string()),
        ..scenario_a()
    };
    let err = session.submit(&unknown).expect_err("unknown intent");

    assert!(matches!(err, LoanServiceError::Intake(_)));
    assert_eq!(session.state(), &SessionState::AwaitingInput { warning: None });
}
