//! End-to-end scenarios for loan intake and scoring against the bundled logistic artifact.
//!
//! Everything goes through the public service facade and HTTP router so the artifact, the
//! vocabulary table, and the normalizer are exercised together.

mod common {
    use std::sync::Arc;

    use loan_approval::workflows::loan_approval::{
        LoanApprovalService, LogisticArtifact, RawApplication,
    };

    pub(super) const ARTIFACT: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../models/loan_approval_logistic.json"
    );

    pub(super) fn artifact() -> Arc<LogisticArtifact> {
        Arc::new(LogisticArtifact::from_path(ARTIFACT).expect("bundled artifact loads"))
    }

    pub(super) fn service() -> LoanApprovalService<LogisticArtifact> {
        LoanApprovalService::new(artifact())
    }

    pub(super) fn scenario_a() -> RawApplication {
        RawApplication {
            age: Some(30),
            gender: Some("male".to_string()),
            education: Some("bachelor".to_string()),
            annual_income: Some(50_000.0),
            employment_years: None,
            home_ownership: Some("rent".to_string()),
            loan_amount: Some(10_000.0),
            loan_intent: Some("education".to_string()),
            loan_interest_rate: Some(12.0),
            loan_percent_income: None,
            credit_history_length: Some(5),
            credit_score: Some(650),
            previous_default: Some("no".to_string()),
        }
    }
}

mod scoring {
    use super::common::{artifact, scenario_a, service};
    use loan_approval::workflows::loan_approval::{
        Classifier, FeatureName, IntakeError, LoanServiceError, RawApplication, Verdict,
    };

    #[test]
    fn bundled_artifact_declares_the_canonical_feature_order() {
        let artifact = artifact();
        let expected: Vec<String> = FeatureName::CANONICAL_ORDER
            .iter()
            .map(|feature| feature.as_str().to_string())
            .collect();

        assert_eq!(artifact.feature_names(), expected.as_slice());
        assert_eq!(artifact.vocabulary().version(), "canonical-v1");
    }

    #[test]
    fn scenario_a_is_deterministic() {
        let service = service();

        let first = service.assess(&scenario_a()).expect("scenario A scores");
        let second = service.assess(&scenario_a()).expect("scenario A scores again");

        assert!((first.record.loan_percent_income - 0.20).abs() < 1e-12);
        assert_eq!(first.prediction, second.prediction);
        assert!(first.prediction.approved);
        assert!(first.prediction.confidence >= 0.5 && first.prediction.confidence <= 1.0);
        assert_eq!(first.model_version, "loan-approval-logreg-2024.11");
    }

    #[test]
    fn prior_default_flips_the_decision() {
        let service = service();
        let raw = RawApplication {
            previous_default: Some("Yes".to_string()),
            ..scenario_a()
        };

        let assessment = service.assess(&raw).expect("scores");

        assert!(!assessment.prediction.approved);
        assert!(assessment.prediction.confidence > 0.9);
        assert!(matches!(assessment.verdict, Verdict::Rejected { .. }));
    }

    #[test]
    fn form_casing_does_not_change_the_encoded_features() {
        let service = service();
        let cased = RawApplication {
            gender: Some("Male".to_string()),
            education: Some(" Bachelor ".to_string()),
            home_ownership: Some("RENT".to_string()),
            loan_intent: Some("Education".to_string()),
            previous_default: Some("No".to_string()),
            ..scenario_a()
        };

        let lower = service.assess(&scenario_a()).expect("scores");
        let mixed = service.assess(&cased).expect("scores");

        assert_eq!(lower.record, mixed.record);
        assert_eq!(lower.prediction, mixed.prediction);
    }

    #[test]
    fn zero_income_raises_a_warning_instead_of_a_prediction() {
        let service = service();
        let raw = RawApplication {
            annual_income: Some(0.0),
            ..scenario_a()
        };

        let verdict = service.verdict(&raw).expect("warning verdict");

        assert_eq!(
            verdict,
            Verdict::IncompleteInput {
                missing: vec![FeatureName::PersonIncome]
            }
        );
    }

    #[test]
    fn unselected_previous_default_is_incomplete() {
        let service = service();
        let raw = RawApplication {
            previous_default: None,
            ..scenario_a()
        };

        match service.assess(&raw) {
            Err(LoanServiceError::Intake(IntakeError::Incomplete(incomplete))) => {
                assert_eq!(
                    incomplete.missing,
                    vec![FeatureName::PreviousLoanDefaultsOnFile]
                );
            }
            other => panic!("expected incomplete input, got {other:?}"),
        }
    }
}

mod http {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::service;
    use loan_approval::workflows::loan_approval::loan_router;

    async fn post(payload: Value) -> (StatusCode, Value) {
        let app = loan_router(Arc::new(service()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/loan/assessments")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn canonical_payload_is_scored() {
        let (status, body) = post(json!({
            "person_age": 30,
            "person_gender": "male",
            "person_education": "bachelor",
            "person_income": 50000,
            "person_home_ownership": "rent",
            "loan_amnt": 10000,
            "loan_intent": "education",
            "loan_int_rate": 12.0,
            "loan_percent_income": 0.5,
            "cb_person_cred_hist_length": 5,
            "credit_score": 650,
            "previous_loan_defaults_on_file": "no"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["loan_percent_income"], 0.2);
        assert_eq!(body["verdict"]["outcome"], "approved");
        assert!(body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("This loan is predicted to be APPROVED")));
    }

    #[tokio::test]
    async fn empty_form_lists_every_required_field() {
        let (status, body) = post(json!({})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["outcome"], "incomplete_input");
        assert_eq!(
            body["missing"],
            json!([
                "person_age",
                "person_gender",
                "person_education",
                "person_income",
                "person_home_ownership",
                "loan_amnt",
                "loan_intent",
                "credit_score",
                "previous_loan_defaults_on_file"
            ])
        );
    }

    #[tokio::test]
    async fn out_of_range_age_is_rejected() {
        let (status, body) = post(json!({ "person_age": 12 })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .is_some_and(|error| error.contains("person_age")));
    }
}
