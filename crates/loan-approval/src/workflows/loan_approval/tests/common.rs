use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::loan_approval::classifier::{Classifier, ClassifierError};
use crate::workflows::loan_approval::domain::{ClassLabel, FeatureName, RawApplication};
use crate::workflows::loan_approval::schema::FeatureVector;
use crate::workflows::loan_approval::service::LoanApprovalService;
use crate::workflows::loan_approval::vocabulary::VocabularyTable;

/// Scenario A from the intake requirements, with home ownership filled in.
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

/// The same applicant as entered through the original form's mixed-case dropdowns.
pub(super) fn form_cased_submission() -> RawApplication {
    RawApplication {
        gender: Some("Male".to_string()),
        education: Some("High school".to_string()),
        home_ownership: Some("Mortgage".to_string()),
        loan_intent: Some("Debtconsolidation".to_string()),
        previous_default: Some("Yes".to_string()),
        ..scenario_a()
    }
}

pub(super) fn canonical_features() -> Vec<String> {
    FeatureName::CANONICAL_ORDER
        .iter()
        .map(|feature| feature.as_str().to_string())
        .collect()
}

/// Deterministic classifier double that records how often it is invoked.
pub(super) struct StubClassifier {
    feature_names: Vec<String>,
    vocabulary: VocabularyTable,
    label: ClassLabel,
    probabilities: [f64; 2],
    calls: AtomicUsize,
}

impl StubClassifier {
    pub(super) fn approving(p_approved: f64) -> Self {
        Self::new(ClassLabel::Approved, [1.0 - p_approved, p_approved])
    }

    pub(super) fn rejecting(p_rejected: f64) -> Self {
        Self::new(ClassLabel::Rejected, [p_rejected, 1.0 - p_rejected])
    }

    pub(super) fn new(label: ClassLabel, probabilities: [f64; 2]) -> Self {
        Self {
            feature_names: canonical_features(),
            vocabulary: VocabularyTable::canonical(),
            label,
            probabilities,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn with_features(mut self, names: &[&str]) -> Self {
        self.feature_names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub(super) fn without_feature(mut self, feature: FeatureName) -> Self {
        self.feature_names.retain(|name| name != feature.as_str());
        self
    }

    pub(super) fn with_vocabulary(mut self, vocabulary: VocabularyTable) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StubClassifier {
    fn model_version(&self) -> &str {
        "stub-v1"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn vocabulary(&self) -> &VocabularyTable {
        &self.vocabulary
    }

    fn predict(&self, _features: &FeatureVector) -> Result<ClassLabel, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label)
    }

    fn predict_probability(&self, _features: &FeatureVector) -> Result<[f64; 2], ClassifierError> {
        Ok(self.probabilities)
    }
}

pub(super) fn service_with(
    stub: StubClassifier,
) -> (Arc<StubClassifier>, LoanApprovalService<StubClassifier>) {
    let classifier = Arc::new(stub);
    let service = LoanApprovalService::new(classifier.clone());
    (classifier, service)
}

pub(super) async fn response_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
