use serde::{Deserialize, Serialize};
use tracing::error;

use super::classifier::{Classifier, ClassifierError};
use super::domain::{ApplicantRecord, ClassLabel, FeatureName, PredictionResult};
use super::schema::{encode, EncodingError};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The classifier's trained feature list disagrees with the record handed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error(
    "classifier {model_version} expects features [{}] but the record provides [{}]",
    .expected.join(", "),
    .provided.join(", ")
)]
pub struct SchemaMismatch {
    pub model_version: String,
    pub expected: Vec<String>,
    pub provided: Vec<String>,
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

impl SchemaMismatch {
    /// Same names, different order.
    pub fn is_reordering(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Failures while interpreting a normalized record with a loaded classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
    #[error(transparent)]
    Vocabulary(#[from] EncodingError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("classifier returned invalid probabilities {probabilities:?}")]
    InvalidProbabilities { probabilities: [f64; 2] },
}

/// Score a normalized record with the given classifier.
pub fn predict<C>(
    record: &ApplicantRecord,
    classifier: &C,
) -> Result<PredictionResult, PredictionError>
where
    C: Classifier + ?Sized,
{
    let result = interpret(record, classifier);
    if let Err(err) = &result {
        error!(
            model_version = %classifier.model_version(),
            error = %err,
            "loan prediction failed"
        );
    }
    result
}

fn interpret<C>(
    record: &ApplicantRecord,
    classifier: &C,
) -> Result<PredictionResult, PredictionError>
where
    C: Classifier + ?Sized,
{
    let features = encode(record, classifier.vocabulary())?;
    check_schema(classifier, &features.names())?;

    let (label, probabilities) = classifier.predict_with_probability(&features)?;
    if !valid_probabilities(probabilities) {
        return Err(PredictionError::InvalidProbabilities { probabilities });
    }

    Ok(PredictionResult {
        approved: label == ClassLabel::Approved,
        confidence: probabilities[label.index()],
    })
}

fn check_schema<C>(classifier: &C, provided: &[&str]) -> Result<(), SchemaMismatch>
where
    C: Classifier + ?Sized,
{
    let expected = classifier.feature_names();
    if expected.iter().map(String::as_str).eq(provided.iter().copied()) {
        return Ok(());
    }

    let missing = expected
        .iter()
        .filter(|name| !provided.contains(&name.as_str()))
        .cloned()
        .collect();
    let unexpected = provided
        .iter()
        .filter(|name| !expected.iter().any(|known| known.as_str() == **name))
        .map(|name| name.to_string())
        .collect();

    Err(SchemaMismatch {
        model_version: classifier.model_version().to_string(),
        expected: expected.to_vec(),
        provided: provided.iter().map(|name| name.to_string()).collect(),
        missing,
        unexpected,
    })
}

fn valid_probabilities(probabilities: [f64; 2]) -> bool {
    probabilities
        .iter()
        .all(|p| p.is_finite() && (0.0..=1.0).contains(p))
        && (probabilities[0] + probabilities[1] - 1.0).abs() <= PROBABILITY_TOLERANCE
}

/// User-facing outcome of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    Approved { confidence: f64 },
    Rejected { confidence: f64 },
    IncompleteInput { missing: Vec<FeatureName> },
}

impl Verdict {
    pub fn from_prediction(prediction: &PredictionResult) -> Self {
        if prediction.approved {
            Verdict::Approved {
                confidence: prediction.confidence,
            }
        } else {
            Verdict::Rejected {
                confidence: prediction.confidence,
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Approved { .. } => "approved",
            Verdict::Rejected { .. } => "rejected",
            Verdict::IncompleteInput { .. } => "incomplete_input",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Verdict::Approved { confidence } => format!(
                "This loan is predicted to be APPROVED (confidence {:.1}%)",
                confidence * 100.0
            ),
            Verdict::Rejected { confidence } => format!(
                "This loan is predicted to be REJECTED (confidence {:.1}%)",
                confidence * 100.0
            ),
            Verdict::IncompleteInput { missing } if missing.is_empty() => {
                "Please fill in all required fields before predicting.".to_string()
            }
            Verdict::IncompleteInput { missing } => format!(
                "Please fill in all required fields before predicting (missing: {}).",
                missing
                    .iter()
                    .map(|feature| feature.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}
