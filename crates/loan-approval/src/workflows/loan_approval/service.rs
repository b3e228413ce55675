use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::classifier::Classifier;
use super::domain::{ApplicantRecord, FeatureName, PredictionResult, RawApplication};
use super::interpreter::{self, PredictionError, Verdict};
use super::limits::{FieldLimits, FieldRange};
use super::normalizer::{IntakeError, NormalizerPolicy, SchemaNormalizer};
use super::vocabulary::VocabularyEntry;

/// Service composing the input limits, schema normalizer, and decision interpreter.
pub struct LoanApprovalService<C: ?Sized> {
    classifier: Arc<C>,
    normalizer: SchemaNormalizer,
    limits: FieldLimits,
}

/// Full outcome of one scored submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub record: ApplicantRecord,
    pub prediction: PredictionResult,
    pub verdict: Verdict,
    pub message: String,
    pub model_version: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Snapshot of the serving schema so operators can audit it against the artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaView {
    pub model_version: String,
    pub vocabulary_version: String,
    pub classifier_features: Vec<String>,
    pub required_features: Vec<FeatureName>,
    pub policy: NormalizerPolicy,
    pub limits: Vec<FieldRange>,
    pub vocabulary: Vec<VocabularyEntry>,
}

impl<C> LoanApprovalService<C>
where
    C: Classifier + ?Sized + 'static,
{
    /// Build a service whose form policy follows the classifier's declared features.
    pub fn new(classifier: Arc<C>) -> Self {
        let policy = NormalizerPolicy::for_features(classifier.feature_names());
        Self::with_policy(classifier, policy)
    }

    pub fn with_policy(classifier: Arc<C>, policy: NormalizerPolicy) -> Self {
        let derived = NormalizerPolicy::for_features(classifier.feature_names());
        if derived != policy {
            warn!(
                model_version = %classifier.model_version(),
                ?policy,
                ?derived,
                "form policy disagrees with the classifier feature list; predictions will fail"
            );
        }

        Self {
            classifier,
            normalizer: SchemaNormalizer::new(policy),
            limits: FieldLimits::default(),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn normalizer(&self) -> &SchemaNormalizer {
        &self.normalizer
    }

    /// Validate, normalize, and score one raw submission.
    pub fn assess(&self, raw: &RawApplication) -> Result<Assessment, LoanServiceError> {
        self.limits.check(raw)?;
        let record = self.normalizer.normalize(raw)?;
        let prediction = interpreter::predict(&record, self.classifier.as_ref())?;
        let verdict = Verdict::from_prediction(&prediction);

        info!(
            model_version = %self.classifier.model_version(),
            outcome = verdict.label(),
            confidence = prediction.confidence,
            "loan submission scored"
        );

        Ok(Assessment {
            message: verdict.message(),
            record,
            prediction,
            verdict,
            model_version: self.classifier.model_version().to_string(),
            evaluated_at: Utc::now(),
        })
    }

    /// Like [`assess`](Self::assess), but renders incomplete input as a warning verdict.
    pub fn verdict(&self, raw: &RawApplication) -> Result<Verdict, LoanServiceError> {
        match self.assess(raw) {
            Ok(assessment) => Ok(assessment.verdict),
            Err(err) => err.as_warning().ok_or(err),
        }
    }

    pub fn schema(&self) -> SchemaView {
        let vocabulary = self.classifier.vocabulary();
        SchemaView {
            model_version: self.classifier.model_version().to_string(),
            vocabulary_version: vocabulary.version().to_string(),
            classifier_features: self.classifier.feature_names().to_vec(),
            required_features: self.normalizer.required_features(),
            policy: self.normalizer.policy(),
            limits: self.limits.ranges().to_vec(),
            vocabulary: vocabulary.entries(),
        }
    }
}

/// Error raised by the loan approval service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl LoanServiceError {
    /// Incomplete submissions are shown to the user as a warning instead of an error.
    pub fn as_warning(&self) -> Option<Verdict> {
        match self {
            LoanServiceError::Intake(IntakeError::Incomplete(incomplete)) => {
                Some(Verdict::IncompleteInput {
                    missing: incomplete.missing.clone(),
                })
            }
            _ => None,
        }
    }
}
