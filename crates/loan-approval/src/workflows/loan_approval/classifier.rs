use super::domain::ClassLabel;
use super::schema::FeatureVector;
use super::vocabulary::VocabularyTable;

/// Contract for a loaded, read-only binary classifier.
///
/// Implementations are constructed once at startup and shared behind an `Arc`; nothing here
/// takes `&mut self`.
pub trait Classifier: Send + Sync {
    fn model_version(&self) -> &str;

    /// Feature names, in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Categorical tokens the model was trained on.
    fn vocabulary(&self) -> &VocabularyTable;

    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, ClassifierError>;

    /// Class probabilities as `[p_rejected, p_approved]`.
    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], ClassifierError>;

    /// Joint call for models that produce label and probabilities in one pass.
    fn predict_with_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<(ClassLabel, [f64; 2]), ClassifierError> {
        let label = self.predict(features)?;
        let probabilities = self.predict_probability(features)?;
        Ok((label, probabilities))
    }
}

/// Failures reported by a classifier while scoring an encoded feature row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier expects feature '{0}' which the row does not provide")]
    MissingFeature(String),
    #[error("feature '{feature}' has value kind the classifier cannot score (expected {expected})")]
    KindMismatch {
        feature: String,
        expected: &'static str,
    },
    #[error("classifier was not trained on token '{token}' for feature '{feature}'")]
    UnknownCategory { feature: String, token: String },
    #[error("classifier produced a non-finite score for feature '{0}'")]
    NonFinite(String),
}
