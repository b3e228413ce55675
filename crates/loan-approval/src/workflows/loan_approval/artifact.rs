use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::classifier::{Classifier, ClassifierError};
use super::domain::{ClassLabel, FeatureName};
use super::schema::{FeatureValue, FeatureVector};
use super::vocabulary::{VocabularyError, VocabularyTable};

const DEFAULT_THRESHOLD: f64 = 0.5;

/// Errors raised while loading a serialized model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid model artifact JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact declares no features")]
    NoFeatures,
    #[error("model artifact declares feature '{0}' more than once")]
    DuplicateFeature(String),
    #[error("model artifact parameter for '{0}' is not finite")]
    NonFinite(String),
    #[error("model artifact scale for '{0}' must be positive")]
    InvalidScale(String),
    #[error("decision threshold {0} must lie strictly between 0 and 1")]
    InvalidThreshold(f64),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error("vocabulary token '{token}' for '{feature}' has no trained weight")]
    UntrainedToken { feature: String, token: String },
}

/// Per-feature parameters of the logistic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
        weight: f64,
    },
    Categorical {
        name: String,
        weights: BTreeMap<String, f64>,
    },
}

fn unit_scale() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name, .. } | FeatureSpec::Categorical { name, .. } => name,
        }
    }

    fn contribution(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let name = self.name();
        let value = features
            .get(name)
            .ok_or_else(|| ClassifierError::MissingFeature(name.to_string()))?;

        match self {
            FeatureSpec::Numeric {
                mean,
                scale,
                weight,
                ..
            } => {
                let x = value.as_numeric().ok_or_else(|| ClassifierError::KindMismatch {
                    feature: name.to_string(),
                    expected: "numeric",
                })?;
                Ok(weight * (x - mean) / scale)
            }
            FeatureSpec::Categorical { weights, .. } => {
                let token = value.as_token().ok_or_else(|| ClassifierError::KindMismatch {
                    feature: name.to_string(),
                    expected: "categorical token",
                })?;
                weights
                    .get(token)
                    .copied()
                    .ok_or_else(|| ClassifierError::UnknownCategory {
                        feature: name.to_string(),
                        token: token.to_string(),
                    })
            }
        }
    }
}

/// Standardized logistic-regression classifier loaded from a JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    model_version: String,
    features: Vec<FeatureSpec>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default)]
    vocabulary: VocabularyTable,
    #[serde(skip)]
    feature_names: Vec<String>,
}

impl LogisticArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            model_version = %artifact.model_version,
            vocabulary = %artifact.vocabulary.version(),
            features = artifact.feature_names.len(),
            "loaded loan approval model artifact"
        );
        Ok(artifact)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_reader(reader)?;
        artifact.validated()
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validated()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    fn validated(mut self) -> Result<Self, ArtifactError> {
        if self.features.is_empty() {
            return Err(ArtifactError::NoFeatures);
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ArtifactError::InvalidThreshold(self.threshold));
        }
        if !self.intercept.is_finite() {
            return Err(ArtifactError::NonFinite("intercept".to_string()));
        }

        self.vocabulary.validate()?;

        let mut seen = HashSet::new();
        for spec in &self.features {
            let name = spec.name();
            if !seen.insert(name.to_string()) {
                return Err(ArtifactError::DuplicateFeature(name.to_string()));
            }

            match spec {
                FeatureSpec::Numeric {
                    mean,
                    scale,
                    weight,
                    ..
                } => {
                    if !(mean.is_finite() && scale.is_finite() && weight.is_finite()) {
                        return Err(ArtifactError::NonFinite(name.to_string()));
                    }
                    if *scale <= 0.0 {
                        return Err(ArtifactError::InvalidScale(name.to_string()));
                    }
                }
                FeatureSpec::Categorical { weights, .. } => {
                    if weights.values().any(|weight| !weight.is_finite()) {
                        return Err(ArtifactError::NonFinite(name.to_string()));
                    }
                    self.check_vocabulary_coverage(name, weights)?;
                }
            }
        }

        self.feature_names = self
            .features
            .iter()
            .map(|spec| spec.name().to_string())
            .collect();
        Ok(self)
    }

    /// Every token the vocabulary can emit for a feature must carry a trained weight.
    fn check_vocabulary_coverage(
        &self,
        name: &str,
        weights: &BTreeMap<String, f64>,
    ) -> Result<(), ArtifactError> {
        let Some(feature) = FeatureName::from_name(name) else {
            return Ok(());
        };

        for token in self.vocabulary.tokens_for(feature) {
            if !weights.contains_key(token) {
                return Err(ArtifactError::UntrainedToken {
                    feature: name.to_string(),
                    token: token.to_string(),
                });
            }
        }
        Ok(())
    }

    fn approval_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let mut logit = self.intercept;
        for spec in &self.features {
            let contribution = spec.contribution(features)?;
            if !contribution.is_finite() {
                return Err(ClassifierError::NonFinite(spec.name().to_string()));
            }
            logit += contribution;
        }

        Ok(sigmoid(logit))
    }
}

impl Classifier for LogisticArtifact {
    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn vocabulary(&self) -> &VocabularyTable {
        &self.vocabulary
    }

    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, ClassifierError> {
        self.predict_with_probability(features)
            .map(|(label, _)| label)
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], ClassifierError> {
        let approved = self.approval_probability(features)?;
        Ok([1.0 - approved, approved])
    }

    fn predict_with_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<(ClassLabel, [f64; 2]), ClassifierError> {
        let probabilities = self.predict_probability(features)?;
        let label = if probabilities[1] >= self.threshold {
            ClassLabel::Approved
        } else {
            ClassLabel::Rejected
        };
        Ok((label, probabilities))
    }
}

fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}
