//! Loan application intake, feature normalization, and classifier-backed decisions.
//!
//! A submission flows through [`FieldLimits`], the [`SchemaNormalizer`], and
//! [`interpreter::predict`]. The classifier is an immutable handle loaded once at startup and
//! passed in explicitly so tests can substitute doubles.

pub mod artifact;
pub mod batch;
pub mod classifier;
pub mod domain;
pub mod interpreter;
pub mod limits;
pub mod normalizer;
pub mod router;
pub mod schema;
pub mod service;
pub mod session;
pub mod vocabulary;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactError, FeatureSpec, LogisticArtifact};
pub use batch::{BatchEntry, BatchError, BatchReport, BatchScorer, BatchSummary};
pub use classifier::{Classifier, ClassifierError};
pub use domain::{
    ApplicantRecord, Categorical, ClassLabel, Education, FeatureName, Gender, HomeOwnership,
    LoanIntent, PredictionResult, PreviousDefault, RawApplication,
};
pub use interpreter::{predict, PredictionError, SchemaMismatch, Verdict};
pub use limits::{FieldLimits, FieldRange};
pub use normalizer::{
    derive_loan_percent_income, IncompleteInput, IntakeError, NormalizerPolicy, SchemaNormalizer,
};
pub use router::loan_router;
pub use schema::{encode, EncodedFeature, EncodingError, FeatureValue, FeatureVector};
pub use service::{Assessment, LoanApprovalService, LoanServiceError, SchemaView};
pub use session::{FormSession, SessionState};
pub use vocabulary::{VocabularyEntry, VocabularyError, VocabularyTable};
