use serde::{Deserialize, Serialize};

use super::domain::{ApplicantRecord, Categorical, FeatureName};
use super::vocabulary::VocabularyTable;

/// Encoded value handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Token(String),
}

impl FeatureValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(value) => Some(*value),
            FeatureValue::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            FeatureValue::Token(token) => Some(token),
            FeatureValue::Numeric(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedFeature {
    pub name: FeatureName,
    pub value: FeatureValue,
}

/// Ordered, encoded feature row for a single applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    features: Vec<EncodedFeature>,
}

impl FeatureVector {
    pub fn names(&self) -> Vec<&'static str> {
        self.features
            .iter()
            .map(|feature| feature.name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|feature| feature.name.as_str() == name)
            .map(|feature| &feature.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncodedFeature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Raised when the vocabulary cannot encode a categorical value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("vocabulary {version} has no token for {feature}={label}")]
pub struct EncodingError {
    pub version: String,
    pub feature: FeatureName,
    pub label: &'static str,
}

/// Encode a record into canonical feature order, skipping features the form did not collect.
pub fn encode(
    record: &ApplicantRecord,
    vocabulary: &VocabularyTable,
) -> Result<FeatureVector, EncodingError> {
    let mut features = Vec::with_capacity(FeatureName::CANONICAL_ORDER.len());

    for name in FeatureName::CANONICAL_ORDER {
        let value = match name {
            FeatureName::PersonAge => Some(FeatureValue::Numeric(f64::from(record.age))),
            FeatureName::PersonGender => Some(token(vocabulary, record.gender)?),
            FeatureName::PersonEducation => Some(token(vocabulary, record.education)?),
            FeatureName::PersonIncome => Some(FeatureValue::Numeric(record.annual_income)),
            FeatureName::PersonEmpExp => {
                Some(FeatureValue::Numeric(f64::from(record.employment_years)))
            }
            FeatureName::PersonHomeOwnership => Some(token(vocabulary, record.home_ownership)?),
            FeatureName::LoanAmnt => Some(FeatureValue::Numeric(record.loan_amount)),
            FeatureName::LoanIntent => Some(token(vocabulary, record.loan_intent)?),
            FeatureName::LoanIntRate => Some(FeatureValue::Numeric(record.loan_interest_rate)),
            FeatureName::LoanPercentIncome => {
                Some(FeatureValue::Numeric(record.loan_percent_income))
            }
            FeatureName::CbPersonCredHistLength => record
                .credit_history_length
                .map(|years| FeatureValue::Numeric(f64::from(years))),
            FeatureName::CreditScore => record
                .credit_score
                .map(|score| FeatureValue::Numeric(f64::from(score))),
            FeatureName::PreviousLoanDefaultsOnFile => {
                Some(token(vocabulary, record.previous_default)?)
            }
        };

        if let Some(value) = value {
            features.push(EncodedFeature { name, value });
        }
    }

    Ok(FeatureVector { features })
}

fn token<C: Categorical>(
    vocabulary: &VocabularyTable,
    value: C,
) -> Result<FeatureValue, EncodingError> {
    vocabulary
        .token(value)
        .map(|token| FeatureValue::Token(token.to_string()))
        .ok_or_else(|| EncodingError {
            version: vocabulary.version().to_string(),
            feature: C::FEATURE,
            label: value.canonical(),
        })
}
