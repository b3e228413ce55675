use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{Categorical, FeatureName};

const CANONICAL_VERSION: &str = "canonical-v1";

/// Auditable mapping from canonical categorical labels to the tokens a classifier was trained on.
///
/// The table ships inside the model artifact so label spellings stay pinned to the model that
/// consumes them. A deployment whose model was trained on `"Male"`/`"EDUCATION"`-style tokens
/// overrides the entries here instead of patching strings at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyTable {
    version: String,
    tokens: BTreeMap<FeatureName, BTreeMap<String, String>>,
}

/// One row of the vocabulary, used for audits and the schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub feature: FeatureName,
    pub label: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    #[error("vocabulary {version} is missing a token for {feature}={label}")]
    MissingLabel {
        version: String,
        feature: FeatureName,
        label: &'static str,
    },
    #[error("vocabulary {version} maps unknown label {feature}={label}")]
    UnknownLabel {
        version: String,
        feature: FeatureName,
        label: String,
    },
    #[error("vocabulary {version} lists numeric feature {feature}")]
    NotCategorical { version: String, feature: FeatureName },
    #[error("vocabulary {version} reuses token '{token}' for {feature}")]
    DuplicateToken {
        version: String,
        feature: FeatureName,
        token: String,
    },
    #[error("vocabulary {version} has an empty token for {feature}={label}")]
    EmptyToken {
        version: String,
        feature: FeatureName,
        label: String,
    },
}

impl VocabularyTable {
    /// Identity table: every token equals its canonical lowercase label.
    pub fn canonical() -> Self {
        let mut tokens = BTreeMap::new();
        for feature in FeatureName::CANONICAL_ORDER {
            if let Some(labels) = feature.categorical_labels() {
                let entries = labels
                    .iter()
                    .map(|label| (label.to_string(), label.to_string()))
                    .collect();
                tokens.insert(feature, entries);
            }
        }

        Self {
            version: CANONICAL_VERSION.to_string(),
            tokens,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn token<C: Categorical>(&self, value: C) -> Option<&str> {
        self.tokens
            .get(&C::FEATURE)?
            .get(value.canonical())
            .map(String::as_str)
    }

    pub fn insert(
        &mut self,
        feature: FeatureName,
        label: impl Into<String>,
        token: impl Into<String>,
    ) {
        self.tokens
            .entry(feature)
            .or_default()
            .insert(label.into(), token.into());
    }

    /// All tokens the table can emit for a feature.
    pub fn tokens_for(&self, feature: FeatureName) -> Vec<&str> {
        self.tokens
            .get(&feature)
            .map(|entries| entries.values().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> Vec<VocabularyEntry> {
        self.tokens
            .iter()
            .flat_map(|(feature, entries)| {
                entries.iter().map(move |(label, token)| VocabularyEntry {
                    feature: *feature,
                    label: label.clone(),
                    token: token.clone(),
                })
            })
            .collect()
    }

    /// Check that every categorical label has exactly one distinct, non-empty token.
    pub fn validate(&self) -> Result<(), VocabularyError> {
        for (feature, entries) in &self.tokens {
            let Some(labels) = feature.categorical_labels() else {
                return Err(VocabularyError::NotCategorical {
                    version: self.version.clone(),
                    feature: *feature,
                });
            };

            let mut seen = BTreeSet::new();
            for (label, token) in entries {
                if !labels.contains(&label.as_str()) {
                    return Err(VocabularyError::UnknownLabel {
                        version: self.version.clone(),
                        feature: *feature,
                        label: label.clone(),
                    });
                }
                if token.trim().is_empty() {
                    return Err(VocabularyError::EmptyToken {
                        version: self.version.clone(),
                        feature: *feature,
                        label: label.clone(),
                    });
                }
                if !seen.insert(token.as_str()) {
                    return Err(VocabularyError::DuplicateToken {
                        version: self.version.clone(),
                        feature: *feature,
                        token: token.clone(),
                    });
                }
            }
        }

        for feature in FeatureName::CANONICAL_ORDER {
            let Some(labels) = feature.categorical_labels() else {
                continue;
            };
            let entries = self.tokens.get(&feature);
            for label in labels {
                if entries.map_or(true, |entries| !entries.contains_key(*label)) {
                    return Err(VocabularyError::MissingLabel {
                        version: self.version.clone(),
                        feature,
                        label: *label,
                    });
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, feature: FeatureName, label: &str) {
        if let Some(entries) = self.tokens.get_mut(&feature) {
            entries.remove(label);
        }
    }
}

impl Default for VocabularyTable {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::loan_approval::domain::{Gender, LoanIntent};

    #[test]
    fn canonical_table_is_complete_and_lowercase() {
        let table = VocabularyTable::canonical();

        table.validate().expect("canonical table validates");
        assert_eq!(table.token(Gender::Male), Some("male"));
        assert_eq!(
            table.token(LoanIntent::DebtConsolidation),
            Some("debt_consolidation")
        );
        assert_eq!(table.entries().len(), 2 + 5 + 4 + 6 + 2);
    }

    #[test]
    fn overrides_follow_the_trained_spelling() {
        let mut table = VocabularyTable::canonical().with_version("loan-data-2024");
        table.insert(FeatureName::PersonGender, "male", "Male");
        table.insert(FeatureName::LoanIntent, "education", "EDUCATION");

        table.validate().expect("overrides keep table complete");
        assert_eq!(table.token(Gender::Male), Some("Male"));
        assert_eq!(table.token(LoanIntent::Education), Some("EDUCATION"));
        assert_eq!(table.token(Gender::Female), Some("female"));
    }

    #[test]
    fn validate_rejects_incomplete_tables() {
        let mut table = VocabularyTable::canonical();
        table.remove(FeatureName::PreviousLoanDefaultsOnFile, "yes");

        match table.validate() {
            Err(VocabularyError::MissingLabel { feature, label, .. }) => {
                assert_eq!(feature, FeatureName::PreviousLoanDefaultsOnFile);
                assert_eq!(label, "yes");
            }
            other => panic!("expected missing label, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_duplicate_tokens_and_numeric_features() {
        let mut duplicate = VocabularyTable::canonical();
        duplicate.insert(FeatureName::PersonGender, "female", "male");
        assert!(matches!(
            duplicate.validate(),
            Err(VocabularyError::DuplicateToken { .. })
        ));

        let mut numeric = VocabularyTable::canonical();
        numeric.insert(FeatureName::CreditScore, "high", "high");
        assert!(matches!(
            numeric.validate(),
            Err(VocabularyError::NotCategorical { .. })
        ));
    }
}
