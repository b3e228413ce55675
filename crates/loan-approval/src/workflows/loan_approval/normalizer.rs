use serde::Serialize;
use tracing::debug;

use super::domain::{
    ApplicantRecord, Categorical, Education, FeatureName, Gender, HomeOwnership, LoanIntent,
    PreviousDefault, RawApplication,
};

/// Interest rate assumed when the rate widget is left untouched.
pub const DEFAULT_INTEREST_RATE: f64 = 1.0;

/// Validation errors raised while turning raw form input into an applicant record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteInput),
    #[error("unrecognized {feature} value '{value}'")]
    UnrecognizedLabel { feature: FeatureName, value: String },
    #[error("{feature} value {value} outside allowed range {min}..={max}")]
    OutOfRange {
        feature: FeatureName,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// One or more required fields were absent, zero, or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("missing required fields: {}", join_features(.missing))]
pub struct IncompleteInput {
    pub missing: Vec<FeatureName>,
}

fn join_features(features: &[FeatureName]) -> String {
    features
        .iter()
        .map(|feature| feature.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which optional features this deployment's form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizerPolicy {
    pub collect_credit_score: bool,
    pub collect_credit_history: bool,
}

impl Default for NormalizerPolicy {
    fn default() -> Self {
        Self {
            collect_credit_score: true,
            collect_credit_history: true,
        }
    }
}

impl NormalizerPolicy {
    /// Collect exactly the optional features a classifier declares.
    pub fn for_features<S: AsRef<str>>(feature_names: &[S]) -> Self {
        let declares = |feature: FeatureName| {
            feature_names
                .iter()
                .any(|name| name.as_ref() == feature.as_str())
        };

        Self {
            collect_credit_score: declares(FeatureName::CreditScore),
            collect_credit_history: declares(FeatureName::CbPersonCredHistLength),
        }
    }
}

/// Maps raw form submissions onto the canonical applicant record.
#[derive(Debug, Clone, Default)]
pub struct SchemaNormalizer {
    policy: NormalizerPolicy,
}

impl SchemaNormalizer {
    pub fn new(policy: NormalizerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NormalizerPolicy {
        self.policy
    }

    /// Features a submission must carry before any prediction is attempted.
    pub fn required_features(&self) -> Vec<FeatureName> {
        let mut required = vec![
            FeatureName::PersonAge,
            FeatureName::PersonGender,
            FeatureName::PersonEducation,
            FeatureName::PersonIncome,
            FeatureName::PersonHomeOwnership,
            FeatureName::LoanAmnt,
            FeatureName::LoanIntent,
        ];
        if self.policy.collect_credit_score {
            required.push(FeatureName::CreditScore);
        }
        required.push(FeatureName::PreviousLoanDefaultsOnFile);
        required
    }

    pub fn normalize(&self, raw: &RawApplication) -> Result<ApplicantRecord, IntakeError> {
        let missing: Vec<FeatureName> = self
            .required_features()
            .into_iter()
            .filter(|feature| !is_present(raw, *feature))
            .collect();
        if !missing.is_empty() {
            debug!(missing = %join_features(&missing), "incomplete loan submission");
            return Err(IncompleteInput { missing }.into());
        }

        let annual_income = raw.annual_income.unwrap_or_default();
        let loan_amount = raw.loan_amount.unwrap_or_default();
        let loan_percent_income = derive_loan_percent_income(loan_amount, annual_income);
        if let Some(advisory) = raw.loan_percent_income {
            if (advisory - loan_percent_income).abs() > f64::EPSILON {
                debug!(
                    advisory,
                    recomputed = loan_percent_income,
                    "ignoring submitted loan_percent_income"
                );
            }
        }

        let credit_history_length = if self.policy.collect_credit_history {
            Some(narrow_u8(
                FeatureName::CbPersonCredHistLength,
                raw.credit_history_length.unwrap_or_default(),
            )?)
        } else {
            None
        };

        let credit_score = if self.policy.collect_credit_score {
            let score = raw.credit_score.unwrap_or_default();
            Some(u16::try_from(score).map_err(|_| {
                out_of_range(FeatureName::CreditScore, score, f64::from(u16::MAX))
            })?)
        } else {
            None
        };

        Ok(ApplicantRecord {
            age: narrow_u8(FeatureName::PersonAge, raw.age.unwrap_or_default())?,
            gender: parse_label::<Gender>(raw.gender.as_deref())?,
            education: parse_label::<Education>(raw.education.as_deref())?,
            annual_income,
            employment_years: narrow_u8(
                FeatureName::PersonEmpExp,
                raw.employment_years.unwrap_or_default(),
            )?,
            home_ownership: parse_label::<HomeOwnership>(raw.home_ownership.as_deref())?,
            loan_amount,
            loan_intent: parse_label::<LoanIntent>(raw.loan_intent.as_deref())?,
            loan_interest_rate: round_to_tenths(
                raw.loan_interest_rate.unwrap_or(DEFAULT_INTEREST_RATE),
            ),
            loan_percent_income,
            credit_history_length,
            credit_score,
            previous_default: parse_label::<PreviousDefault>(raw.previous_default.as_deref())?,
        })
    }
}

/// Loan amount over annual income, or zero unless both are strictly positive.
pub fn derive_loan_percent_income(loan_amount: f64, annual_income: f64) -> f64 {
    if loan_amount > 0.0 && annual_income > 0.0 {
        loan_amount / annual_income
    } else {
        0.0
    }
}

fn is_present(raw: &RawApplication, feature: FeatureName) -> bool {
    let has_text = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    };
    let positive = |value: Option<f64>| value.is_some_and(|value| value > 0.0);

    match feature {
        FeatureName::PersonAge => raw.age.is_some_and(|age| age > 0),
        FeatureName::PersonGender => has_text(&raw.gender),
        FeatureName::PersonEducation => has_text(&raw.education),
        FeatureName::PersonIncome => positive(raw.annual_income),
        FeatureName::PersonEmpExp => raw.employment_years.is_some(),
        FeatureName::PersonHomeOwnership => has_text(&raw.home_ownership),
        FeatureName::LoanAmnt => positive(raw.loan_amount),
        FeatureName::LoanIntent => has_text(&raw.loan_intent),
        FeatureName::LoanIntRate => raw.loan_interest_rate.is_some(),
        FeatureName::LoanPercentIncome => true,
        FeatureName::CbPersonCredHistLength => raw.credit_history_length.is_some(),
        FeatureName::CreditScore => raw.credit_score.is_some_and(|score| score > 0),
        FeatureName::PreviousLoanDefaultsOnFile => has_text(&raw.previous_default),
    }
}

fn parse_label<C: Categorical>(raw: Option<&str>) -> Result<C, IntakeError> {
    let value = raw.unwrap_or_default();
    C::parse_label(value).ok_or_else(|| IntakeError::UnrecognizedLabel {
        feature: C::FEATURE,
        value: value.to_string(),
    })
}

fn narrow_u8(feature: FeatureName, value: u32) -> Result<u8, IntakeError> {
    u8::try_from(value).map_err(|_| out_of_range(feature, value, f64::from(u8::MAX)))
}

fn out_of_range(feature: FeatureName, value: u32, max: f64) -> IntakeError {
    IntakeError::OutOfRange {
        feature,
        value: f64::from(value),
        min: 0.0,
        max,
    }
}

fn round_to_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
