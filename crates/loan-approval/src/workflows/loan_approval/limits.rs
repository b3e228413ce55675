use serde::Serialize;

use super::domain::{FeatureName, RawApplication};
use super::normalizer::IntakeError;

/// Inclusive numeric bounds enforced where the form widgets would enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldRange {
    pub feature: FeatureName,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(feature: FeatureName, min: f64, max: f64) -> Self {
        Self { feature, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Widget limits for the numeric form inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldLimits {
    pub age: FieldRange,
    pub annual_income: FieldRange,
    pub employment_years: FieldRange,
    pub loan_amount: FieldRange,
    pub loan_interest_rate: FieldRange,
    pub credit_history_length: FieldRange,
    pub credit_score: FieldRange,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            age: FieldRange::new(FeatureName::PersonAge, 18.0, 100.0),
            annual_income: FieldRange::new(FeatureName::PersonIncome, 0.0, 500_000.0),
            employment_years: FieldRange::new(FeatureName::PersonEmpExp, 0.0, 50.0),
            loan_amount: FieldRange::new(FeatureName::LoanAmnt, 0.0, 100_000.0),
            loan_interest_rate: FieldRange::new(FeatureName::LoanIntRate, 1.0, 40.0),
            credit_history_length: FieldRange::new(FeatureName::CbPersonCredHistLength, 0.0, 50.0),
            credit_score: FieldRange::new(FeatureName::CreditScore, 300.0, 850.0),
        }
    }
}

impl FieldLimits {
    /// Reject entered values outside the widget bounds. Absent values pass through so the
    /// normalizer can report them as missing; a zero age or credit score counts as absent.
    pub fn check(&self, raw: &RawApplication) -> Result<(), IntakeError> {
        let unset_when_zero = |value: Option<u32>| value.filter(|value| *value != 0);

        check_range(&self.age, unset_when_zero(raw.age).map(f64::from))?;
        check_range(&self.annual_income, raw.annual_income)?;
        check_range(&self.employment_years, raw.employment_years.map(f64::from))?;
        check_range(&self.loan_amount, raw.loan_amount)?;
        check_range(&self.loan_interest_rate, raw.loan_interest_rate)?;
        check_range(
            &self.credit_history_length,
            raw.credit_history_length.map(f64::from),
        )?;
        check_range(
            &self.credit_score,
            unset_when_zero(raw.credit_score).map(f64::from),
        )?;
        Ok(())
    }

    pub fn ranges(&self) -> [FieldRange; 7] {
        [
            self.age,
            self.annual_income,
            self.employment_years,
            self.loan_amount,
            self.loan_interest_rate,
            self.credit_history_length,
            self.credit_score,
        ]
    }
}

fn check_range(range: &FieldRange, value: Option<f64>) -> Result<(), IntakeError> {
    match value {
        Some(value) if !range.contains(value) => Err(IntakeError::OutOfRange {
            feature: range.feature,
            value,
            min: range.min,
            max: range.max,
        }),
        _ => Ok(()),
    }
}
