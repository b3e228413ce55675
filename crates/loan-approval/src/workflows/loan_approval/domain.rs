use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical feature names, in the order the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureName {
    #[serde(rename = "person_age")]
    PersonAge,
    #[serde(rename = "person_gender")]
    PersonGender,
    #[serde(rename = "person_education")]
    PersonEducation,
    #[serde(rename = "person_income")]
    PersonIncome,
    #[serde(rename = "person_emp_exp")]
    PersonEmpExp,
    #[serde(rename = "person_home_ownership")]
    PersonHomeOwnership,
    #[serde(rename = "loan_amnt")]
    LoanAmnt,
    #[serde(rename = "loan_intent")]
    LoanIntent,
    #[serde(rename = "loan_int_rate")]
    LoanIntRate,
    #[serde(rename = "loan_percent_income")]
    LoanPercentIncome,
    #[serde(rename = "cb_person_cred_hist_length")]
    CbPersonCredHistLength,
    #[serde(rename = "credit_score")]
    CreditScore,
    #[serde(rename = "previous_loan_defaults_on_file")]
    PreviousLoanDefaultsOnFile,
}

impl FeatureName {
    pub const CANONICAL_ORDER: [FeatureName; 13] = [
        FeatureName::PersonAge,
        FeatureName::PersonGender,
        FeatureName::PersonEducation,
        FeatureName::PersonIncome,
        FeatureName::PersonEmpExp,
        FeatureName::PersonHomeOwnership,
        FeatureName::LoanAmnt,
        FeatureName::LoanIntent,
        FeatureName::LoanIntRate,
        FeatureName::LoanPercentIncome,
        FeatureName::CbPersonCredHistLength,
        FeatureName::CreditScore,
        FeatureName::PreviousLoanDefaultsOnFile,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FeatureName::PersonAge => "person_age",
            FeatureName::PersonGender => "person_gender",
            FeatureName::PersonEducation => "person_education",
            FeatureName::PersonIncome => "person_income",
            FeatureName::PersonEmpExp => "person_emp_exp",
            FeatureName::PersonHomeOwnership => "person_home_ownership",
            FeatureName::LoanAmnt => "loan_amnt",
            FeatureName::LoanIntent => "loan_intent",
            FeatureName::LoanIntRate => "loan_int_rate",
            FeatureName::LoanPercentIncome => "loan_percent_income",
            FeatureName::CbPersonCredHistLength => "cb_person_cred_hist_length",
            FeatureName::CreditScore => "credit_score",
            FeatureName::PreviousLoanDefaultsOnFile => "previous_loan_defaults_on_file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::CANONICAL_ORDER
            .iter()
            .copied()
            .find(|feature| feature.as_str() == name)
    }

    /// Canonical labels for categorical features, `None` for numeric ones.
    pub fn categorical_labels(self) -> Option<&'static [&'static str]> {
        match self {
            FeatureName::PersonGender => Some(Gender::LABELS),
            FeatureName::PersonEducation => Some(Education::LABELS),
            FeatureName::PersonHomeOwnership => Some(HomeOwnership::LABELS),
            FeatureName::LoanIntent => Some(LoanIntent::LABELS),
            FeatureName::PreviousLoanDefaultsOnFile => Some(PreviousDefault::LABELS),
            _ => None,
        }
    }

    pub fn is_categorical(self) -> bool {
        self.categorical_labels().is_some()
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enumerated form field whose values are encoded through the vocabulary table.
pub trait Categorical: Copy + Sized + 'static {
    const FEATURE: FeatureName;
    const VARIANTS: &'static [Self];
    const LABELS: &'static [&'static str];

    fn canonical(self) -> &'static str;

    /// Parse a raw form label, ignoring case, whitespace, and separators.
    fn parse_label(raw: &str) -> Option<Self> {
        let key = label_key(raw);
        if key.is_empty() {
            return None;
        }

        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| label_key(variant.canonical()) == key)
    }
}

/// Collapses "High school", "HIGH_SCHOOL" and "high-school" to the same key.
pub(crate) fn label_key(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident => $feature:expr, { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Categorical for $name {
            const FEATURE: FeatureName = $feature;
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];
            const LABELS: &'static [&'static str] = &[$($label),+];

            fn canonical(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.canonical())
            }
        }
    };
}

categorical!(
    /// Applicant gender as collected by the form.
    Gender => FeatureName::PersonGender, {
        Male => "male",
        Female => "female",
    }
);

categorical!(
    /// Highest completed education level.
    Education => FeatureName::PersonEducation, {
        HighSchool => "high_school",
        Bachelor => "bachelor",
        Master => "master",
        Associate => "associate",
        Doctorate => "doctorate",
    }
);

categorical!(
    HomeOwnership => FeatureName::PersonHomeOwnership, {
        Rent => "rent",
        Own => "own",
        Mortgage => "mortgage",
        Other => "other",
    }
);

categorical!(
    /// Declared purpose of the loan.
    LoanIntent => FeatureName::LoanIntent, {
        Education => "education",
        Medical => "medical",
        Venture => "venture",
        Personal => "personal",
        DebtConsolidation => "debt_consolidation",
        HomeImprovement => "home_improvement",
    }
);

categorical!(
    /// Whether a previous loan default is on file.
    PreviousDefault => FeatureName::PreviousLoanDefaultsOnFile, {
        Yes => "yes",
        No => "no",
    }
);

/// Raw form submission before validation. Every field may be absent or left at its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
    #[serde(default, rename = "person_age", alias = "age")]
    pub age: Option<u32>,
    #[serde(
        default,
        rename = "person_gender",
        alias = "gender",
        deserialize_with = "empty_string_as_none"
    )]
    pub gender: Option<String>,
    #[serde(
        default,
        rename = "person_education",
        alias = "education",
        deserialize_with = "empty_string_as_none"
    )]
    pub education: Option<String>,
    #[serde(default, rename = "person_income", alias = "annual_income")]
    pub annual_income: Option<f64>,
    #[serde(default, rename = "person_emp_exp", alias = "employment_years")]
    pub employment_years: Option<u32>,
    #[serde(
        default,
        rename = "person_home_ownership",
        alias = "home_ownership",
        deserialize_with = "empty_string_as_none"
    )]
    pub home_ownership: Option<String>,
    #[serde(default, rename = "loan_amnt", alias = "loan_amount")]
    pub loan_amount: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub loan_intent: Option<String>,
    #[serde(default, rename = "loan_int_rate", alias = "loan_interest_rate")]
    pub loan_interest_rate: Option<f64>,
    /// Advisory value shown by the form; always recomputed during normalization.
    #[serde(default)]
    pub loan_percent_income: Option<f64>,
    #[serde(
        default,
        rename = "cb_person_cred_hist_length",
        alias = "credit_history_length"
    )]
    pub credit_history_length: Option<u32>,
    #[serde(default)]
    pub credit_score: Option<u32>,
    #[serde(
        default,
        rename = "previous_loan_defaults_on_file",
        alias = "previous_default",
        deserialize_with = "empty_string_as_none"
    )]
    pub previous_default: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// The normalized, schema-aligned applicant record handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u8,
    pub gender: Gender,
    pub education: Education,
    pub annual_income: f64,
    pub employment_years: u8,
    pub home_ownership: HomeOwnership,
    pub loan_amount: f64,
    pub loan_intent: LoanIntent,
    pub loan_interest_rate: f64,
    pub loan_percent_income: f64,
    pub credit_history_length: Option<u8>,
    pub credit_score: Option<u16>,
    pub previous_default: PreviousDefault,
}

/// Interpreted classifier output for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub approved: bool,
    pub confidence: f64,
}

/// Binary class emitted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLabel {
    Rejected,
    Approved,
}

impl ClassLabel {
    /// Index of this class in a `[p0, p1]` probability pair.
    pub const fn index(self) -> usize {
        match self {
            ClassLabel::Rejected => 0,
            ClassLabel::Approved => 1,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::Rejected),
            1 => Some(ClassLabel::Approved),
            _ => None,
        }
    }
}
