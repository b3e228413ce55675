use crate::infra::load_service;
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::workflows::loan_approval::{
    BatchReport, BatchScorer, RawApplication, SchemaView,
};
use std::path::PathBuf;

/// Form fields accepted on the command line. Omitted flags are treated as unfilled inputs.
#[derive(Args, Debug, Default)]
pub(crate) struct ApplicantArgs {
    #[arg(long)]
    pub(crate) age: Option<u32>,
    #[arg(long)]
    pub(crate) gender: Option<String>,
    #[arg(long)]
    pub(crate) education: Option<String>,
    #[arg(long)]
    pub(crate) annual_income: Option<f64>,
    #[arg(long)]
    pub(crate) employment_years: Option<u32>,
    #[arg(long)]
    pub(crate) home_ownership: Option<String>,
    #[arg(long)]
    pub(crate) loan_amount: Option<f64>,
    #[arg(long)]
    pub(crate) loan_intent: Option<String>,
    #[arg(long)]
    pub(crate) loan_interest_rate: Option<f64>,
    #[arg(long)]
    pub(crate) credit_history_length: Option<u32>,
    #[arg(long)]
    pub(crate) credit_score: Option<u32>,
    /// Previous loan default on file (yes/no)
    #[arg(long)]
    pub(crate) previous_default: Option<String>,
}

impl ApplicantArgs {
    pub(crate) fn into_raw(self) -> RawApplication {
        RawApplication {
            age: self.age,
            gender: self.gender,
            education: self.education,
            annual_income: self.annual_income,
            employment_years: self.employment_years,
            home_ownership: self.home_ownership,
            loan_amount: self.loan_amount,
            loan_intent: self.loan_intent,
            loan_interest_rate: self.loan_interest_rate,
            loan_percent_income: None,
            credit_history_length: self.credit_history_length,
            credit_score: self.credit_score,
            previous_default: self.previous_default,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[command(flatten)]
    pub(crate) applicant: ApplicantArgs,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the full assessment as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Applicant CSV export with canonical feature headers
    pub(crate) csv: PathBuf,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the report as JSON instead of a summary table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SchemaArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.model.as_deref())?;
    let raw = args.applicant.into_raw();

    match service.assess(&raw) {
        Ok(assessment) if args.json => print_json(&assessment),
        Ok(assessment) => {
            println!("{}", assessment.message);
            println!(
                "- model {} | loan-to-income {:.2} | evaluated {}",
                assessment.model_version,
                assessment.record.loan_percent_income,
                assessment.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }
        Err(err) => match err.as_warning() {
            Some(warning) => {
                println!("{}", warning.message());
                Ok(())
            }
            None => Err(err.into()),
        },
    }
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.model.as_deref())?;
    let report = BatchScorer::from_path(service.as_ref(), &args.csv)?;

    if args.json {
        return print_json(&report);
    }
    render_batch_report(&report);
    Ok(())
}

pub(crate) fn run_schema(args: SchemaArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.model.as_deref())?;
    render_schema(&service.schema());
    Ok(())
}

fn render_batch_report(report: &BatchReport) {
    println!("Batch scoring with model {}", report.model_version);
    for entry in &report.entries {
        match (&entry.verdict, &entry.error) {
            (Some(verdict), _) => println!("  row {:>4}: {}", entry.row, verdict.message()),
            (None, Some(error)) => println!("  row {:>4}: error: {}", entry.row, error),
            (None, None) => {}
        }
    }
    let summary = &report.summary;
    println!(
        "- {} rows | {} approved | {} rejected | {} incomplete | {} failed",
        summary.total(),
        summary.approved,
        summary.rejected,
        summary.incomplete,
        summary.failed
    );
}

fn render_schema(schema: &SchemaView) {
    println!(
        "Model {} (vocabulary {})",
        schema.model_version, schema.vocabulary_version
    );
    println!("Classifier features, in order:");
    for (index, feature) in schema.classifier_features.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, feature);
    }
    println!(
        "Form policy: credit score {} | credit history {}",
        collected(schema.policy.collect_credit_score),
        collected(schema.policy.collect_credit_history)
    );
    println!("Vocabulary:");
    for entry in &schema.vocabulary {
        println!("  - {} / {} -> {}", entry.feature, entry.label, entry.token);
    }
}

fn collected(flag: bool) -> &'static str {
    if flag {
        "collected"
    } else {
        "not collected"
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
