use crate::infra::load_service;
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::workflows::loan_approval::{
    derive_loan_percent_income, Classifier, FormSession, RawApplication, SessionState,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

/// Sample submissions covering a complete form, a zero income, and an unselected dropdown.
pub(crate) fn demo_scenarios() -> Vec<(&'static str, RawApplication)> {
    let complete = RawApplication {
        age: Some(30),
        gender: Some("Male".to_string()),
        education: Some("Bachelor".to_string()),
        annual_income: Some(50_000.0),
        employment_years: None,
        home_ownership: Some("Rent".to_string()),
        loan_amount: Some(10_000.0),
        loan_intent: Some("Education".to_string()),
        loan_interest_rate: Some(12.0),
        loan_percent_income: None,
        credit_history_length: Some(5),
        credit_score: Some(650),
        previous_default: Some("No".to_string()),
    };
    let zero_income = RawApplication {
        annual_income: Some(0.0),
        ..complete.clone()
    };
    let unselected_default = RawApplication {
        previous_default: Some(String::new()),
        ..complete.clone()
    };

    vec![
        ("complete application", complete),
        ("income left at zero", zero_income),
        ("previous default unselected", unselected_default),
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_service(&config, args.model.as_deref())?;
    let mut session = FormSession::new(service.as_ref());

    println!("Loan approval form demo");
    println!(
        "- model {} | vocabulary {}",
        service.classifier().model_version(),
        service.classifier().vocabulary().version()
    );

    for (index, (title, raw)) in demo_scenarios().into_iter().enumerate() {
        let ratio = match (raw.loan_amount, raw.annual_income) {
            (Some(amount), Some(income)) => derive_loan_percent_income(amount, income),
            _ => 0.0,
        };
        println!("\nScenario {} ({title})", index + 1);
        println!("- loan-to-income shown on the form: {ratio:.2}");

        match session.submit(&raw) {
            Ok(verdict) => println!("- {}", verdict.message()),
            Err(err) => println!("- error: {err}"),
        }
        println!("- session state: {}", describe(session.state()));
        session.reset();
    }

    Ok(())
}

fn describe(state: &SessionState) -> &'static str {
    match state {
        SessionState::AwaitingInput { warning: Some(_) } => "awaiting input (warning shown)",
        SessionState::AwaitingInput { warning: None } => "awaiting input",
        SessionState::ResultDisplayed(_) => "result displayed",
    }
}
