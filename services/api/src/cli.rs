use crate::demo::{run_demo, DemoArgs};
use crate::scoring::{run_assess, run_batch, run_schema, AssessArgs, BatchArgs, SchemaArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval Predictor",
    about = "Score loan applications against the trained approval classifier",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single application described by command-line flags
    Assess(AssessArgs),
    /// Score every row of an applicant CSV export
    Batch(BatchArgs),
    /// Print the classifier feature list and vocabulary table
    Schema(SchemaArgs),
    /// Walk the sample scenarios through an interactive form session
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Schema(args) => run_schema(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["loan-approval-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_assess_flags() {
        let cli = Cli::try_parse_from([
            "loan-approval-api",
            "assess",
            "--age",
            "30",
            "--gender",
            "Male",
            "--annual-income",
            "50000",
            "--previous-default",
            "No",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Assess(args)) => {
                let raw = args.applicant.into_raw();
                assert_eq!(raw.age, Some(30));
                assert_eq!(raw.gender.as_deref(), Some("Male"));
                assert_eq!(raw.annual_income, Some(50_000.0));
                assert_eq!(raw.loan_amount, None);
            }
            other => panic!("expected assess, got {other:?}"),
        }
    }

    #[test]
    fn batch_requires_a_csv_path() {
        assert!(Cli::try_parse_from(["loan-approval-api", "batch"]).is_err());
        let cli = Cli::try_parse_from(["loan-approval-api", "batch", "applicants.csv", "--json"])
            .expect("parses");
        match cli.command {
            Some(Command::Batch(args)) => {
                assert_eq!(args.csv, PathBuf::from("applicants.csv"));
                assert!(args.json);
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }
}
