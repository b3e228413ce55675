use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::classifier::Classifier;
use super::domain::RawApplication;
use super::interpreter::Verdict;
use super::service::{LoanApprovalService, LoanServiceError};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Scored row from an applicant export. `row` is 1-based, excluding the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub approved: usize,
    pub rejected: usize,
    pub incomplete: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.approved + self.rejected + self.incomplete + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub model_version: String,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

/// Scores applicant exports whose headers use the canonical feature names.
///
/// Rows that fail to parse are reported as failed entries; only an unreadable export aborts.
pub struct BatchScorer;

impl BatchScorer {
    pub fn from_path<C, P>(
        service: &LoanApprovalService<C>,
        path: P,
    ) -> Result<BatchReport, BatchError>
    where
        C: Classifier + ?Sized + 'static,
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(service, file)
    }

    pub fn from_reader<C, R>(
        service: &LoanApprovalService<C>,
        reader: R,
    ) -> Result<BatchReport, BatchError>
    where
        C: Classifier + ?Sized + 'static,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        csv_reader.headers()?;
        let mut entries = Vec::new();
        let mut summary = BatchSummary::default();

        for (index, row) in csv_reader.deserialize::<RawApplication>().enumerate() {
            let entry = match row {
                Ok(raw) => score_row(service, index + 1, &raw, &mut summary),
                Err(err) => {
                    summary.failed += 1;
                    BatchEntry {
                        row: index + 1,
                        verdict: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            entries.push(entry);
        }

        info!(
            rows = summary.total(),
            approved = summary.approved,
            rejected = summary.rejected,
            incomplete = summary.incomplete,
            failed = summary.failed,
            "scored applicant export"
        );

        Ok(BatchReport {
            model_version: service.classifier().model_version().to_string(),
            entries,
            summary,
        })
    }
}

fn score_row<C>(
    service: &LoanApprovalService<C>,
    row: usize,
    raw: &RawApplication,
    summary: &mut BatchSummary,
) -> BatchEntry
where
    C: Classifier + ?Sized + 'static,
{
    let outcome: Result<Verdict, LoanServiceError> = service.verdict(raw);
    match outcome {
        Ok(verdict) => {
            match verdict {
                Verdict::Approved { .. } => summary.approved += 1,
                Verdict::Rejected { .. } => summary.rejected += 1,
                Verdict::IncompleteInput { .. } => summary.incomplete += 1,
            }
            BatchEntry {
                row,
                verdict: Some(verdict),
                error: None,
            }
        }
        Err(err) => {
            summary.failed += 1;
            BatchEntry {
                row,
                verdict: None,
                error: Some(err.to_string()),
            }
        }
    }
}
