//! Loan approval form intake: schema normalization, classifier interpretation, and the
//! ambient configuration, telemetry, and error plumbing shared by the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
