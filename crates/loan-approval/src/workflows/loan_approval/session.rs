use super::classifier::Classifier;
use super::domain::RawApplication;
use super::interpreter::Verdict;
use super::service::{LoanApprovalService, LoanServiceError};

/// Form session states. There is no terminal state; every submission starts a new cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    AwaitingInput { warning: Option<Verdict> },
    ResultDisplayed(Verdict),
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::AwaitingInput { .. } => "awaiting_input",
            SessionState::ResultDisplayed(_) => "result_displayed",
        }
    }
}

/// One interactive form session driving submissions through the service.
pub struct FormSession<'a, C: ?Sized> {
    service: &'a LoanApprovalService<C>,
    state: SessionState,
}

impl<'a, C> FormSession<'a, C>
where
    C: Classifier + ?Sized + 'static,
{
    pub fn new(service: &'a LoanApprovalService<C>) -> Self {
        Self {
            service,
            state: SessionState::AwaitingInput { warning: None },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Submit the current form values.
    ///
    /// Complete submissions move the session to `ResultDisplayed`; incomplete ones leave it
    /// awaiting input with a warning. Any other failure leaves the session awaiting input and
    /// is returned to the caller.
    pub fn submit(&mut self, raw: &RawApplication) -> Result<Verdict, LoanServiceError> {
        match self.service.assess(raw) {
            Ok(assessment) => {
                self.state = SessionState::ResultDisplayed(assessment.verdict.clone());
                Ok(assessment.verdict)
            }
            Err(err) => {
                let warning = err.as_warning();
                self.state = SessionState::AwaitingInput {
                    warning: warning.clone(),
                };
                warning.ok_or(err)
            }
        }
    }

    /// Clear the displayed result and wait for the next submission.
    pub fn reset(&mut self) {
        self.state = SessionState::AwaitingInput { warning: None };
    }
}
