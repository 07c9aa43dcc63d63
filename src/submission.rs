use crate::calc_client::{CalcClient, RemoteFailure};
use crate::result_view::{CalculationResult, RawCalculationResult};
use crate::teams::TeamRoster;
use crate::validation::{FieldErrors, MatchForm, MatchInput, validate};

/// Anything that can answer a calculation request.
pub trait CalculationService {
    fn calculate(&self, input: &MatchInput) -> Result<RawCalculationResult, RemoteFailure>;
}

impl CalculationService for CalcClient {
    fn calculate(&self, input: &MatchInput) -> Result<RawCalculationResult, RemoteFailure> {
        CalcClient::calculate(self, input)
    }
}

/// Tag of one accepted submission. Later submissions get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Validation failed; no request was sent.
    Rejected(FieldErrors),
    Completed {
        input: MatchInput,
        result: CalculationResult,
    },
    /// The request was sent but produced no usable result.
    Failed(String),
}

/// Calls the service once and checks the response against its mode.
/// The error is the message to show to the user.
pub fn complete<S: CalculationService + ?Sized>(
    service: &S,
    input: &MatchInput,
) -> Result<CalculationResult, String> {
    let raw = service.calculate(input).map_err(|failure| failure.message)?;
    CalculationResult::try_from(raw).map_err(|err| err.to_string())
}

/// One full attempt: validate, call, check.
pub fn run_submission<S: CalculationService + ?Sized>(
    form: &MatchForm,
    roster: &TeamRoster,
    service: &S,
) -> SubmissionOutcome {
    let input = match validate(form, roster) {
        Ok(input) => input,
        Err(errors) => return SubmissionOutcome::Rejected(errors),
    };
    match complete(service, &input) {
        Ok(result) => SubmissionOutcome::Completed { input, result },
        Err(message) => SubmissionOutcome::Failed(message),
    }
}
