//! Driven port receiving per-step observations and the terminal outcome.
//!
//! Reporting is one-way: implementations swallow their own failures so the
//! workflow never branches on them.

use crate::domain::{StepOutcome, TerminalOutcome, WorkflowStep};

/// Observation of one executed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport<'a> {
    /// Step that ran.
    pub step: WorkflowStep,
    /// Encoded request body, when the step posted one that may be shown.
    pub request: Option<&'a [u8]>,
    /// Raw response body, when one arrived.
    pub response: Option<&'a [u8]>,
    /// Decoded result of the step.
    pub outcome: &'a StepOutcome,
}

/// Port rendering workflow progress for an operator.
pub trait RegistrationReporter: Send + Sync {
    /// Observe one step after it ran.
    fn step(&self, report: &StepReport<'_>);

    /// Observe the terminal outcome.
    fn outcome(&self, outcome: &TerminalOutcome);
}
