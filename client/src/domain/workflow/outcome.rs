//! Terminal outcomes and the transition table between steps.

use std::fmt;

use super::step::{FailureKind, SkipReason, StepOutcome, StepPayload, WorkflowStep};
use crate::domain::Capability;

/// Why a run stopped before creating an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Discovery failed, so no capability could be used.
    NoCapabilities,
    /// A gating capability was not granted.
    MissingCapability(Capability),
    /// A gated step's call or decoding failed.
    StepFailed {
        /// Step that failed.
        step: WorkflowStep,
        /// Failure category.
        kind: FailureKind,
    },
    /// The last name catalogue was empty.
    NoLastNames,
    /// The name was taken or `create_user` was not granted.
    NameUnavailableOrMissingCapability,
}

impl AbortReason {
    /// Stable reason code.
    ///
    /// # Examples
    /// ```
    /// use registration_client::domain::{AbortReason, Capability};
    ///
    /// let reason = AbortReason::MissingCapability(Capability::GetLastNames);
    /// assert_eq!(reason.code(), "missing-capability");
    /// assert_eq!(reason.to_string(), "missing-capability: get_last_names");
    /// ```
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoCapabilities => "no-capabilities",
            Self::MissingCapability(_) => "missing-capability",
            Self::StepFailed { kind, .. } => kind.code(),
            Self::NoLastNames => "no-last-names",
            Self::NameUnavailableOrMissingCapability => "name-unavailable-or-missing-capability",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCapability(capability) => write!(f, "{}: {capability}", self.code()),
            Self::StepFailed { step, .. } => write!(f, "{} during {step}", self.code()),
            _ => f.write_str(self.code()),
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The account was created.
    Completed {
        /// Identifier of the new agent.
        agent_id: String,
    },
    /// The run stopped early.
    Aborted(AbortReason),
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { agent_id } => write!(f, "completed: {agent_id}"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Decision taken after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Run the given step next.
    Next(WorkflowStep),
    /// Stop with the given outcome.
    Finish(TerminalOutcome),
}

/// Decide what follows `outcome` of `step`.
///
/// The error code step always continues. Discovery failures finish with
/// [`AbortReason::NoCapabilities`]. Any skip or failure of a gated step
/// finishes the run; the create-user gate reports both of its skips as
/// [`AbortReason::NameUnavailableOrMissingCapability`].
///
/// # Examples
/// ```
/// use registration_client::domain::{
///     AbortReason, Capability, Flow, SkipReason, StepOutcome, TerminalOutcome, WorkflowStep,
///     next_flow,
/// };
///
/// let skipped = StepOutcome::Skipped(SkipReason::MissingCapability(Capability::GetErrorCodes));
/// assert_eq!(
///     next_flow(WorkflowStep::ErrorCodes, &skipped),
///     Flow::Next(WorkflowStep::LastNames)
/// );
/// ```
#[must_use]
pub fn next_flow(step: WorkflowStep, outcome: &StepOutcome) -> Flow {
    match (step, outcome) {
        (WorkflowStep::ErrorCodes, _) => advance(step),
        (WorkflowStep::DirectoryFetch, StepOutcome::Succeeded(_)) => advance(step),
        (WorkflowStep::DirectoryFetch, _) => abort(AbortReason::NoCapabilities),
        (
            WorkflowStep::CreateUser,
            StepOutcome::Succeeded(StepPayload::AccountCreated { agent_id }),
        ) => Flow::Finish(TerminalOutcome::Completed {
            agent_id: agent_id.clone(),
        }),
        (WorkflowStep::CreateUser, StepOutcome::Skipped(_)) => {
            abort(AbortReason::NameUnavailableOrMissingCapability)
        }
        (_, StepOutcome::Skipped(SkipReason::MissingCapability(capability))) => {
            abort(AbortReason::MissingCapability(*capability))
        }
        (_, StepOutcome::Skipped(SkipReason::NoLastNamesOffered)) => {
            abort(AbortReason::NoLastNames)
        }
        (_, StepOutcome::Skipped(SkipReason::NameUnavailable)) => {
            abort(AbortReason::NameUnavailableOrMissingCapability)
        }
        (_, StepOutcome::Failed(failure)) => abort(AbortReason::StepFailed {
            step,
            kind: failure.kind,
        }),
        (_, StepOutcome::Succeeded(_)) => advance(step),
    }
}

/// A success with no following step only happens on create-user without an
/// agent id, which is a decoding problem.
fn advance(step: WorkflowStep) -> Flow {
    step.next().map_or_else(
        || {
            abort(AbortReason::StepFailed {
                step,
                kind: FailureKind::Decode,
            })
        },
        Flow::Next,
    )
}

const fn abort(reason: AbortReason) -> Flow {
    Flow::Finish(TerminalOutcome::Aborted(reason))
}
