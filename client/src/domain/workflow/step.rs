//! Workflow steps and the tagged result each one produces.

use std::fmt;

use crate::domain::{Capability, CapabilityDirectory, ErrorCodeTable, LastNameCatalog};

/// Steps of a registration run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkflowStep {
    /// Fetch the capability directory from the discovery URL.
    DirectoryFetch,
    /// Fetch and report error codes. Never gates later steps.
    ErrorCodes,
    /// Fetch the last name catalogue. Gated on `get_last_names`.
    LastNames,
    /// Check whether the generated name is free. Gated on `check_name`.
    CheckName,
    /// Create the account. Gated on availability and `create_user`.
    CreateUser,
}

impl WorkflowStep {
    /// All steps in execution order.
    pub const ORDER: [Self; 5] = [
        Self::DirectoryFetch,
        Self::ErrorCodes,
        Self::LastNames,
        Self::CheckName,
        Self::CreateUser,
    ];

    /// Step that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::DirectoryFetch => Some(Self::ErrorCodes),
            Self::ErrorCodes => Some(Self::LastNames),
            Self::LastNames => Some(Self::CheckName),
            Self::CheckName => Some(Self::CreateUser),
            Self::CreateUser => None,
        }
    }

    /// Capability the step calls, if it calls one.
    #[must_use]
    pub const fn capability(self) -> Option<Capability> {
        match self {
            Self::DirectoryFetch => None,
            Self::ErrorCodes => Some(Capability::GetErrorCodes),
            Self::LastNames => Some(Capability::GetLastNames),
            Self::CheckName => Some(Capability::CheckName),
            Self::CreateUser => Some(Capability::CreateUser),
        }
    }

    /// Return true for steps whose absence or failure ends the run.
    #[must_use]
    pub const fn is_gating(self) -> bool {
        !matches!(self, Self::ErrorCodes)
    }

    /// Stable snake-case name used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectoryFetch => "directory_fetch",
            Self::ErrorCodes => "error_codes",
            Self::LastNames => "last_names",
            Self::CheckName => "check_name",
            Self::CreateUser => "create_user",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step did not call its capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The step's capability is not in the directory.
    MissingCapability(Capability),
    /// The name check reported the candidate name as taken.
    NameUnavailable,
    /// The last name catalogue was empty, so no candidate could be built.
    NoLastNamesOffered,
}

/// Category of a step failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection failure, timeout, or non-success status.
    Transport,
    /// The request payload could not be built or encoded.
    Encode,
    /// The response could not be decoded into the expected shape.
    Decode,
}

impl FailureKind {
    /// Reason code reported for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Transport => "transport-error",
            Self::Encode => "encode-error",
            Self::Decode => "decode-error",
        }
    }
}

/// A failed step with its category and detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

impl StepFailure {
    /// Build a failure of `kind`.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

/// Decoded product of a successful step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPayload {
    /// Capability directory returned by discovery.
    Directory(CapabilityDirectory),
    /// Published error codes.
    ErrorCodes(ErrorCodeTable),
    /// Last names offered for registration.
    LastNames(LastNameCatalog),
    /// Result of the name availability check.
    NameChecked {
        /// Username that was checked.
        username: String,
        /// Last name identifier that was checked.
        last_name_id: String,
        /// Whether the service reported the pair as free.
        available: bool,
    },
    /// Account created by the service.
    AccountCreated {
        /// Identifier of the new agent.
        agent_id: String,
    },
}

/// Tagged result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did not call its capability.
    Skipped(SkipReason),
    /// The call or its decoding failed.
    Failed(StepFailure),
    /// The call succeeded.
    Succeeded(StepPayload),
}

/// One executed step and its outcome, kept in the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Step that ran.
    pub step: WorkflowStep,
    /// Its outcome.
    pub outcome: StepOutcome,
}
