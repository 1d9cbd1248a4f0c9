//! Domain model and the registration workflow.
//!
//! Types here are transport agnostic. Adapters reach the domain through the
//! traits in [`ports`].

pub mod ports;

mod candidate;
mod capabilities;
mod catalogs;
mod credentials;
mod workflow;

pub use candidate::{AccountDetails, CandidateError, RegistrationCandidate, Username};
pub use capabilities::{Capability, CapabilityDirectory, CapabilityDirectoryError};
pub use catalogs::{
    CatalogShapeError, ErrorCodeEntry, ErrorCodeTable, LastNameCatalog, LastNameEntry,
};
pub use credentials::{Credentials, CredentialsError};
pub use workflow::{
    AbortReason, DEFAULT_ACCOUNT_PASSWORD, DEFAULT_DISCOVERY_URL, DEFAULT_EMAIL_DOMAIN,
    DEFAULT_USERNAME_PREFIX, DEFAULT_USERNAME_SUFFIXES, FailureKind, Flow, RandomUsernameGenerator,
    RegistrationRun, RegistrationWorkflow, RegistrationWorkflowConfig, RegistrationWorkflowPorts,
    SkipReason, StepFailure, StepOutcome, StepPayload, StepRecord, TerminalOutcome,
    UsernameGeneratorError, WorkflowStep, next_flow,
};
