//! Capability-gated registration workflow.
//!
//! A run walks [`WorkflowStep::ORDER`] one step at a time. Each step checks
//! its capability before calling it, reports what it saw, and [`next_flow`]
//! decides whether the run continues. The run owns its directory and
//! candidate; nothing outlives it.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    PayloadCodec, RegistrationReporter, RegistrationTransport, StepReport, UsernameGenerator,
};
use crate::domain::{CapabilityDirectory, Credentials, RegistrationCandidate};

mod execute;
mod outcome;
mod runtime;
mod step;

pub use outcome::{AbortReason, Flow, TerminalOutcome, next_flow};
pub use runtime::{
    DEFAULT_USERNAME_PREFIX, DEFAULT_USERNAME_SUFFIXES, RandomUsernameGenerator,
    UsernameGeneratorError,
};
pub use step::{
    FailureKind, SkipReason, StepFailure, StepOutcome, StepPayload, StepRecord, WorkflowStep,
};

/// Default discovery endpoint.
pub const DEFAULT_DISCOVERY_URL: &str = "https://cap.secondlife.com/get_reg_capabilities";
/// Default domain of derived email addresses.
pub const DEFAULT_EMAIL_DOMAIN: &str = "ben.com";
/// Default placeholder password for created accounts.
pub const DEFAULT_ACCOUNT_PASSWORD: &str = "123123abc";

/// Values the workflow needs beyond the operator credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationWorkflowConfig {
    /// URL the credentials are posted to for capability discovery.
    pub discovery_url: String,
    /// Domain appended to the username to form the email address.
    pub email_domain: String,
    /// Password given to the created account.
    pub account_password: Zeroizing<String>,
    /// Date of birth given to the created account.
    pub date_of_birth: NaiveDate,
    /// Region the created account starts in, when set.
    pub start_region_name: Option<String>,
}

impl RegistrationWorkflowConfig {
    /// Default placeholder date of birth, 1980-01-01.
    #[must_use]
    pub fn default_date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl Default for RegistrationWorkflowConfig {
    fn default() -> Self {
        Self {
            discovery_url: DEFAULT_DISCOVERY_URL.to_owned(),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_owned(),
            account_password: Zeroizing::new(DEFAULT_ACCOUNT_PASSWORD.to_owned()),
            date_of_birth: Self::default_date_of_birth(),
            start_region_name: None,
        }
    }
}

impl fmt::Debug for RegistrationWorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationWorkflowConfig")
            .field("discovery_url", &self.discovery_url)
            .field("email_domain", &self.email_domain)
            .field("account_password", &"<redacted>")
            .field("date_of_birth", &self.date_of_birth)
            .field("start_region_name", &self.start_region_name)
            .finish()
    }
}

/// Port bundle required by the workflow.
pub struct RegistrationWorkflowPorts {
    /// Outbound request/response adapter.
    pub transport: Arc<dyn RegistrationTransport>,
    /// Wire codec for payloads.
    pub codec: Arc<dyn PayloadCodec>,
    /// Progress sink.
    pub reporter: Arc<dyn RegistrationReporter>,
    /// Source of candidate usernames.
    pub usernames: Arc<dyn UsernameGenerator>,
}

impl RegistrationWorkflowPorts {
    /// Build a strongly-typed port bundle.
    pub fn new(
        transport: Arc<dyn RegistrationTransport>,
        codec: Arc<dyn PayloadCodec>,
        reporter: Arc<dyn RegistrationReporter>,
        usernames: Arc<dyn UsernameGenerator>,
    ) -> Self {
        Self {
            transport,
            codec,
            reporter,
            usernames,
        }
    }
}

/// Everything observed during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRun {
    /// Steps that ran, in order.
    pub steps: Vec<StepRecord>,
    /// Terminal outcome.
    pub outcome: TerminalOutcome,
    /// Candidate built by the name check, when it got that far.
    pub candidate: Option<RegistrationCandidate>,
}

impl RegistrationRun {
    /// Outcome recorded for `step`, if it ran.
    #[must_use]
    pub fn outcome_of(&self, step: WorkflowStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }
}

/// State owned by one run and threaded through the steps.
#[derive(Debug, Default)]
struct WorkflowContext {
    directory: CapabilityDirectory,
    last_name_id: Option<String>,
    name_available: bool,
    candidate: Option<RegistrationCandidate>,
}

/// Result of executing one step, before it is reported.
#[derive(Debug)]
struct StepExecution {
    outcome: StepOutcome,
    request: Option<Vec<u8>>,
    response: Option<Vec<u8>>,
}

impl StepExecution {
    const fn bare(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            request: None,
            response: None,
        }
    }
}

/// Domain-owned registration workflow.
pub struct RegistrationWorkflow {
    transport: Arc<dyn RegistrationTransport>,
    codec: Arc<dyn PayloadCodec>,
    reporter: Arc<dyn RegistrationReporter>,
    usernames: Arc<dyn UsernameGenerator>,
    config: RegistrationWorkflowConfig,
}

impl RegistrationWorkflow {
    /// Build a workflow from its ports and configuration.
    pub fn new(ports: RegistrationWorkflowPorts, config: RegistrationWorkflowConfig) -> Self {
        Self {
            transport: ports.transport,
            codec: ports.codec,
            reporter: ports.reporter,
            usernames: ports.usernames,
            config,
        }
    }

    /// Run every step for `credentials` until a terminal outcome is reached.
    ///
    /// Steps run strictly one after another. Failures become outcomes; the
    /// method itself never fails.
    pub async fn run(&self, credentials: &Credentials) -> RegistrationRun {
        let mut context = WorkflowContext::default();
        let mut steps = Vec::with_capacity(WorkflowStep::ORDER.len());
        let mut step = WorkflowStep::DirectoryFetch;

        let outcome = loop {
            info!(step = %step, "running registration step");
            let execution = self.execute(step, credentials, &mut context).await;
            self.reporter.step(&StepReport {
                step,
                request: execution.request.as_deref(),
                response: execution.response.as_deref(),
                outcome: &execution.outcome,
            });

            let flow = next_flow(step, &execution.outcome);
            steps.push(StepRecord {
                step,
                outcome: execution.outcome,
            });
            match flow {
                Flow::Next(following) => step = following,
                Flow::Finish(terminal) => break terminal,
            }
        };

        match &outcome {
            TerminalOutcome::Completed { agent_id } => {
                info!(agent_id = %agent_id, "registration completed");
            }
            TerminalOutcome::Aborted(reason) => {
                warn!(reason = reason.code(), detail = %reason, "registration aborted");
            }
        }
        self.reporter.outcome(&outcome);

        RegistrationRun {
            steps,
            outcome,
            candidate: context.candidate,
        }
    }
}
