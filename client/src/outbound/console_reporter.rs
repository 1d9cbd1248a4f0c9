//! Operator-facing console rendering of a registration run.

use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::Mutex;

use tracing::debug;

use crate::domain::ports::{RegistrationReporter, StepReport};
use crate::domain::{SkipReason, StepOutcome, StepPayload, TerminalOutcome, WorkflowStep};

/// Reporter writing human-readable progress to a byte sink.
///
/// Write failures are logged at debug level and otherwise ignored.
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
    account: String,
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Build a reporter writing to `out` on behalf of the `account` label
    /// (usually `"First Last"`).
    pub fn new(out: W, account: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            account: account.into(),
        }
    }

    /// Consume the reporter and return the sink.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, text: &str) {
        let mut guard = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let bytes = text.as_bytes();
        if let Err(error) = guard.write_all(bytes).and_then(|()| guard.flush()) {
            debug!(error = %error, "console report write failed");
        }
    }

    fn render_step(&self, text: &mut String, report: &StepReport<'_>) -> fmt::Result {
        if report.step != WorkflowStep::DirectoryFetch {
            text.push_str("\n\n");
        }
        writeln!(text, "========== {} ===========", banner(report.step))?;
        if let Some(request) = report.request {
            writeln!(text, "posted xml")?;
            writeln!(text, "{}", String::from_utf8_lossy(request))?;
        }
        if let Some(response) = report.response {
            writeln!(text, "xml response:")?;
            writeln!(text, "{}", String::from_utf8_lossy(response))?;
        }

        match report.outcome {
            StepOutcome::Succeeded(payload) => render_payload(text, payload),
            StepOutcome::Skipped(reason) => self.render_skip(text, report.step, *reason),
            StepOutcome::Failed(failure) => writeln!(text, "{} failed ({failure})", report.step),
        }
    }

    fn render_skip(
        &self,
        text: &mut String,
        step: WorkflowStep,
        reason: SkipReason,
    ) -> fmt::Result {
        let account = &self.account;
        match reason {
            SkipReason::MissingCapability(capability) if !step.is_gating() => writeln!(
                text,
                "{capability} capability not granted to {account}. Continuing without it ..."
            ),
            SkipReason::MissingCapability(capability) => writeln!(
                text,
                "{capability} capability not granted to {account}. Now exiting prematurely ..."
            ),
            SkipReason::NameUnavailable => {
                writeln!(text, "Name is not available. Now exiting prematurely ...")
            }
            SkipReason::NoLastNamesOffered => writeln!(
                text,
                "No last names were offered. Now exiting prematurely ..."
            ),
        }
    }
}

const fn banner(step: WorkflowStep) -> &'static str {
    match step {
        WorkflowStep::DirectoryFetch => "Getting capabilities",
        WorkflowStep::ErrorCodes => "Get Error Codes",
        WorkflowStep::LastNames => "Get Last Names",
        WorkflowStep::CheckName => "Check Name",
        WorkflowStep::CreateUser => "Create User",
    }
}

fn render_payload(text: &mut String, payload: &StepPayload) -> fmt::Result {
    match payload {
        StepPayload::Directory(directory) => {
            for (name, url) in directory.iter() {
                writeln!(text, "{name} => {url}")?;
            }
        }
        StepPayload::ErrorCodes(table) => {
            for entry in table.entries() {
                writeln!(text, "{} => {}", entry.code, entry.description)?;
            }
        }
        StepPayload::LastNames(catalog) => {
            for entry in catalog.entries() {
                writeln!(text, "{} => {}", entry.id, entry.name)?;
            }
        }
        StepPayload::NameChecked {
            username,
            available,
            ..
        } => {
            writeln!(text, "Checked name: {username}")?;
            writeln!(text, "Result (is name available?): {available}")?;
        }
        StepPayload::AccountCreated { agent_id } => {
            writeln!(text, "New agent id: {agent_id}")?;
        }
    }
    Ok(())
}

impl<W: Write + Send> RegistrationReporter for ConsoleReporter<W> {
    fn step(&self, report: &StepReport<'_>) {
        let mut text = String::new();
        match self.render_step(&mut text, report) {
            Ok(()) => self.emit(&text),
            Err(error) => {
                debug!(error = %error, step = %report.step, "console report render failed");
            }
        }
    }

    fn outcome(&self, outcome: &TerminalOutcome) {
        let line = match outcome {
            TerminalOutcome::Completed { agent_id } => {
                format!("\nRegistration completed. New agent id: {agent_id}\n")
            }
            TerminalOutcome::Aborted(reason) => {
                format!("\nRegistration aborted ({}): {reason}\n", reason.code())
            }
        };
        self.emit(&line);
    }
}
