//! Test doubles for the registration ports.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. The
//! module is compiled for tests and when the `test-support` feature is on.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    OutboundBody, RegistrationReporter, RegistrationTransport, RegistrationTransportError,
    StepReport, UsernameGenerator,
};
use crate::domain::{StepOutcome, TerminalOutcome, Username, WorkflowStep};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// HTTP method of a recorded exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET` without a body.
    Get,
    /// `POST` with a body.
    Post,
}

/// One exchange seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Request method.
    pub method: Method,
    /// Target URL.
    pub url: String,
    /// `Content-Type` of the posted body.
    pub content_type: Option<&'static str>,
    /// Posted body bytes.
    pub body: Option<Vec<u8>>,
}

type Reply = Result<Vec<u8>, RegistrationTransportError>;

/// Transport answering from per-URL reply queues.
///
/// A URL with one remaining reply keeps returning it. A URL with no script
/// fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// Create a transport with no scripted routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `url`.
    #[must_use]
    pub fn respond(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.push(url.into(), Ok(body.into()));
        self
    }

    /// Queue a failure for `url`.
    #[must_use]
    pub fn fail(self, url: impl Into<String>, error: RegistrationTransportError) -> Self {
        self.push(url.into(), Err(error));
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        locked(&self.calls).clone()
    }

    /// Number of calls made to `url`.
    #[must_use]
    pub fn call_count(&self, url: &str) -> usize {
        locked(&self.calls)
            .iter()
            .filter(|call| call.url == url)
            .count()
    }

    fn push(&self, url: String, reply: Reply) {
        locked(&self.routes)
            .entry(url)
            .or_default()
            .push_back(reply);
    }

    fn reply(&self, call: RecordedCall) -> Reply {
        let url = call.url.clone();
        locked(&self.calls).push(call);
        let mut routes = locked(&self.routes);
        let scripted = routes.get_mut(&url).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
        scripted.unwrap_or_else(|| {
            Err(RegistrationTransportError::transport(format!(
                "no scripted reply for {url}"
            )))
        })
    }
}

#[async_trait]
impl RegistrationTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RegistrationTransportError> {
        self.reply(RecordedCall {
            method: Method::Get,
            url: url.to_owned(),
            content_type: None,
            body: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        body: &OutboundBody,
    ) -> Result<Vec<u8>, RegistrationTransportError> {
        self.reply(RecordedCall {
            method: Method::Post,
            url: url.to_owned(),
            content_type: Some(body.content_type()),
            body: Some(body.as_bytes().to_vec()),
        })
    }
}

/// Step report captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStep {
    /// Step that ran.
    pub step: WorkflowStep,
    /// Request body shown to the reporter.
    pub request: Option<Vec<u8>>,
    /// Response body shown to the reporter.
    pub response: Option<Vec<u8>>,
    /// Step outcome.
    pub outcome: StepOutcome,
}

/// Reporter keeping everything it is shown.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    steps: Mutex<Vec<RecordedStep>>,
    outcomes: Mutex<Vec<TerminalOutcome>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Step reports in the order received.
    #[must_use]
    pub fn steps(&self) -> Vec<RecordedStep> {
        locked(&self.steps).clone()
    }

    /// Terminal outcomes in the order received.
    #[must_use]
    pub fn outcomes(&self) -> Vec<TerminalOutcome> {
        locked(&self.outcomes).clone()
    }

    /// Return true when any reported body contains `needle`.
    #[must_use]
    pub fn saw_bytes(&self, needle: &[u8]) -> bool {
        locked(&self.steps).iter().any(|recorded| {
            [&recorded.request, &recorded.response]
                .into_iter()
                .flatten()
                .any(|body| body.windows(needle.len()).any(|window| window == needle))
        })
    }
}

impl RegistrationReporter for RecordingReporter {
    fn step(&self, report: &StepReport<'_>) {
        locked(&self.steps).push(RecordedStep {
            step: report.step,
            request: report.request.map(<[u8]>::to_vec),
            response: report.response.map(<[u8]>::to_vec),
            outcome: report.outcome.clone(),
        });
    }

    fn outcome(&self, outcome: &TerminalOutcome) {
        locked(&self.outcomes).push(outcome.clone());
    }
}

/// Username generator that always returns the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUsernameGenerator {
    username: Username,
}

impl FixedUsernameGenerator {
    /// Always generate `prefix` followed by `suffix`.
    #[must_use]
    pub fn new(prefix: &str, suffix: u32) -> Self {
        Self {
            username: Username::new(prefix, suffix),
        }
    }
}

impl UsernameGenerator for FixedUsernameGenerator {
    fn generate(&self) -> Username {
        self.username.clone()
    }
}
