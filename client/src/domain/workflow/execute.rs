//! Step executors.
//!
//! Every executor checks its gate before touching the transport and turns
//! transport, codec, and shape errors into [`StepOutcome::Failed`].

use llsd::{LlsdMap, LlsdValue};
use tracing::{debug, warn};

use super::step::{FailureKind, SkipReason, StepFailure, StepOutcome, StepPayload, WorkflowStep};
use super::{RegistrationWorkflow, StepExecution, WorkflowContext};
use crate::domain::ports::{OutboundBody, PayloadCodecError, RegistrationTransportError};
use crate::domain::{
    AccountDetails, CapabilityDirectory, Credentials, ErrorCodeTable, LastNameCatalog,
    RegistrationCandidate,
};

fn transport_failure(error: &RegistrationTransportError) -> StepFailure {
    StepFailure::new(FailureKind::Transport, error.to_string())
}

fn codec_failure(error: &PayloadCodecError) -> StepFailure {
    let kind = match error {
        PayloadCodecError::Encode { .. } => FailureKind::Encode,
        PayloadCodecError::Decode { .. } => FailureKind::Decode,
    };
    StepFailure::new(kind, error.to_string())
}

fn decode_failure(message: impl Into<String>) -> StepFailure {
    StepFailure::new(FailureKind::Decode, message)
}

/// Read the name check answer: an LLSD boolean or its textual form.
fn availability(value: &LlsdValue) -> Result<bool, StepFailure> {
    match value {
        LlsdValue::Boolean(flag) => Ok(*flag),
        LlsdValue::String(text) if text == "true" => Ok(true),
        LlsdValue::String(text) if text == "false" => Ok(false),
        other => Err(decode_failure(format!(
            "check_name response should be a boolean, found {}",
            other.type_name()
        ))),
    }
}

/// Read the identifier of the created agent.
fn agent_id(value: &LlsdValue) -> Result<String, StepFailure> {
    let map = value.as_map().ok_or_else(|| {
        decode_failure(format!(
            "create_user response should be a map, found {}",
            value.type_name()
        ))
    })?;
    match map.get("agent_id") {
        Some(LlsdValue::Uuid(id)) => Ok(id.hyphenated().to_string()),
        Some(LlsdValue::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(other) => Err(decode_failure(format!(
            "agent_id should be a uuid or string, found {}",
            other.type_name()
        ))),
        None => Err(decode_failure("create_user response has no agent_id")),
    }
}

impl RegistrationWorkflow {
    pub(super) async fn execute(
        &self,
        step: WorkflowStep,
        credentials: &Credentials,
        context: &mut WorkflowContext,
    ) -> StepExecution {
        match step {
            WorkflowStep::DirectoryFetch => self.fetch_directory(credentials, context).await,
            WorkflowStep::ErrorCodes => self.fetch_error_codes(context).await,
            WorkflowStep::LastNames => self.fetch_last_names(context).await,
            WorkflowStep::CheckName => self.check_name(context).await,
            WorkflowStep::CreateUser => self.create_user(context).await,
        }
    }

    async fn fetch_directory(
        &self,
        credentials: &Credentials,
        context: &mut WorkflowContext,
    ) -> StepExecution {
        let body = OutboundBody::form([
            ("first_name", credentials.first_name()),
            ("last_name", credentials.last_name()),
            ("password", credentials.password()),
        ]);
        let response = match self.transport.post(&self.config.discovery_url, &body).await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(
                    url = %self.config.discovery_url,
                    error = %error,
                    "capability discovery failed"
                );
                return StepExecution::bare(StepOutcome::Failed(transport_failure(&error)));
            }
        };

        let decoded = self.decode(&response).and_then(|value| {
            CapabilityDirectory::from_llsd(&value)
                .map_err(|error| decode_failure(error.to_string()))
        });
        let outcome = match decoded {
            Ok(directory) => {
                debug!(
                    capabilities = directory.len(),
                    "capability directory fetched"
                );
                context.directory = directory.clone();
                StepOutcome::Succeeded(StepPayload::Directory(directory))
            }
            Err(failure) => StepOutcome::Failed(failure),
        };
        StepExecution {
            outcome,
            request: None,
            response: Some(response),
        }
    }

    async fn fetch_error_codes(&self, context: &WorkflowContext) -> StepExecution {
        let url = match self.step_url(&context.directory, WorkflowStep::ErrorCodes) {
            Ok(url) => url,
            Err(skip) => return skip,
        };
        self.fetch(url, |value| {
            ErrorCodeTable::from_llsd(value)
                .map(StepPayload::ErrorCodes)
                .map_err(|error| decode_failure(error.to_string()))
        })
        .await
    }

    async fn fetch_last_names(&self, context: &mut WorkflowContext) -> StepExecution {
        let url = match self.step_url(&context.directory, WorkflowStep::LastNames) {
            Ok(url) => url,
            Err(skip) => return skip,
        };
        let execution = self
            .fetch(url, |value| {
                LastNameCatalog::from_llsd(value)
                    .map(StepPayload::LastNames)
                    .map_err(|error| decode_failure(error.to_string()))
            })
            .await;

        if let StepOutcome::Succeeded(StepPayload::LastNames(catalog)) = &execution.outcome {
            context.last_name_id = catalog.first_available().map(|entry| entry.id.clone());
            debug!(
                offered = catalog.len(),
                selected = context.last_name_id.as_deref().unwrap_or_default(),
                "last name catalogue fetched"
            );
        }
        execution
    }

    async fn check_name(&self, context: &mut WorkflowContext) -> StepExecution {
        let url = match self.step_url(&context.directory, WorkflowStep::CheckName) {
            Ok(url) => url,
            Err(skip) => return skip,
        };
        let Some(last_name_id) = context.last_name_id.clone() else {
            return StepExecution::bare(StepOutcome::Skipped(SkipReason::NoLastNamesOffered));
        };

        let candidate = RegistrationCandidate::new(self.usernames.generate(), last_name_id);
        let payload = candidate.check_name_payload();
        let username = candidate.username().to_string();
        let last_name_id = candidate.last_name_id().to_owned();
        context.candidate = Some(candidate);

        let execution = self
            .submit(url, &payload, |value| {
                availability(value).map(|available| StepPayload::NameChecked {
                    username: username.clone(),
                    last_name_id: last_name_id.clone(),
                    available,
                })
            })
            .await;

        if let StepOutcome::Succeeded(StepPayload::NameChecked { available, .. }) =
            &execution.outcome
        {
            context.name_available = *available;
            debug!(username = %username, available = *available, "name checked");
        }
        execution
    }

    async fn create_user(&self, context: &mut WorkflowContext) -> StepExecution {
        if !context.name_available {
            return StepExecution::bare(StepOutcome::Skipped(SkipReason::NameUnavailable));
        }
        let url = match self.step_url(&context.directory, WorkflowStep::CreateUser) {
            Ok(url) => url,
            Err(skip) => return skip,
        };
        let Some(candidate) = context.candidate.as_mut() else {
            return StepExecution::bare(StepOutcome::Skipped(SkipReason::NameUnavailable));
        };

        let details = AccountDetails::derive(candidate.username(), &self.config);
        let payload = match candidate
            .attach_account(details)
            .and_then(|()| candidate.create_user_payload())
        {
            Ok(payload) => payload,
            Err(error) => {
                return StepExecution::bare(StepOutcome::Failed(StepFailure::new(
                    FailureKind::Encode,
                    error.to_string(),
                )));
            }
        };

        self.submit(url, &payload, |value| {
            agent_id(value).map(|agent_id| StepPayload::AccountCreated { agent_id })
        })
        .await
    }

    /// URL `step` talks to, or the skip to report when its capability was
    /// not granted.
    fn step_url<'a>(
        &'a self,
        directory: &'a CapabilityDirectory,
        step: WorkflowStep,
    ) -> Result<&'a str, StepExecution> {
        let Some(capability) = step.capability() else {
            return Ok(self.config.discovery_url.as_str());
        };
        directory.url_for(capability).map_err(|_| {
            debug!(step = step.as_str(), capability = %capability, "capability not granted");
            StepExecution::bare(StepOutcome::Skipped(SkipReason::MissingCapability(capability)))
        })
    }

    /// GET `url` and interpret the decoded body.
    async fn fetch(
        &self,
        url: &str,
        read: impl FnOnce(&LlsdValue) -> Result<StepPayload, StepFailure>,
    ) -> StepExecution {
        match self.transport.get(url).await {
            Ok(response) => self.interpret(None, response, read),
            Err(error) => {
                warn!(url = %url, error = %error, "capability request failed");
                StepExecution::bare(StepOutcome::Failed(transport_failure(&error)))
            }
        }
    }

    /// POST `payload` to `url` and interpret the decoded body.
    async fn submit(
        &self,
        url: &str,
        payload: &LlsdMap,
        read: impl FnOnce(&LlsdValue) -> Result<StepPayload, StepFailure>,
    ) -> StepExecution {
        let bytes = match self.codec.encode(payload) {
            Ok(bytes) => bytes,
            Err(error) => return StepExecution::bare(StepOutcome::Failed(codec_failure(&error))),
        };
        let body = OutboundBody::Payload {
            content_type: self.codec.content_type(),
            bytes,
        };

        match self.transport.post(url, &body).await {
            Ok(response) => self.interpret(Some(body.as_bytes().to_vec()), response, read),
            Err(error) => {
                warn!(url = %url, error = %error, "capability request failed");
                StepExecution {
                    outcome: StepOutcome::Failed(transport_failure(&error)),
                    request: Some(body.as_bytes().to_vec()),
                    response: None,
                }
            }
        }
    }

    fn interpret(
        &self,
        request: Option<Vec<u8>>,
        response: Vec<u8>,
        read: impl FnOnce(&LlsdValue) -> Result<StepPayload, StepFailure>,
    ) -> StepExecution {
        let outcome = match self.decode(&response).and_then(|value| read(&value)) {
            Ok(payload) => StepOutcome::Succeeded(payload),
            Err(failure) => StepOutcome::Failed(failure),
        };
        StepExecution {
            outcome,
            request,
            response: Some(response),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<LlsdValue, StepFailure> {
        self.codec
            .decode(bytes)
            .map_err(|error| codec_failure(&error))
    }
}

#[cfg(test)]
mod tests {
    //! Response interpretation helpers.

    use super::*;
    use llsd::LlsdMap;
    use rstest::rstest;

    fn uuid_value(text: &str) -> LlsdValue {
        llsd::from_xml_str(&format!("<llsd><uuid>{text}</uuid></llsd>"))
            .expect("uuid document decodes")
    }

    #[rstest]
    #[case(LlsdValue::Boolean(true), true)]
    #[case(LlsdValue::Boolean(false), false)]
    #[case(LlsdValue::from("true"), true)]
    #[case(LlsdValue::from("false"), false)]
    fn availability_accepts_booleans(#[case] value: LlsdValue, #[case] expected: bool) {
        assert_eq!(availability(&value), Ok(expected));
    }

    #[rstest]
    #[case(LlsdValue::Integer(1))]
    #[case(LlsdValue::from("yes"))]
    #[case(LlsdValue::Undef)]
    fn availability_rejects_other_values(#[case] value: LlsdValue) {
        let failure = availability(&value).expect_err("value must be rejected");
        assert_eq!(failure.kind, FailureKind::Decode);
    }

    #[test]
    fn agent_id_reads_uuid_and_string_values() {
        let id = "a2e76fcd-9360-4f6d-a924-938f923df11a";
        let from_uuid: LlsdMap = [("agent_id", uuid_value(id))].into_iter().collect();
        let from_string: LlsdMap = [("agent_id", id)].into_iter().collect();

        assert_eq!(agent_id(&LlsdValue::Map(from_uuid)), Ok(id.to_owned()));
        assert_eq!(agent_id(&LlsdValue::Map(from_string)), Ok(id.to_owned()));
    }

    fn agent_map(value: impl Into<LlsdValue>) -> LlsdValue {
        LlsdValue::Map([("agent_id", value)].into_iter().collect())
    }

    #[rstest]
    #[case::no_agent_id(LlsdValue::Map(LlsdMap::new()))]
    #[case::blank_agent_id(agent_map(""))]
    #[case::numeric_agent_id(agent_map(LlsdValue::Integer(5)))]
    #[case::bare_string(LlsdValue::from("a2e76fcd"))]
    fn agent_id_rejects_missing_or_malformed_values(#[case] value: LlsdValue) {
        let failure = agent_id(&value).expect_err("value must be rejected");
        assert_eq!(failure.kind, FailureKind::Decode);
    }
}
