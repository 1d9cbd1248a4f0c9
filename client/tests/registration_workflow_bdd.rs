//! Behaviour-driven tests for the registration workflow.
//!
//! These scenarios walk the operator-visible outcomes: discovery failure,
//! missing capabilities, a taken name, and a completed registration.

use std::sync::Arc;

use llsd::{LlsdMap, LlsdValue};
use registration_client::domain::ports::RegistrationTransportError;
use registration_client::domain::{
    Capability, Credentials, RegistrationRun, RegistrationWorkflow, RegistrationWorkflowConfig,
    RegistrationWorkflowPorts, SkipReason, StepOutcome, TerminalOutcome, WorkflowStep,
};
use registration_client::outbound::LlsdXmlCodec;
use registration_client::test_support::{
    FixedUsernameGenerator, RecordingReporter, ScriptedTransport,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Builder;

const DISCOVERY_URL: &str = "https://login.example/get_reg_capabilities";
const AGENT_ID: &str = "agent-0001";

fn cap_url(name: &str) -> String {
    format!("https://cap.example/{name}")
}

fn xml(value: impl Into<LlsdValue>) -> Vec<u8> {
    llsd::to_xml_bytes(&value.into()).expect("fixture encodes")
}

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

#[derive(Default, ScenarioState)]
struct RegistrationWorld {
    granted: Slot<Vec<String>>,
    discovery_down: Slot<bool>,
    last_name: Slot<String>,
    available: Slot<bool>,
    transport: Slot<Arc<ScriptedTransport>>,
    last_run: Slot<RegistrationRun>,
}

impl RegistrationWorld {
    fn build_transport(&self) -> ScriptedTransport {
        if self.discovery_down.get().unwrap_or(false) {
            return ScriptedTransport::new().fail(
                DISCOVERY_URL,
                RegistrationTransportError::transport("connection refused"),
            );
        }

        let granted = self.granted.get().unwrap_or_default();
        let directory: LlsdMap = granted
            .iter()
            .map(|name| (name.as_str(), LlsdValue::Uri(cap_url(name))))
            .collect();
        let last_name = self.last_name.get().unwrap_or_else(|| "Resident".into());
        let catalog: LlsdMap = [("7", last_name)].into_iter().collect();
        let created: LlsdMap = [("agent_id", AGENT_ID)].into_iter().collect();
        let available = self.available.get().unwrap_or(true);

        ScriptedTransport::new()
            .respond(DISCOVERY_URL, xml(directory))
            .respond(cap_url("get_error_codes"), xml(Vec::<LlsdValue>::new()))
            .respond(cap_url("get_last_names"), xml(catalog))
            .respond(cap_url("check_name"), xml(available))
            .respond(cap_url("create_user"), xml(created))
    }

    fn register(&self, first: &str, last: &str) {
        let transport = Arc::new(self.build_transport());
        let workflow = RegistrationWorkflow::new(
            RegistrationWorkflowPorts::new(
                transport.clone(),
                Arc::new(LlsdXmlCodec),
                Arc::new(RecordingReporter::new()),
                Arc::new(FixedUsernameGenerator::new("benny", 4821)),
            ),
            RegistrationWorkflowConfig {
                discovery_url: DISCOVERY_URL.to_owned(),
                ..RegistrationWorkflowConfig::default()
            },
        );
        let credentials =
            Credentials::try_from_parts(first, last, "operator-secret").expect("valid credentials");
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("create runtime");
        let run = runtime.block_on(workflow.run(&credentials));

        self.transport.set(transport);
        self.last_run.set(run);
    }

    fn run(&self) -> RegistrationRun {
        self.last_run.get().expect("registration should have run")
    }

    fn calls_to(&self, name: &str) -> usize {
        self.transport
            .get()
            .expect("transport should be set")
            .call_count(&cap_url(name))
    }
}

#[fixture]
fn world() -> RegistrationWorld {
    RegistrationWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("the discovery endpoint is unreachable")]
fn the_discovery_endpoint_is_unreachable(world: &RegistrationWorld) {
    world.discovery_down.set(true);
}

#[given("the service grants {names}")]
fn the_service_grants(world: &RegistrationWorld, names: String) {
    let granted = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    world.granted.set(granted);
}

#[given("the last name catalogue offers {name}")]
fn the_last_name_catalogue_offers(world: &RegistrationWorld, name: String) {
    world.last_name.set(name);
}

#[given("the name check answers {answer}")]
fn the_name_check_answers(world: &RegistrationWorld, answer: bool) {
    world.available.set(answer);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the operator registers as {first} {last}")]
fn the_operator_registers_as(world: &RegistrationWorld, first: String, last: String) {
    world.register(&first, &last);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the run aborts with reason {code}")]
fn the_run_aborts_with_reason(world: &RegistrationWorld, code: String) {
    match world.run().outcome {
        TerminalOutcome::Aborted(reason) => assert_eq!(reason.code(), code),
        other => panic!("expected an aborted run, got {other:?}"),
    }
}

#[then("only the discovery endpoint was called")]
fn only_the_discovery_endpoint_was_called(world: &RegistrationWorld) {
    let transport = world.transport.get().expect("transport should be set");
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, DISCOVERY_URL);
}

#[then("{name} was never called")]
fn capability_was_never_called(world: &RegistrationWorld, name: String) {
    assert_eq!(world.calls_to(&name), 0);
}

#[then("the run completes with the new agent id")]
fn the_run_completes_with_the_new_agent_id(world: &RegistrationWorld) {
    assert_eq!(
        world.run().outcome,
        TerminalOutcome::Completed {
            agent_id: AGENT_ID.to_owned(),
        }
    );
}

#[then("the error codes step was skipped")]
fn the_error_codes_step_was_skipped(world: &RegistrationWorld) {
    assert_eq!(
        world.run().outcome_of(WorkflowStep::ErrorCodes),
        Some(&StepOutcome::Skipped(SkipReason::MissingCapability(Capability::GetErrorCodes)))
    );
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/registration_workflow.feature",
    name = "Discovery failure aborts the run"
)]
fn discovery_failure_aborts_the_run(world: RegistrationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/registration_workflow.feature",
    name = "Missing last names capability aborts before the name check"
)]
fn missing_last_names_capability_aborts_before_the_name_check(world: RegistrationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/registration_workflow.feature",
    name = "A taken name never reaches account creation"
)]
fn a_taken_name_never_reaches_account_creation(world: RegistrationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/registration_workflow.feature",
    name = "A free name creates the account"
)]
fn a_free_name_creates_the_account(world: RegistrationWorld) {
    drop(world);
}
