//! End-to-end workflow properties against scripted ports.
//!
//! Every scenario drives the real LLSD codec; only the transport, reporter,
//! and username source are replaced.

use std::sync::Arc;

use llsd::{LlsdMap, LlsdValue};
use registration_client::domain::ports::RegistrationTransportError;
use registration_client::domain::{
    AbortReason, Capability, Credentials, RandomUsernameGenerator, RegistrationRun,
    RegistrationWorkflow, RegistrationWorkflowConfig, RegistrationWorkflowPorts, SkipReason,
    StepOutcome, TerminalOutcome, Username, WorkflowStep,
};
use registration_client::outbound::LlsdXmlCodec;
use registration_client::test_support::{
    FixedUsernameGenerator, Method, RecordingReporter, ScriptedTransport,
};
use rstest::{fixture, rstest};

const DISCOVERY_URL: &str = "https://login.example/get_reg_capabilities";
const AGENT_ID: &str = "a2e76fcd-9360-4f6d-a924-000000000001";

fn cap_url(capability: Capability) -> String {
    format!("https://cap.example/{}", capability.wire_name())
}

fn xml(value: impl Into<LlsdValue>) -> Vec<u8> {
    llsd::to_xml_bytes(&value.into()).expect("fixture encodes")
}

fn directory(capabilities: &[Capability]) -> Vec<u8> {
    let map: LlsdMap = capabilities
        .iter()
        .map(|capability| (capability.wire_name(), LlsdValue::Uri(cap_url(*capability))))
        .collect();
    xml(map)
}

fn last_names() -> Vec<u8> {
    xml([("7", "Resident")].into_iter().collect::<LlsdMap>())
}

fn error_codes() -> Vec<u8> {
    xml(vec![LlsdValue::Array(vec![LlsdValue::Integer(1), LlsdValue::from("name taken")])])
}

fn created() -> Vec<u8> {
    let id = uuid_text_value(AGENT_ID);
    xml([("agent_id", id)].into_iter().collect::<LlsdMap>())
}

fn uuid_text_value(text: &str) -> LlsdValue {
    llsd::from_xml_str(&format!("<llsd><uuid>{text}</uuid></llsd>")).expect("uuid fixture")
}

/// Transport scripted for a full run with the given name check answer.
fn scripted(capabilities: &[Capability], available: bool) -> ScriptedTransport {
    ScriptedTransport::new()
        .respond(DISCOVERY_URL, directory(capabilities))
        .respond(cap_url(Capability::GetErrorCodes), error_codes())
        .respond(cap_url(Capability::GetLastNames), last_names())
        .respond(cap_url(Capability::CheckName), xml(available))
        .respond(cap_url(Capability::CreateUser), created())
}

#[fixture]
fn credentials() -> Credentials {
    Credentials::try_from_parts("Ada", "Linden", "operator-secret").expect("valid credentials")
}

fn config() -> RegistrationWorkflowConfig {
    RegistrationWorkflowConfig {
        discovery_url: DISCOVERY_URL.to_owned(),
        ..RegistrationWorkflowConfig::default()
    }
}

struct Harness {
    transport: Arc<ScriptedTransport>,
    reporter: Arc<RecordingReporter>,
    workflow: RegistrationWorkflow,
}

impl Harness {
    fn calls_to(&self, capability: Capability) -> usize {
        self.transport.call_count(&cap_url(capability))
    }
}

fn harness(transport: ScriptedTransport) -> Harness {
    harness_with(
        transport,
        Arc::new(FixedUsernameGenerator::new("benny", 4821)),
    )
}

fn harness_with(
    transport: ScriptedTransport,
    usernames: Arc<dyn registration_client::domain::ports::UsernameGenerator>,
) -> Harness {
    let transport = Arc::new(transport);
    let reporter = Arc::new(RecordingReporter::new());
    let workflow = RegistrationWorkflow::new(
        RegistrationWorkflowPorts::new(
            transport.clone(),
            Arc::new(LlsdXmlCodec),
            reporter.clone(),
            usernames,
        ),
        config(),
    );
    Harness {
        transport,
        reporter,
        workflow,
    }
}

fn run(harness: &Harness, credentials: &Credentials) -> RegistrationRun {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(harness.workflow.run(credentials))
}

fn decoded_post(harness: &Harness, capability: Capability) -> LlsdMap {
    let call = harness
        .transport
        .calls()
        .into_iter()
        .find(|call| call.url == cap_url(capability))
        .expect("capability was called");
    assert_eq!(call.method, Method::Post);
    assert_eq!(call.content_type, Some(llsd::CONTENT_TYPE));
    llsd::from_xml_slice(&call.body.expect("posted body"))
        .expect("posted body decodes")
        .into_map()
        .expect("posted body is a map")
}

#[rstest]
fn discovery_failure_aborts_without_further_calls(credentials: Credentials) {
    let refused = RegistrationTransportError::transport("connection refused");
    let transport = ScriptedTransport::new().fail(DISCOVERY_URL, refused);
    let harness = harness(transport);

    let report = run(&harness, &credentials);

    assert_eq!(
        report.outcome,
        TerminalOutcome::Aborted(AbortReason::NoCapabilities)
    );
    assert_eq!(harness.transport.calls().len(), 1);
    assert_eq!(harness.reporter.outcomes(), vec![report.outcome.clone()]);
}

#[rstest]
fn discovery_posts_url_encoded_credentials(credentials: Credentials) {
    let harness = harness(scripted(&Capability::ALL, true));

    run(&harness, &credentials);

    let discovery = harness.transport.calls().remove(0);
    assert_eq!(discovery.url, DISCOVERY_URL);
    assert_eq!(
        discovery.content_type,
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        discovery.body.as_deref(),
        Some(&b"first_name=Ada&last_name=Linden&password=operator-secret"[..])
    );
}

#[rstest]
fn missing_last_names_capability_stops_before_name_calls(credentials: Credentials) {
    let harness = harness(scripted(
        &[
            Capability::GetErrorCodes,
            Capability::CheckName,
            Capability::CreateUser,
        ],
        true,
    ));

    let report = run(&harness, &credentials);

    assert_eq!(
        report.outcome,
        TerminalOutcome::Aborted(AbortReason::MissingCapability(Capability::GetLastNames))
    );
    assert_eq!(harness.calls_to(Capability::CheckName), 0);
    assert_eq!(harness.calls_to(Capability::CreateUser), 0);
}

#[rstest]
fn taken_name_never_reaches_create_user(credentials: Credentials) {
    let harness = harness(scripted(&Capability::ALL, false));

    let report = run(&harness, &credentials);

    assert_eq!(
        report.outcome,
        TerminalOutcome::Aborted(AbortReason::NameUnavailableOrMissingCapability)
    );
    assert_eq!(
        report.outcome_of(WorkflowStep::CreateUser),
        Some(&StepOutcome::Skipped(SkipReason::NameUnavailable))
    );
    assert_eq!(harness.calls_to(Capability::CreateUser), 0);
}

#[rstest]
fn free_name_creates_the_account(credentials: Credentials) {
    let harness = harness(scripted(&Capability::ALL, true));

    let report = run(&harness, &credentials);

    assert_eq!(
        report.outcome,
        TerminalOutcome::Completed {
            agent_id: AGENT_ID.to_owned(),
        }
    );

    let check = decoded_post(&harness, Capability::CheckName);
    assert_eq!(check.get("username"), Some(&LlsdValue::from("benny4821")));
    assert_eq!(check.get("last_name_id"), Some(&LlsdValue::from("7")));

    let create = decoded_post(&harness, Capability::CreateUser);
    assert_eq!(create.get("username"), Some(&LlsdValue::from("benny4821")));
    assert_eq!(create.get("last_name_id"), Some(&LlsdValue::from("7")));
    let email = create
        .get("email")
        .and_then(LlsdValue::as_str)
        .expect("email is a string");
    assert!(email.ends_with("@ben.com"));
    assert_eq!(create.get("dob"), Some(&LlsdValue::from("1980-01-01")));
    assert!(!create.contains_key("start_region_name"));
}

#[rstest]
fn error_codes_never_change_the_terminal_outcome(credentials: Credentials) {
    let with_codes = harness(scripted(&Capability::ALL, true));
    let without_codes = harness(scripted(
        &[
            Capability::GetLastNames,
            Capability::CheckName,
            Capability::CreateUser,
        ],
        true,
    ));
    let broken_codes = ScriptedTransport::new()
        .respond(DISCOVERY_URL, directory(&Capability::ALL))
        .fail(
            cap_url(Capability::GetErrorCodes),
            RegistrationTransportError::status(500_u16, "boom"),
        )
        .respond(cap_url(Capability::GetLastNames), last_names())
        .respond(cap_url(Capability::CheckName), xml(true))
        .respond(cap_url(Capability::CreateUser), created());
    let failing_codes = harness(broken_codes);

    let expected = run(&with_codes, &credentials).outcome;
    assert_eq!(run(&without_codes, &credentials).outcome, expected);
    assert_eq!(run(&failing_codes, &credentials).outcome, expected);
}

#[rstest]
fn check_name_transport_failure_is_distinct_from_missing_capability(credentials: Credentials) {
    let transport = ScriptedTransport::new()
        .respond(DISCOVERY_URL, directory(&Capability::ALL))
        .respond(cap_url(Capability::GetLastNames), last_names())
        .fail(
            cap_url(Capability::CheckName),
            RegistrationTransportError::timeout("deadline elapsed"),
        );
    let harness = harness(transport);

    let report = run(&harness, &credentials);

    let TerminalOutcome::Aborted(reason) = &report.outcome else {
        panic!("expected an aborted run, got {:?}", report.outcome);
    };
    assert_eq!(reason.code(), "transport-error");
    assert_eq!(harness.calls_to(Capability::CreateUser), 0);
}

#[rstest]
fn reporter_sees_requests_but_never_the_operator_password(credentials: Credentials) {
    let harness = harness(scripted(&Capability::ALL, true));

    run(&harness, &credentials);

    assert!(!harness.reporter.saw_bytes(b"operator-secret"));
    let steps = harness.reporter.steps();
    assert_eq!(steps.len(), WorkflowStep::ORDER.len());
    assert!(steps[0].request.is_none());
    let check = steps
        .iter()
        .find(|recorded| recorded.step == WorkflowStep::CheckName)
        .expect("check name was reported");
    assert!(check.request.is_some());
    assert!(check.response.is_some());
}

#[rstest]
fn random_usernames_keep_the_format(credentials: Credentials) {
    let generator = RandomUsernameGenerator::default();
    let harness = harness_with(scripted(&Capability::ALL, true), Arc::new(generator));

    let report = run(&harness, &credentials);

    let candidate = report.candidate.expect("candidate was built");
    let username = candidate.username().as_str();
    assert!(Username::matches_format(username, "benny"));
    assert!((100..10_000).contains(&candidate.username().suffix()));
}
