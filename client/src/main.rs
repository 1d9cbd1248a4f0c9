//! `registration-client` entry-point: parse credentials, run the workflow,
//! and print what each step saw.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use registration_client::config::RegistrationSettings;
use registration_client::domain::{RegistrationWorkflow, RegistrationWorkflowPorts};
use registration_client::inbound::cli::CliArgs;
use registration_client::outbound::http::{HttpTransportIdentity, ReqwestRegistrationTransport};
use registration_client::outbound::{ConsoleReporter, LlsdXmlCodec};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = RegistrationSettings::load_from_iter([OsString::from("registration-client")])
        .map_err(|err| eyre!("failed to load registration settings: {err}"))?;
    init_tracing(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args, &settings))
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let initialised = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = initialised {
        warn!(error = %e, "tracing init failed");
    }
}

async fn run(args: CliArgs, settings: &RegistrationSettings) -> Result<ExitCode> {
    let account = args.account_label();
    let credentials = args
        .into_credentials()
        .wrap_err("invalid registration credentials")?;
    let config = settings
        .to_workflow_config()
        .wrap_err("invalid registration settings")?;
    let usernames = settings
        .username_generator()
        .wrap_err("invalid username settings")?;
    let timeout = settings
        .request_timeout()
        .wrap_err("invalid request timeout")?;

    let codec = LlsdXmlCodec;
    let mut identity = HttpTransportIdentity::default();
    if let Some(user_agent) = settings.user_agent.as_deref() {
        user_agent.clone_into(&mut identity.user_agent);
    }
    let transport = ReqwestRegistrationTransport::with_identity(timeout, identity)
        .wrap_err("failed to build HTTP client")?;

    let ports = RegistrationWorkflowPorts::new(
        Arc::new(transport),
        Arc::new(codec),
        Arc::new(ConsoleReporter::new(io::stdout(), account)),
        Arc::new(usernames),
    );
    let workflow = RegistrationWorkflow::new(ports, config);
    let report = workflow.run(&credentials).await;
    debug!(steps = report.steps.len(), outcome = %report.outcome, "registration run finished");
    Ok(ExitCode::SUCCESS)
}
