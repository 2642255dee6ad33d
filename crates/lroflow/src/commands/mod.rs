pub mod dataproc;
pub mod resolve;
pub mod vertex;

use anyhow::Context;
use colored::Colorize;
use lroflow_config::{PollSettings, Settings};
use lroflow_core::{
    Labels, LedgerStore, PollConfig, RunOutcome, Runner, TargetResource, TargetSpec,
};
use lroflow_gcp::{AuthMode, HttpControlPlane};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().context("failed to load lroflow settings")
}

pub fn poll_config(poll: &PollSettings) -> PollConfig {
    PollConfig {
        initial_interval: poll.initial_interval(),
        max_interval: poll.max_interval(),
        multiplier: poll.multiplier,
    }
}

pub fn system_labels() -> anyhow::Result<Labels> {
    Ok(lroflow_config::system_labels()?)
}

pub fn parse_payload(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).context("--payload is not valid JSON")
}

/// Runner over the Google Cloud REST API
pub fn build_runner(
    spec: TargetSpec,
    gcp_resources: &Path,
    settings: &Settings,
    auth: AuthMode,
) -> anyhow::Result<Runner> {
    let tokens = lroflow_gcp::token_provider(auth)?;
    Ok(Runner::new(
        spec,
        LedgerStore::new(gcp_resources),
        Arc::new(HttpControlPlane::new()),
        tokens,
    )
    .with_poll_config(poll_config(&settings.poll)))
}

/// Summary on stderr, machine-readable target on stdout
pub fn report(outcome: &RunOutcome) -> anyhow::Result<()> {
    let verb = if outcome.resumed { "Resumed" } else { "Created" };
    eprintln!(
        "{} {} {} {}",
        "✓".green().bold(),
        verb,
        outcome.target.resource_type,
        outcome.target.name.cyan()
    );
    if let Some(state) = &outcome.target.state {
        eprintln!("  state: {}", state.green());
    }
    eprintln!("  operation: {}", outcome.operation_uri.dimmed());
    print_target(&outcome.target)
}

pub fn print_target(target: &TargetResource) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(target)?);
    Ok(())
}
