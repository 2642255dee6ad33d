use super::{build_runner, load_settings, parse_payload, report, system_labels};
use anyhow::Context;
use colored::Colorize;
use lroflow_core::{SubmitRequest, generate_resource_id};
use lroflow_gcp::{AuthMode, BatchKind, dataproc_batch, validate_batch_payload};
use std::path::PathBuf;

pub struct BatchArgs {
    pub batch_type: String,
    pub project: String,
    pub location: String,
    pub batch_id: String,
    pub payload: String,
    pub gcp_resources: PathBuf,
    pub auth: AuthMode,
}

pub async fn handle(args: BatchArgs) -> anyhow::Result<()> {
    let kind: BatchKind = args.batch_type.parse()?;
    let payload = parse_payload(&args.payload)?;
    validate_batch_payload(kind, &payload)?;

    let settings = load_settings()?;
    let spec = dataproc_batch(
        kind,
        &args.project,
        &args.location,
        settings.endpoints.dataproc.as_deref(),
    );

    eprintln!(
        "{} {} in {}/{}",
        "▶".blue(),
        kind.to_string().cyan(),
        args.project,
        args.location
    );

    // Generated ids carry the type as given, e.g. `dataprocsparkbatch-...`
    let batch_id = match args.batch_id.trim() {
        "" => generate_resource_id(&args.batch_type),
        id => id.to_string(),
    };
    let request = SubmitRequest::new(payload)
        .with_resource_id(batch_id)
        .with_system_labels(system_labels()?);

    let runner = build_runner(spec, &args.gcp_resources, &settings, args.auth)?;
    let outcome = runner
        .run(request)
        .await
        .with_context(|| format!("{} failed", kind))?;
    report(&outcome)
}
