use super::{build_runner, load_settings, parse_payload, report, system_labels};
use anyhow::Context;
use colored::Colorize;
use lroflow_config::Settings;
use lroflow_core::{SubmitRequest, TargetSpec};
use lroflow_gcp::{
    AuthMode, ENDPOINT_ARTIFACT, ExecutorInput, MODEL_ARTIFACT, validate_object_payload,
    vertex_endpoint, vertex_model_upload,
};
use std::path::PathBuf;

pub struct VertexArgs {
    pub project: String,
    pub location: String,
    pub payload: String,
    pub gcp_resources: PathBuf,
    pub executor_input: Option<String>,
    pub auth: AuthMode,
}

pub async fn handle_create_endpoint(args: VertexArgs) -> anyhow::Result<()> {
    let settings = load_settings()?;
    let api_base = settings.endpoints.vertex_for(&args.location);
    let spec = vertex_endpoint(&args.project, &args.location, api_base.as_deref());
    run(spec, ENDPOINT_ARTIFACT, &settings, args).await
}

pub async fn handle_upload_model(args: VertexArgs) -> anyhow::Result<()> {
    let settings = load_settings()?;
    let api_base = settings.endpoints.vertex_for(&args.location);
    let spec = vertex_model_upload(&args.project, &args.location, api_base.as_deref());
    run(spec, MODEL_ARTIFACT, &settings, args).await
}

async fn run(
    spec: TargetSpec,
    artifact: &str,
    settings: &Settings,
    args: VertexArgs,
) -> anyhow::Result<()> {
    let payload = parse_payload(&args.payload)?;
    validate_object_payload(&payload)?;

    // Parse before submitting so a bad executor input never creates anything
    let executor_input = args
        .executor_input
        .as_deref()
        .map(ExecutorInput::parse)
        .transpose()?;

    let kind = spec.kind.clone();
    eprintln!(
        "{} {} in {}/{}",
        "▶".blue(),
        kind.cyan(),
        args.project,
        args.location
    );

    let request = SubmitRequest::new(payload).with_system_labels(system_labels()?);
    let runner = build_runner(spec, &args.gcp_resources, settings, args.auth)?;
    let outcome = runner
        .run(request)
        .await
        .with_context(|| format!("{} failed", kind))?;

    if let Some(input) = executor_input {
        if let Some(path) = input.write_artifact(artifact, &outcome.target).await? {
            tracing::info!("Executor output written to {}", path.display());
        }
    }
    report(&outcome)
}
