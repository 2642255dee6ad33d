use super::{load_settings, print_target};
use colored::Colorize;
use lroflow_core::LedgerStore;
use lroflow_gcp::{ExecutorInput, MODEL_ARTIFACT, ModelRef, record_resolved_model};
use std::path::Path;

pub async fn handle(
    model_name: &str,
    model_version: Option<&str>,
    gcp_resources: &Path,
    executor_input: Option<&str>,
) -> anyhow::Result<()> {
    let model = ModelRef::parse(model_name)?.with_version(model_version);
    let executor_input = executor_input.map(ExecutorInput::parse).transpose()?;

    let settings = load_settings()?;
    let api_base = settings.endpoints.vertex_for(&model.location);
    let store = LedgerStore::new(gcp_resources);
    let target = record_resolved_model(&store, &model, api_base.as_deref()).await?;

    if let Some(input) = executor_input {
        input.write_artifact(MODEL_ARTIFACT, &target).await?;
    }

    eprintln!("{} Resolved {}", "✓".green().bold(), target.name.cyan());
    print_target(&target)
}
