//! Pipeline executor output
//!
//! Pipeline steps receive an executor input JSON naming their output
//! artifacts and the file where the executor expects their final values.

use crate::error::{GcpError, Result};
use lroflow_core::TargetResource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Artifact name of a created endpoint
pub const ENDPOINT_ARTIFACT: &str = "endpoint";
/// Artifact name of an uploaded or resolved model
pub const MODEL_ARTIFACT: &str = "model";

#[derive(Debug, Default, Deserialize)]
pub struct ExecutorInput {
    #[serde(default)]
    outputs: ExecutorOutputs,
}

#[derive(Debug, Default, Deserialize)]
struct ExecutorOutputs {
    #[serde(default)]
    artifacts: BTreeMap<String, ArtifactList>,

    #[serde(rename = "outputFile", default)]
    output_file: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<RuntimeArtifact>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RuntimeArtifact {
    #[serde(default)]
    name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    artifact_type: Option<Value>,

    #[serde(default)]
    uri: String,

    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ExecutorOutput {
    artifacts: BTreeMap<String, ArtifactList>,
}

impl ExecutorInput {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| GcpError::InvalidExecutorInput(e.to_string()))
    }

    pub fn output_file(&self) -> Option<PathBuf> {
        self.outputs
            .output_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
    }

    /// Output document binding `artifact` to the produced resource
    fn render(&self, artifact: &str, resource: &TargetResource) -> Result<Value> {
        let declared = self.outputs.artifacts.get(artifact).ok_or_else(|| {
            GcpError::InvalidExecutorInput(format!("output artifact '{}' is not declared", artifact))
        })?;

        let mut entry = declared.artifacts.first().cloned().unwrap_or_default();
        entry.uri = resource.uri.clone();
        entry
            .metadata
            .insert("resourceName".to_string(), Value::String(resource.name.clone()));

        let output = ExecutorOutput {
            artifacts: BTreeMap::from([(
                artifact.to_string(),
                ArtifactList {
                    artifacts: vec![entry],
                },
            )]),
        };
        Ok(serde_json::to_value(output)?)
    }

    /// Write the executor output file; returns its path, or `None` when the
    /// executor did not ask for one
    pub async fn write_artifact(
        &self,
        artifact: &str,
        resource: &TargetResource,
    ) -> Result<Option<PathBuf>> {
        let output = self.render(artifact, resource)?;

        let Some(path) = self.output_file() else {
            tracing::warn!("Executor input has no outputFile; skipping artifact '{}'", artifact);
            return Ok(None);
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, serde_json::to_vec(&output)?).await?;
        tracing::debug!("Wrote executor output to {}", path.display());
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoint() -> TargetResource {
        TargetResource {
            resource_type: "VertexEndpoint".into(),
            name: "projects/p/locations/l/endpoints/123".into(),
            uri: "https://l-aiplatform.googleapis.com/v1/projects/p/locations/l/endpoints/123"
                .into(),
            state: None,
        }
    }

    fn executor_input(output_file: &str) -> String {
        json!({
            "inputs": {"parameterValues": {"display_name": "e"}},
            "outputs": {
                "artifacts": {
                    "endpoint": {
                        "artifacts": [{
                            "name": "projects/1/locations/l/metadataStores/default/artifacts/9",
                            "type": {"schemaTitle": "google.VertexEndpoint"},
                            "uri": "gs://bucket/endpoint",
                            "metadata": {}
                        }]
                    }
                },
                "outputFile": output_file
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_write_artifact() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("outputs/executor_output.json");
        let input = ExecutorInput::parse(&executor_input(path.to_str().unwrap())).unwrap();

        let written = input
            .write_artifact(ENDPOINT_ARTIFACT, &endpoint())
            .await
            .unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));

        let output: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let artifact = &output["artifacts"]["endpoint"]["artifacts"][0];
        assert_eq!(
            artifact["name"],
            "projects/1/locations/l/metadataStores/default/artifacts/9"
        );
        assert_eq!(artifact["type"]["schemaTitle"], "google.VertexEndpoint");
        assert_eq!(artifact["uri"], endpoint().uri.as_str());
        assert_eq!(
            artifact["metadata"]["resourceName"],
            "projects/p/locations/l/endpoints/123"
        );
    }

    #[tokio::test]
    async fn test_undeclared_artifact_is_rejected() {
        let input = ExecutorInput::parse(&executor_input("/tmp/unused.json")).unwrap();
        assert!(matches!(
            input.write_artifact(MODEL_ARTIFACT, &endpoint()).await,
            Err(GcpError::InvalidExecutorInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_output_file_is_skipped() {
        let raw = json!({"outputs": {"artifacts": {"model": {"artifacts": []}}}}).to_string();
        let input = ExecutorInput::parse(&raw).unwrap();
        assert_eq!(input.output_file(), None);
        assert_eq!(
            input.write_artifact(MODEL_ARTIFACT, &endpoint()).await.unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            ExecutorInput::parse("{not json"),
            Err(GcpError::InvalidExecutorInput(_))
        ));
    }
}
