//! Resolution of existing Vertex AI models
//!
//! No operation is involved: the model name is validated and recorded in
//! the ledger so downstream steps see the same descriptor shape as an upload.

use crate::error::{GcpError, Result};
use crate::targets::{VERTEX_MODEL, vertex_api_base};
use lroflow_core::{LedgerStore, LroError, ResourceDescriptor, TargetResource};
use regex::Regex;
use std::fmt;

const MODEL_NAME_PATTERN: &str = r"^projects/(?P<project>[^/]+)/locations/(?P<location>[^/]+)/models/(?P<model>[^/@]+)(?:@(?P<version>[^/@]+))?$";

/// Parsed Vertex model resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub project: String,
    pub location: String,
    pub model: String,
    /// Version id or alias
    pub version: Option<String>,
}

impl ModelRef {
    pub fn parse(name: &str) -> Result<Self> {
        let re = Regex::new(MODEL_NAME_PATTERN)
            .map_err(|e| GcpError::InvalidModelName(format!("{}: {}", name, e)))?;
        let caps = re
            .captures(name.trim())
            .ok_or_else(|| GcpError::InvalidModelName(name.to_string()))?;

        Ok(Self {
            project: caps["project"].to_string(),
            location: caps["location"].to_string(),
            model: caps["model"].to_string(),
            version: caps.name("version").map(|m| m.as_str().to_string()),
        })
    }

    /// Replace any version in the name; blank overrides are ignored
    pub fn with_version(mut self, version: Option<&str>) -> Self {
        if let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) {
            self.version = Some(version.to_string());
        }
        self
    }

    pub fn uri(&self, api_base: Option<&str>) -> String {
        let base = api_base
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| vertex_api_base(&self.location));
        format!("{}/{}", base, self)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/models/{}",
            self.project, self.location, self.model
        )?;
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

/// Record a resolved model in the ledger.
///
/// Re-running with the same model is a no-op; a ledger that already names a
/// different model is rejected.
pub async fn record_resolved_model(
    store: &LedgerStore,
    model: &ModelRef,
    api_base: Option<&str>,
) -> Result<TargetResource> {
    let uri = model.uri(api_base);
    let mut ledger = store.load().await?;

    match ledger.find(VERTEX_MODEL)? {
        Some(existing) if existing.resource_uri == uri => {
            tracing::info!("Model {} already recorded", model);
        }
        Some(existing) => {
            return Err(LroError::Format(format!(
                "ledger already records {} '{}', refusing to replace it with '{}'",
                VERTEX_MODEL, existing.resource_uri, uri
            ))
            .into());
        }
        None => {
            ledger.push(ResourceDescriptor::new(VERTEX_MODEL, &uri))?;
            store.save(&ledger).await?;
            tracing::info!("Resolved model {}", model);
        }
    }

    Ok(TargetResource {
        resource_type: VERTEX_MODEL.to_string(),
        name: model.to_string(),
        uri,
        state: None,
    })
}
