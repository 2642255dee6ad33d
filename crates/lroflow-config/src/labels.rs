//! System labels supplied by the pipeline backend

use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;

/// Environment variable carrying the labels as a JSON object
pub const SYSTEM_LABELS_ENV: &str = "VERTEX_AI_PIPELINES_RUN_LABELS";

/// Read the system labels from the environment. Unset means none.
pub fn system_labels() -> Result<BTreeMap<String, String>> {
    match std::env::var(SYSTEM_LABELS_ENV) {
        Ok(raw) => parse_system_labels(&raw),
        Err(_) => Ok(BTreeMap::new()),
    }
}

pub fn parse_system_labels(raw: &str) -> Result<BTreeMap<String, String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidSystemLabels {
        var: SYSTEM_LABELS_ENV.to_string(),
        source,
    })
}
