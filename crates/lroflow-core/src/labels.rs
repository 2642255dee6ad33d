//! System label injection
//!
//! Pipelines attach attribution labels to every resource they create. The
//! labels are merged into the request payload right before submission.

use crate::error::{LroError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type Labels = BTreeMap<String, String>;

/// Merge `system` into the `labels` object found at `pointer` in `payload`.
///
/// `pointer` is a JSON pointer to the object that owns `labels` ("" for the
/// payload root). Labels already present in the payload win over system
/// labels with the same key.
pub fn merge_system_labels(payload: &mut Value, pointer: &str, system: &Labels) -> Result<()> {
    let owner = payload
        .pointer_mut(pointer)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            LroError::InvalidInput(format!(
                "payload has no JSON object at '{}' to attach labels to",
                pointer
            ))
        })?;

    if system.is_empty() {
        return Ok(());
    }

    let labels = owner
        .entry("labels")
        .or_insert_with(|| Value::Object(Map::new()));
    if labels.is_null() {
        *labels = Value::Object(Map::new());
    }
    let labels = labels
        .as_object_mut()
        .ok_or_else(|| LroError::InvalidInput("payload labels must be a JSON object".into()))?;

    for (key, value) in system {
        labels
            .entry(key.clone())
            .or_insert_with(|| Value::String(value.clone()));
    }
    Ok(())
}
