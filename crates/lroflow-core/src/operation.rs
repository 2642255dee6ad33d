//! Long-running operation payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-side asynchronous task, as returned by create and status calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Server-assigned name (e.g. `projects/p/regions/r/operations/id`)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub done: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Target resource, once the operation succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

/// Error payload of a failed operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl Operation {
    /// String at a JSON pointer inside `metadata`
    pub fn metadata_str(&self, pointer: &str) -> Option<&str> {
        lookup_str(self.metadata.as_ref(), pointer)
    }

    /// String at a JSON pointer inside `response`
    pub fn response_str(&self, pointer: &str) -> Option<&str> {
        lookup_str(self.response.as_ref(), pointer)
    }

    /// Name of the resource this operation belongs to, derived from the
    /// operation name (`<parent>/operations/<id>`)
    pub fn parent_name(&self) -> Option<&str> {
        self.name
            .rsplit_once("/operations/")
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }
}

fn lookup_str<'a>(value: Option<&'a Value>, pointer: &str) -> Option<&'a str> {
    value
        .and_then(|v| v.pointer(pointer))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
