//! Terminal operation classification

use crate::error::{LroError, Result};
use crate::operation::Operation;
use crate::submitter::TrackedOperation;
use crate::target::TargetSpec;
use serde::{Deserialize, Serialize};

/// Resource produced by a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResource {
    pub resource_type: String,

    /// Resource name relative to the API root
    pub name: String,

    /// Fully-qualified URI
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Interpret the outcome of polling.
///
/// Transport failures pass through untouched: the ledger still names the
/// operation, so the next run fails the same way instead of silently
/// creating a replacement.
pub fn classify_poll(
    spec: &TargetSpec,
    tracked: &TrackedOperation,
    polled: Result<Operation>,
) -> Result<TargetResource> {
    match polled {
        Ok(operation) => classify(spec, tracked, &operation),
        Err(LroError::Polling { uri, source }) => {
            if source.is_not_found() {
                tracing::error!(
                    "Operation {} no longer exists; leaving the ledger in place for inspection",
                    uri
                );
            } else {
                tracing::error!("Failed to poll {}: {}", uri, source);
            }
            Err(LroError::Polling { uri, source })
        }
        Err(e) => Err(e),
    }
}

/// Turn a finished operation into its target resource or an error
pub fn classify(
    spec: &TargetSpec,
    tracked: &TrackedOperation,
    operation: &Operation,
) -> Result<TargetResource> {
    if !operation.done {
        return Err(LroError::InvalidResponse(format!(
            "operation {} is not done",
            tracked.operation_uri
        )));
    }

    if let Some(error) = &operation.error {
        tracing::error!(
            "Operation {} failed with code {}: {}",
            tracked.operation_uri,
            error.code,
            error.message
        );
        return Err(LroError::OperationFailed {
            name: operation_name(tracked, operation),
            code: error.code,
            message: error.message.clone(),
        });
    }

    let name = operation
        .response_str(&spec.response_name)
        .map(str::to_string)
        .or_else(|| {
            tracked
                .target
                .as_ref()
                .and_then(|t| spec.resource_name(&t.resource_uri))
                .map(str::to_string)
        })
        .ok_or_else(|| {
            LroError::InvalidResponse(format!(
                "operation {} finished without naming its {} resource",
                tracked.operation_uri, spec.resource_type
            ))
        })?;
    let uri = spec.resource_uri(&name);

    let state = match &spec.state {
        None => None,
        Some(rule) => {
            let state = operation
                .response_str(&rule.pointer)
                .unwrap_or("STATE_UNSPECIFIED")
                .to_string();
            if !rule.is_success(&state) {
                if rule.is_known_failure(&state) {
                    tracing::error!("{} {} finished in state {}", spec.resource_type, uri, state);
                } else {
                    tracing::error!(
                        "{} {} finished in unrecognized state {}",
                        spec.resource_type,
                        uri,
                        state
                    );
                }
                return Err(LroError::ResourceFailed {
                    resource: uri,
                    state,
                });
            }
            Some(state)
        }
    };

    tracing::info!("{} {} is ready", spec.resource_type, uri);
    Ok(TargetResource {
        resource_type: spec.resource_type.clone(),
        name,
        uri,
        state,
    })
}

fn operation_name(tracked: &TrackedOperation, operation: &Operation) -> String {
    if operation.name.is_empty() {
        tracked.operation_uri.clone()
    } else {
        operation.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::ledger::ResourceDescriptor;
    use crate::target::{NameSource, StateRule};
    use serde_json::json;

    const BASE: &str = "https://dataproc.googleapis.com/v1";

    fn spec() -> TargetSpec {
        TargetSpec::new("SparkBatch", BASE, "projects/p/locations/l/batches/")
            .with_ledger_types("DataprocLro", "DataprocBatch")
            .with_id_param("batchId")
            .with_submitted_name(NameSource::Metadata("/batch".into()))
            .with_state(
                StateRule::new("/state")
                    .succeeds_on("SUCCEEDED")
                    .fails_on("FAILED")
                    .fails_on("CANCELLED"),
            )
    }

    fn tracked() -> TrackedOperation {
        TrackedOperation {
            operation_uri: format!("{}/projects/p/regions/l/operations/op", BASE),
            target: Some(ResourceDescriptor::new(
                "DataprocBatch",
                format!("{}/projects/p/locations/l/batches/b", BASE),
            )),
            resumed: false,
        }
    }

    fn done(response: serde_json::Value) -> Operation {
        serde_json::from_value(json!({
            "name": "projects/p/regions/l/operations/op",
            "done": true,
            "response": response,
        }))
        .unwrap()
    }

    #[test]
    fn test_success_state() {
        let op = done(json!({"name": "projects/p/locations/l/batches/b", "state": "SUCCEEDED"}));
        let target = classify(&spec(), &tracked(), &op).unwrap();
        assert_eq!(target.resource_type, "DataprocBatch");
        assert_eq!(target.name, "projects/p/locations/l/batches/b");
        assert_eq!(target.uri, format!("{}/projects/p/locations/l/batches/b", BASE));
        assert_eq!(target.state.as_deref(), Some("SUCCEEDED"));
    }

    #[test]
    fn test_failure_states() {
        for state in ["FAILED", "CANCELLED", "RUNNING"] {
            let op = done(json!({"name": "projects/p/locations/l/batches/b", "state": state}));
            match classify(&spec(), &tracked(), &op) {
                Err(LroError::ResourceFailed { state: observed, .. }) => assert_eq!(observed, state),
                other => panic!("expected ResourceFailed, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_state_is_failure() {
        let op = done(json!({"name": "projects/p/locations/l/batches/b"}));
        assert!(matches!(
            classify(&spec(), &tracked(), &op),
            Err(LroError::ResourceFailed { .. })
        ));
    }

    #[test]
    fn test_error_payload() {
        let op: Operation = serde_json::from_value(json!({
            "name": "projects/p/regions/l/operations/op",
            "done": true,
            "error": {"code": 10, "message": "aborted"}
        }))
        .unwrap();

        match classify(&spec(), &tracked(), &op) {
            Err(LroError::OperationFailed { code, message, .. }) => {
                assert_eq!(code, 10);
                assert_eq!(message, "aborted");
            }
            other => panic!("expected OperationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_name_falls_back_to_tracked_target() {
        let op = done(json!({"state": "SUCCEEDED"}));
        let target = classify(&spec(), &tracked(), &op).unwrap();
        assert_eq!(target.name, "projects/p/locations/l/batches/b");
    }

    #[test]
    fn test_stateless_target_succeeds_when_done() {
        let spec = TargetSpec::new(
            "CreateEndpoint",
            "https://l-aiplatform.googleapis.com/v1",
            "projects/p/locations/l/endpoints",
        )
        .with_ledger_types("VertexLro", "VertexEndpoint");
        let tracked = TrackedOperation {
            operation_uri: "https://l-aiplatform.googleapis.com/v1/projects/p/locations/l/endpoints/1/operations/2".into(),
            target: None,
            resumed: false,
        };
        let op = done(json!({"name": "projects/p/locations/l/endpoints/1"}));

        let target = classify(&spec, &tracked, &op).unwrap();
        assert_eq!(target.state, None);
        assert_eq!(target.name, "projects/p/locations/l/endpoints/1");
    }

    #[test]
    fn test_poll_failure_passes_through() {
        let polled = Err(LroError::Polling {
            uri: "u".into(),
            source: ApiError::Status {
                code: 404,
                url: "u".into(),
                message: "Operation not found".into(),
            },
        });
        match classify_poll(&spec(), &tracked(), polled) {
            Err(LroError::Polling { source, .. }) => assert!(source.is_not_found()),
            other => panic!("expected Polling, got {:?}", other),
        }
    }
}
