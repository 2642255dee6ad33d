//! Per-API target configuration
//!
//! A [`TargetSpec`] is everything that differs between two "create + track +
//! poll" runners: where to POST, how to name the ledger entries, and where
//! in the responses to find the created resource and its state.

use crate::error::{LroError, Result};
use crate::operation::Operation;
use regex::Regex;

/// Where the target's name is found in the submission response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// JSON pointer into the operation's `metadata`
    Metadata(String),
    /// Parent of the operation name (`<target>/operations/<id>`)
    OperationParent,
}

/// Terminal state classification of a target resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRule {
    /// JSON pointer into the operation's `response`
    pub pointer: String,
    pub success: Vec<String>,
    /// Known failure states. Anything outside `success` fails; this list
    /// only sharpens the log message.
    pub failure: Vec<String>,
}

impl StateRule {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            success: Vec::new(),
            failure: Vec::new(),
        }
    }

    pub fn succeeds_on(mut self, state: impl Into<String>) -> Self {
        self.success.push(state.into());
        self
    }

    pub fn fails_on(mut self, state: impl Into<String>) -> Self {
        self.failure.push(state.into());
        self
    }

    pub fn is_success(&self, state: &str) -> bool {
        self.success.iter().any(|s| s == state)
    }

    pub fn is_known_failure(&self, state: &str) -> bool {
        self.failure.iter().any(|s| s == state)
    }
}

/// Configuration of one target resource type
#[derive(Debug, Clone)]
pub struct TargetSpec {
    /// Kind name, used as the prefix of synthesized ids
    pub kind: String,

    /// Ledger type of the operation descriptor (e.g. "DataprocLro")
    pub operation_type: String,

    /// Ledger type of the target descriptor (e.g. "DataprocBatch")
    pub resource_type: String,

    /// API root, e.g. `https://dataproc.googleapis.com/v1`
    pub api_base: String,

    /// Creation path relative to `api_base`
    pub collection: String,

    /// Query parameter carrying the requested resource id, if the API takes one
    pub id_param: Option<String>,

    /// JSON pointer to the object in the payload that owns `labels`
    pub labels_owner: String,

    pub submitted_name: Option<NameSource>,

    /// JSON pointer into the final `response` holding the target name
    pub response_name: String,

    pub state: Option<StateRule>,
}

impl TargetSpec {
    pub fn new(
        kind: impl Into<String>,
        api_base: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            operation_type: "Lro".to_string(),
            resource_type: "Resource".to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            id_param: None,
            labels_owner: String::new(),
            submitted_name: None,
            response_name: "/name".to_string(),
            state: None,
        }
    }

    pub fn with_ledger_types(
        mut self,
        operation_type: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        self.operation_type = operation_type.into();
        self.resource_type = resource_type.into();
        self
    }

    pub fn with_id_param(mut self, param: impl Into<String>) -> Self {
        self.id_param = Some(param.into());
        self
    }

    pub fn with_labels_owner(mut self, pointer: impl Into<String>) -> Self {
        self.labels_owner = pointer.into();
        self
    }

    pub fn with_submitted_name(mut self, source: NameSource) -> Self {
        self.submitted_name = Some(source);
        self
    }

    pub fn with_response_name(mut self, pointer: impl Into<String>) -> Self {
        self.response_name = pointer.into();
        self
    }

    pub fn with_state(mut self, rule: StateRule) -> Self {
        self.state = Some(rule);
        self
    }

    /// URL of the creation call
    pub fn create_url(&self, resource_id: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.api_base, self.collection);
        if let (Some(param), Some(id)) = (&self.id_param, resource_id) {
            url.push_str(&format!("?{}={}", param, id));
        }
        url
    }

    /// Absolute URI of a resource name returned by the API
    pub fn resource_uri(&self, name: &str) -> String {
        format!("{}/{}", self.api_base, name.trim_start_matches('/'))
    }

    /// Resource name of an absolute URI produced by [`Self::resource_uri`]
    pub fn resource_name<'a>(&self, uri: &'a str) -> Option<&'a str> {
        uri.strip_prefix(self.api_base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }

    /// Target name announced by the submission response
    pub fn submitted_target_name<'a>(&self, operation: &'a Operation) -> Option<&'a str> {
        match self.submitted_name.as_ref()? {
            NameSource::Metadata(pointer) => operation.metadata_str(pointer),
            NameSource::OperationParent => operation.parent_name(),
        }
    }

    /// Check that a recorded operation URI belongs to this API.
    ///
    /// Accepted shape:
    /// `<api_base>/projects/<p>/(locations|regions)/<l>/[<collection>/<id>/...]operations/<op>`
    pub fn validate_operation_uri(&self, uri: &str) -> Result<()> {
        let pattern = format!(
            r"^{}/projects/[^/]+/(?:locations|regions)/[^/]+/(?:[^/]+/[^/]+/)*operations/[^/]+$",
            regex::escape(&self.api_base)
        );
        let re = Regex::new(&pattern)
            .map_err(|e| LroError::InvalidInput(format!("invalid API base: {}", e)))?;

        if !re.is_match(uri) {
            return Err(LroError::Format(format!(
                "{} resource URI '{}' is not an operation of {}",
                self.operation_type, uri, self.api_base
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://dataproc.googleapis.com/v1";

    fn batch_spec() -> TargetSpec {
        TargetSpec::new(
            "SparkBatch",
            BASE,
            "projects/test-project/locations/test-location/batches/",
        )
        .with_ledger_types("DataprocLro", "DataprocBatch")
        .with_id_param("batchId")
        .with_submitted_name(NameSource::Metadata("/batch".to_string()))
        .with_state(
            StateRule::new("/state")
                .succeeds_on("SUCCEEDED")
                .fails_on("FAILED")
                .fails_on("CANCELLED"),
        )
    }

    #[test]
    fn test_create_url() {
        let spec = batch_spec();
        assert_eq!(
            spec.create_url(Some("test-batch-id")),
            "https://dataproc.googleapis.com/v1/projects/test-project/locations/test-location/batches/?batchId=test-batch-id"
        );

        let spec = TargetSpec::new("CreateEndpoint", "https://x/v1/", "projects/p/locations/l/endpoints");
        assert_eq!(
            spec.create_url(Some("ignored")),
            "https://x/v1/projects/p/locations/l/endpoints"
        );
    }

    #[test]
    fn test_resource_uri_round_trip() {
        let spec = batch_spec();
        let uri = spec.resource_uri("projects/p/regions/r/operations/op");
        assert_eq!(uri, format!("{}/projects/p/regions/r/operations/op", BASE));
        assert_eq!(
            spec.resource_name(&uri),
            Some("projects/p/regions/r/operations/op")
        );
        assert_eq!(spec.resource_name("https://elsewhere/projects/p"), None);
    }

    #[test]
    fn test_validate_operation_uri() {
        let spec = batch_spec();
        assert!(
            spec.validate_operation_uri(&format!(
                "{}/projects/test-project/regions/test-location/operations/fake-operation-id",
                BASE
            ))
            .is_ok()
        );
        assert!(
            spec.validate_operation_uri(&format!(
                "{}/projects/p/locations/l/endpoints/42/operations/7",
                BASE
            ))
            .is_ok()
        );
    }

    #[test]
    fn test_validate_operation_uri_rejects_malformed() {
        let spec = batch_spec();
        for uri in [
            format!("{}/v1/projects/test-project/regions/test-location/operations", BASE),
            format!("{}/projects/p/regions/r/operations/", BASE),
            "https://other.googleapis.com/v1/projects/p/regions/r/operations/op".to_string(),
            format!("{}/projects/p/regions/r/batches/b", BASE),
        ] {
            let result = spec.validate_operation_uri(&uri);
            assert!(matches!(result, Err(LroError::Format(_))), "{uri}");
        }
    }

    #[test]
    fn test_state_rule() {
        let rule = batch_spec().state.unwrap();
        assert!(rule.is_success("SUCCEEDED"));
        assert!(!rule.is_success("RUNNING"));
        assert!(rule.is_known_failure("CANCELLED"));
        assert!(!rule.is_known_failure("RUNNING"));
    }
}
