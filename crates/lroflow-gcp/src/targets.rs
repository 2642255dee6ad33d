//! Google Cloud target definitions
//!
//! Each function returns the [`TargetSpec`] of one create API. The generic
//! runner in `lroflow-core` does the rest.

use crate::error::{GcpError, Result};
use lroflow_core::{NameSource, StateRule, TargetSpec};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const DATAPROC_API_BASE: &str = "https://dataproc.googleapis.com/v1";

pub const DATAPROC_LRO: &str = "DataprocLro";
pub const DATAPROC_BATCH: &str = "DataprocBatch";
pub const VERTEX_LRO: &str = "VertexLro";
pub const VERTEX_ENDPOINT: &str = "VertexEndpoint";
pub const VERTEX_MODEL: &str = "VertexModel";

/// Vertex AI regional API root
pub fn vertex_api_base(location: &str) -> String {
    format!("https://{}-aiplatform.googleapis.com/v1", location)
}

/// Dataproc Serverless batch workload type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Spark,
    PySpark,
    SparkR,
    SparkSql,
}

impl BatchKind {
    pub const ALL: [BatchKind; 4] = [
        BatchKind::Spark,
        BatchKind::PySpark,
        BatchKind::SparkR,
        BatchKind::SparkSql,
    ];

    /// Canonical `--type` name
    pub fn type_name(&self) -> &'static str {
        match self {
            BatchKind::Spark => "SparkBatch",
            BatchKind::PySpark => "PySparkBatch",
            BatchKind::SparkR => "SparkRBatch",
            BatchKind::SparkSql => "SparkSqlBatch",
        }
    }

    /// Payload key holding the workload configuration
    pub fn payload_key(&self) -> &'static str {
        match self {
            BatchKind::Spark => "spark_batch",
            BatchKind::PySpark => "pyspark_batch",
            BatchKind::SparkR => "spark_r_batch",
            BatchKind::SparkSql => "spark_sql_batch",
        }
    }

    fn camel_payload_key(&self) -> &'static str {
        match self {
            BatchKind::Spark => "sparkBatch",
            BatchKind::PySpark => "pysparkBatch",
            BatchKind::SparkR => "sparkRBatch",
            BatchKind::SparkSql => "sparkSqlBatch",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for BatchKind {
    type Err = GcpError;

    /// Accepts the bare name (`SparkBatch`) or the prefixed one (`DataprocSparkBatch`)
    fn from_str(s: &str) -> Result<Self> {
        let bare = match s.get(..8) {
            Some(prefix) if prefix.eq_ignore_ascii_case("dataproc") => &s[8..],
            _ => s,
        };
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| GcpError::UnknownTargetType(s.to_string()))
    }
}

/// Dataproc Serverless batch creation
pub fn dataproc_batch(
    kind: BatchKind,
    project: &str,
    location: &str,
    api_base: Option<&str>,
) -> TargetSpec {
    TargetSpec::new(
        kind.type_name(),
        api_base.unwrap_or(DATAPROC_API_BASE),
        format!("projects/{}/locations/{}/batches/", project, location),
    )
    .with_ledger_types(DATAPROC_LRO, DATAPROC_BATCH)
    .with_id_param("batchId")
    .with_submitted_name(NameSource::Metadata("/batch".to_string()))
    .with_response_name("/name")
    .with_state(
        StateRule::new("/state")
            .succeeds_on("SUCCEEDED")
            .fails_on("FAILED")
            .fails_on("CANCELLED"),
    )
}

/// Vertex AI endpoint creation
pub fn vertex_endpoint(project: &str, location: &str, api_base: Option<&str>) -> TargetSpec {
    let base = api_base
        .map(str::to_string)
        .unwrap_or_else(|| vertex_api_base(location));
    TargetSpec::new(
        "CreateEndpoint",
        base,
        format!("projects/{}/locations/{}/endpoints", project, location),
    )
    .with_ledger_types(VERTEX_LRO, VERTEX_ENDPOINT)
    .with_submitted_name(NameSource::OperationParent)
    .with_response_name("/name")
}

/// Vertex AI model upload; the payload is an `UploadModelRequest`
pub fn vertex_model_upload(project: &str, location: &str, api_base: Option<&str>) -> TargetSpec {
    let base = api_base
        .map(str::to_string)
        .unwrap_or_else(|| vertex_api_base(location));
    TargetSpec::new(
        "UploadModel",
        base,
        format!("projects/{}/locations/{}/models:upload", project, location),
    )
    .with_ledger_types(VERTEX_LRO, VERTEX_MODEL)
    .with_labels_owner("/model")
    .with_submitted_name(NameSource::OperationParent)
    .with_response_name("/model")
}

/// Check that a batch payload carries exactly the workload of `kind`
pub fn validate_batch_payload(kind: BatchKind, payload: &Value) -> Result<()> {
    let object = payload
        .as_object()
        .ok_or_else(|| GcpError::InvalidPayload("batch payload must be a JSON object".into()))?;

    let present: Vec<BatchKind> = BatchKind::ALL
        .into_iter()
        .filter(|k| object.contains_key(k.payload_key()) || object.contains_key(k.camel_payload_key()))
        .collect();

    match present.as_slice() {
        [found] if *found == kind => Ok(()),
        [found] => Err(GcpError::InvalidPayload(format!(
            "--type {} does not match payload key '{}'",
            kind,
            found.payload_key()
        ))),
        [] => Err(GcpError::InvalidPayload(format!(
            "payload has no '{}' section",
            kind.payload_key()
        ))),
        _ => Err(GcpError::InvalidPayload(
            "payload must describe exactly one batch workload".into(),
        )),
    }
}

/// Reject payloads that are not JSON objects
pub fn validate_object_payload(payload: &Value) -> Result<()> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(GcpError::InvalidPayload("payload must be a JSON object".into()))
    }
}
