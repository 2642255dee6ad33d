//! LroFlow Google Cloud provider
//!
//! Google Cloud bindings for `lroflow-core`:
//!
//! - REST [`HttpControlPlane`] for creation calls and operation polling
//! - OAuth token sources (environment, metadata server, gcloud)
//! - Target definitions for Dataproc batches and Vertex AI endpoints/models
//! - Vertex model resolution without an operation
//! - Pipeline executor output artifacts

pub mod auth;
pub mod error;
pub mod executor;
pub mod http;
pub mod resolve;
pub mod targets;

pub use auth::{AuthMode, EnvToken, GcloudCli, MetadataServer, default_provider, token_provider};
pub use error::{GcpError, Result};
pub use executor::{ENDPOINT_ARTIFACT, ExecutorInput, MODEL_ARTIFACT};
pub use http::HttpControlPlane;
pub use resolve::{ModelRef, record_resolved_model};
pub use targets::{
    BatchKind, DATAPROC_API_BASE, dataproc_batch, validate_batch_payload, validate_object_payload,
    vertex_api_base, vertex_endpoint, vertex_model_upload,
};
