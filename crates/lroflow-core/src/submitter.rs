//! Idempotent submission
//!
//! At most one creation request is ever sent per ledger. If the ledger
//! already tracks an operation the runner resumes it; otherwise it submits
//! and records the operation *before* anyone starts polling, so a crash at
//! any later point resumes instead of resubmitting.

use crate::api::ControlPlane;
use crate::auth::TokenProvider;
use crate::error::{ApiError, LroError, Result};
use crate::id::generate_resource_id;
use crate::labels::{Labels, merge_system_labels};
use crate::ledger::{Ledger, LedgerStore, ResourceDescriptor};
use crate::target::TargetSpec;
use serde_json::Value;

/// Inputs of one creation request
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    /// Caller-supplied request body
    pub payload: Value,

    /// Explicit resource id; blank means synthesize one
    pub resource_id: Option<String>,

    pub system_labels: Labels,
}

impl SubmitRequest {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            ..Default::default()
        }
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_system_labels(mut self, labels: Labels) -> Self {
        self.system_labels = labels;
        self
    }
}

/// Operation the runner is now responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOperation {
    pub operation_uri: String,

    /// Target descriptor, when the API named the target at submission
    pub target: Option<ResourceDescriptor>,

    /// Whether this came from the ledger rather than a new submission
    pub resumed: bool,
}

pub struct Submitter<'a> {
    spec: &'a TargetSpec,
    store: &'a LedgerStore,
    api: &'a dyn ControlPlane,
    tokens: &'a dyn TokenProvider,
}

impl<'a> Submitter<'a> {
    pub fn new(
        spec: &'a TargetSpec,
        store: &'a LedgerStore,
        api: &'a dyn ControlPlane,
        tokens: &'a dyn TokenProvider,
    ) -> Self {
        Self {
            spec,
            store,
            api,
            tokens,
        }
    }

    /// Resume the operation recorded in the ledger, or submit a new one
    pub async fn submit_or_resume(&self, request: SubmitRequest) -> Result<TrackedOperation> {
        let mut ledger = self.store.load().await?;

        if let Some(existing) = ledger.find(&self.spec.operation_type)? {
            self.spec.validate_operation_uri(&existing.resource_uri)?;
            let target = ledger.find(&self.spec.resource_type)?.cloned();
            tracing::info!(
                "Resuming {} operation {} from {}",
                self.spec.kind,
                existing.resource_uri,
                self.store.path().display()
            );
            return Ok(TrackedOperation {
                operation_uri: existing.resource_uri.clone(),
                target,
                resumed: true,
            });
        }

        // A target without its operation is a truncated or foreign ledger.
        // Its fate is unknown, so refuse rather than create a second one.
        if let Some(orphan) = ledger.find(&self.spec.resource_type)? {
            return Err(LroError::Format(format!(
                "ledger tracks {} {} without its {} operation",
                orphan.resource_type, orphan.resource_uri, self.spec.operation_type
            )));
        }

        let resource_id = match &self.spec.id_param {
            Some(_) => Some(
                request
                    .resource_id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| generate_resource_id(&self.spec.kind)),
            ),
            None => None,
        };

        let mut payload = request.payload;
        merge_system_labels(&mut payload, &self.spec.labels_owner, &request.system_labels)?;

        let url = self.spec.create_url(resource_id.as_deref());
        let credentials = self.tokens.credentials().await?;

        tracing::info!("Submitting {} to {}", self.spec.kind, url);
        let operation = self
            .api
            .create(&url, &payload, &credentials.token)
            .await
            .map_err(LroError::Submission)?;

        if operation.name.is_empty() {
            return Err(LroError::Submission(ApiError::Decode(format!(
                "response from {} carries no operation name",
                url
            ))));
        }

        let operation_uri = self.spec.resource_uri(&operation.name);
        if let Err(e) = self.spec.validate_operation_uri(&operation_uri) {
            tracing::error!(
                "Created operation {} cannot be tracked and was not recorded",
                operation_uri
            );
            return Err(LroError::Submission(ApiError::Decode(e.to_string())));
        }

        let target = self
            .spec
            .submitted_target_name(&operation)
            .map(|name| ResourceDescriptor::new(&self.spec.resource_type, self.spec.resource_uri(name)));
        if target.is_none() && self.spec.submitted_name.is_some() {
            tracing::warn!(
                "Submission response for {} does not name the {} resource",
                operation_uri,
                self.spec.resource_type
            );
        }

        if let Err(source) = self.record(&mut ledger, &operation_uri, target.as_ref()).await {
            tracing::error!(
                "Operation {} (target {}) was created but could not be recorded in {}: {}",
                operation_uri,
                target.as_ref().map_or("unknown", |t| t.resource_uri.as_str()),
                self.store.path().display(),
                source
            );
            return Err(LroError::Unrecorded {
                operation_uri,
                source: Box::new(source),
            });
        }

        tracing::info!("Recorded operation {}", operation_uri);
        Ok(TrackedOperation {
            operation_uri,
            target,
            resumed: false,
        })
    }

    async fn record(
        &self,
        ledger: &mut Ledger,
        operation_uri: &str,
        target: Option<&ResourceDescriptor>,
    ) -> Result<()> {
        ledger.push(ResourceDescriptor::new(&self.spec.operation_type, operation_uri))?;
        if let Some(target) = target {
            ledger.push(target.clone())?;
        }
        self.store.save(ledger).await
    }
}
