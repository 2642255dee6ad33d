//! Runner: submit or resume, poll, classify

use crate::api::ControlPlane;
use crate::auth::TokenProvider;
use crate::classifier::{TargetResource, classify_poll};
use crate::error::Result;
use crate::ledger::LedgerStore;
use crate::poller::{OperationPoller, PollConfig};
use crate::submitter::{SubmitRequest, Submitter};
use crate::target::TargetSpec;
use std::sync::Arc;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub target: TargetResource,
    pub operation_uri: String,
    pub resumed: bool,
}

/// Tracks exactly one target resource through its creation operation
pub struct Runner {
    spec: TargetSpec,
    ledger: LedgerStore,
    api: Arc<dyn ControlPlane>,
    tokens: Arc<dyn TokenProvider>,
    poll: PollConfig,
}

impl Runner {
    pub fn new(
        spec: TargetSpec,
        ledger: LedgerStore,
        api: Arc<dyn ControlPlane>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            spec,
            ledger,
            api,
            tokens,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub async fn run(&self, request: SubmitRequest) -> Result<RunOutcome> {
        let submitter = Submitter::new(
            &self.spec,
            &self.ledger,
            self.api.as_ref(),
            self.tokens.as_ref(),
        );
        let tracked = submitter.submit_or_resume(request).await?;

        let poller = OperationPoller::new(self.api.as_ref(), self.tokens.as_ref(), &self.poll);
        let polled = poller.poll_until_done(&tracked.operation_uri).await;
        let target = classify_poll(&self.spec, &tracked, polled)?;

        Ok(RunOutcome {
            target,
            operation_uri: tracked.operation_uri,
            resumed: tracked.resumed,
        })
    }
}
