//! Operation polling

use crate::api::ControlPlane;
use crate::auth::TokenProvider;
use crate::error::{LroError, Result};
use crate::operation::Operation;
use std::time::Duration;
use tokio::time::sleep;

/// Delay schedule between status requests
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Growth factor per attempt; 1.0 polls at a fixed interval
    pub multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(20),
            max_interval: Duration::from_secs(300),
            multiplier: 1.0,
        }
    }
}

impl PollConfig {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
        }
    }

    /// Delay before the given (0-based) status request
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let secs = self.initial_interval.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_interval.as_secs_f64() {
            return self.max_interval;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Polls one operation until it is done.
///
/// There is no attempt limit: the orchestrator owns the overall timeout and
/// a killed runner simply resumes from the ledger on its next run.
pub struct OperationPoller<'a> {
    api: &'a dyn ControlPlane,
    tokens: &'a dyn TokenProvider,
    config: &'a PollConfig,
}

impl<'a> OperationPoller<'a> {
    pub fn new(
        api: &'a dyn ControlPlane,
        tokens: &'a dyn TokenProvider,
        config: &'a PollConfig,
    ) -> Self {
        Self {
            api,
            tokens,
            config,
        }
    }

    /// Sleep, fetch, repeat until `done`. Request failures end the loop.
    pub async fn poll_until_done(&self, operation_uri: &str) -> Result<Operation> {
        let mut attempt: u32 = 0;
        loop {
            sleep(self.config.delay_for_attempt(attempt)).await;

            let credentials = self.tokens.credentials().await?;
            let operation = self
                .api
                .get_operation(operation_uri, &credentials.token)
                .await
                .map_err(|source| LroError::Polling {
                    uri: operation_uri.to_string(),
                    source,
                })?;

            if operation.done {
                tracing::info!("Operation {} is done", operation_uri);
                return Ok(operation);
            }

            tracing::debug!(attempt, "Operation {} still running", operation_uri);
            attempt = attempt.saturating_add(1);
        }
    }
}
