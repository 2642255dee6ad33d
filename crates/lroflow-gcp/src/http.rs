//! Google Cloud REST control plane
//!
//! Direct REST implementation of [`ControlPlane`] with bearer-token auth.

use async_trait::async_trait;
use lroflow_core::{ApiError, ControlPlane, Operation};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// REST client for Google Cloud long-running operations
pub struct HttpControlPlane {
    client: reqwest::Client,
}

impl HttpControlPlane {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("lroflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn create(&self, url: &str, body: &Value, token: &str) -> Result<Operation, ApiError> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_operation(url, response).await
    }

    async fn get_operation(&self, url: &str, token: &str) -> Result<Operation, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_operation(url, response).await
    }
}

async fn decode_operation(url: &str, response: reqwest::Response) -> Result<Operation, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            url: url.to_string(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Human-readable message of a Google API error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{} ({})", envelope.error.message, envelope.error.status)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(512).collect()
            }
        }
    }
}
