//! Control plane abstraction
//!
//! The protocol only needs two calls from a cloud API: submit a creation
//! request and read an operation's status. Concrete HTTP clients live in
//! provider crates; tests substitute in-memory fakes.

use crate::error::ApiError;
use crate::operation::Operation;
use async_trait::async_trait;
use serde_json::Value;

/// Cloud control plane reachable with a bearer token
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// `POST` a creation request; the response is the new operation
    async fn create(&self, url: &str, body: &Value, token: &str) -> Result<Operation, ApiError>;

    /// `GET` the current state of an operation
    async fn get_operation(&self, url: &str, token: &str) -> Result<Operation, ApiError>;
}
