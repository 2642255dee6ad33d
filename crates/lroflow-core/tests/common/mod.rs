use async_trait::async_trait;
use lroflow_core::{ApiError, ControlPlane, Credentials, Operation, StaticToken};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const API_BASE: &str = "https://dataproc.googleapis.com/v1";
pub const OPERATION_NAME: &str =
    "projects/test-project/regions/test-location/operations/fake-operation-id";
pub const BATCH_NAME: &str = "projects/test-project/locations/test-location/batches/test-batch-id";
pub const TOKEN: &str = "fake-token";

pub fn operation_uri() -> String {
    format!("{}/{}", API_BASE, OPERATION_NAME)
}

pub fn batch_uri() -> String {
    format!("{}/{}", API_BASE, BATCH_NAME)
}

pub fn tokens() -> StaticToken {
    StaticToken::new(Credentials::new(TOKEN).with_project("project"))
}

pub fn submitted() -> Operation {
    serde_json::from_value(json!({
        "name": OPERATION_NAME,
        "metadata": {"batch": BATCH_NAME},
    }))
    .unwrap()
}

pub fn running() -> Operation {
    serde_json::from_value(json!({"name": OPERATION_NAME, "done": false})).unwrap()
}

pub fn succeeded() -> Operation {
    serde_json::from_value(json!({
        "name": OPERATION_NAME,
        "done": true,
        "response": {"name": BATCH_NAME, "state": "SUCCEEDED"},
    }))
    .unwrap()
}

pub fn failed() -> Operation {
    serde_json::from_value(json!({
        "name": OPERATION_NAME,
        "done": true,
        "error": {"code": 10},
    }))
    .unwrap()
}

pub fn not_found() -> ApiError {
    ApiError::Status {
        code: 404,
        url: operation_uri(),
        message: "Operation not found".to_string(),
    }
}

/// Scripted control plane that records every call
#[derive(Default)]
pub struct FakeControlPlane {
    create_response: Mutex<Option<Result<Operation, ApiError>>>,
    poll_responses: Mutex<VecDeque<Result<Operation, ApiError>>>,
    creates: Mutex<Vec<(String, Value, String)>>,
    gets: Mutex<Vec<(String, String)>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, response: Result<Operation, ApiError>) -> Self {
        *self.create_response.lock().unwrap() = Some(response);
        self
    }

    pub fn on_poll(self, response: Result<Operation, ApiError>) -> Self {
        self.poll_responses.lock().unwrap().push_back(response);
        self
    }

    /// (url, body, token) of every create call
    pub fn creates(&self) -> Vec<(String, Value, String)> {
        self.creates.lock().unwrap().clone()
    }

    /// (url, token) of every status call
    pub fn gets(&self) -> Vec<(String, String)> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn create(&self, url: &str, body: &Value, token: &str) -> Result<Operation, ApiError> {
        self.creates
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone(), token.to_string()));
        self.create_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ApiError::Transport("no create response scripted".into())))
    }

    async fn get_operation(&self, url: &str, token: &str) -> Result<Operation, ApiError> {
        self.gets
            .lock()
            .unwrap()
            .push((url.to_string(), token.to_string()));
        self.poll_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no poll response scripted".into())))
    }
}
