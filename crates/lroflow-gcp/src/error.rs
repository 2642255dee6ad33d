//! Google Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("Invalid model name '{0}': expected projects/<project>/locations/<location>/models/<model>[@<version>]")]
    InvalidModelName(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid executor input: {0}")]
    InvalidExecutorInput(String),

    #[error("Unknown target type: {0}")]
    UnknownTargetType(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Lro(#[from] lroflow_core::LroError),
}

pub type Result<T> = std::result::Result<T, GcpError>;
