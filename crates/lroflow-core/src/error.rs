//! Error types for LRO submission and tracking

use thiserror::Error;

/// Failure reported by a control plane call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("HTTP {code} from {url}: {message}")]
    Status {
        code: u16,
        url: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Errors raised while submitting, resuming or polling an operation
#[derive(Error, Debug)]
pub enum LroError {
    /// The ledger holds state this runner cannot trust.
    #[error("Invalid ledger state: {0}")]
    Format(String),

    #[error("Submission failed: {0}")]
    Submission(ApiError),

    /// The operation exists server-side but the ledger does not name it.
    #[error("Operation {operation_uri} was created but could not be recorded: {source}")]
    Unrecorded {
        operation_uri: String,
        #[source]
        source: Box<LroError>,
    },

    #[error("Polling {uri} failed: {source}")]
    Polling {
        uri: String,
        #[source]
        source: ApiError,
    },

    #[error("Operation {name} failed with code {code}: {message}")]
    OperationFailed {
        name: String,
        code: i32,
        message: String,
    },

    #[error("{resource} finished in state {state}")]
    ResourceFailed { resource: String, state: String },

    #[error("Unexpected operation result: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LroError {
    /// Whether re-running the whole invocation can succeed without operator action.
    ///
    /// Only submission failures qualify: nothing was recorded, so a rerun
    /// starts from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LroError::Submission(_))
    }
}

pub type Result<T> = std::result::Result<T, LroError>;
