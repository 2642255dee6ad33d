//! LroFlow core
//!
//! Crash-recoverable submission and polling of cloud long-running
//! operations. A runner records what it submitted in a ledger file before
//! it waits on the result, so it can be killed and re-executed at any point
//! without creating the target twice.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                    Runner                     │
//! │   TargetSpec (per-API configuration)          │
//! └───────┬──────────────┬──────────────┬─────────┘
//!         │              │              │
//! ┌───────▼──────┐ ┌─────▼──────┐ ┌─────▼──────┐
//! │  Submitter   │ │   Poller   │ │ Classifier │
//! └───┬──────┬───┘ └─────┬──────┘ └────────────┘
//!     │      │           │
//! ┌───▼───┐ ┌▼───────────▼──────────┐
//! │Ledger │ │ trait ControlPlane    │
//! └───────┘ └───────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod classifier;
pub mod error;
pub mod id;
pub mod labels;
pub mod ledger;
pub mod operation;
pub mod poller;
pub mod runner;
pub mod submitter;
pub mod target;

// Re-exports
pub use api::ControlPlane;
pub use auth::{Credentials, StaticToken, TokenProvider};
pub use classifier::{TargetResource, classify, classify_poll};
pub use error::{ApiError, LroError, Result};
pub use id::generate_resource_id;
pub use labels::{Labels, merge_system_labels};
pub use ledger::{Ledger, LedgerStore, ResourceDescriptor};
pub use operation::{Operation, OperationError};
pub use poller::{OperationPoller, PollConfig};
pub use runner::{RunOutcome, Runner};
pub use submitter::{SubmitRequest, Submitter, TrackedOperation};
pub use target::{NameSource, StateRule, TargetSpec};
