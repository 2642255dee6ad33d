//! Credential capability

use crate::error::Result;
use async_trait::async_trait;

/// Bearer token plus the project it was issued for
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub project: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            project: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("project", &self.project)
            .finish()
    }
}

/// Source of bearer tokens.
///
/// Called before every request, so implementations are expected to cache
/// and refresh tokens themselves.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials>;
}

/// Fixed credentials
#[derive(Debug, Clone)]
pub struct StaticToken {
    credentials: Credentials,
}

impl StaticToken {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn credentials(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }
}
