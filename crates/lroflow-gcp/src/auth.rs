//! Google Cloud credential providers
//!
//! - [`EnvToken`]: a pre-issued token in `GOOGLE_OAUTH_ACCESS_TOKEN`
//! - [`MetadataServer`]: the GCE/GKE metadata server (default inside Google Cloud)
//! - [`GcloudCli`]: `gcloud auth print-access-token` (local development)

use async_trait::async_trait;
use lroflow_core::{Credentials, LroError, TokenProvider};
use serde::Deserialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Mutex;

pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// How the runner obtains bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// See [`default_provider`]
    #[default]
    Auto,
    Env,
    Metadata,
    Gcloud,
}

/// Build the token provider for a mode
pub fn token_provider(mode: AuthMode) -> lroflow_core::Result<Arc<dyn TokenProvider>> {
    match mode {
        AuthMode::Auto => Ok(default_provider()),
        AuthMode::Env => EnvToken::from_env()
            .map(|p| Arc::new(p) as Arc<dyn TokenProvider>)
            .ok_or_else(|| LroError::Auth(format!("{} is not set", ACCESS_TOKEN_ENV))),
        AuthMode::Metadata => Ok(Arc::new(MetadataServer::new())),
        AuthMode::Gcloud => Ok(Arc::new(GcloudCli::new())),
    }
}

/// `GOOGLE_OAUTH_ACCESS_TOKEN` if set, otherwise the metadata server
pub fn default_provider() -> Arc<dyn TokenProvider> {
    match EnvToken::from_env() {
        Some(provider) => {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            Arc::new(provider)
        }
        None => {
            tracing::debug!("Using the metadata server for access tokens");
            Arc::new(MetadataServer::new())
        }
    }
}

/// Token taken from the environment
#[derive(Debug, Clone)]
pub struct EnvToken {
    credentials: Credentials,
}

impl EnvToken {
    /// `None` when `GOOGLE_OAUTH_ACCESS_TOKEN` is unset or blank
    pub fn from_env() -> Option<Self> {
        let token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())?;
        let mut credentials = Credentials::new(token.trim());
        if let Ok(project) = std::env::var(PROJECT_ENV) {
            if !project.is_empty() {
                credentials = credentials.with_project(project);
            }
        }
        Some(Self { credentials })
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn credentials(&self) -> lroflow_core::Result<Credentials> {
        Ok(self.credentials.clone())
    }
}

/// GCE metadata server token source
pub struct MetadataServer {
    client: reqwest::Client,
    base: String,
    cache: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    credentials: Credentials,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl MetadataServer {
    pub fn new() -> Self {
        let host = std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());
        Self::with_base(format!("http://{}/computeMetadata/v1", host))
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
            cache: Mutex::new(None),
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, LroError> {
        let url = format!("{}/{}", self.base, path);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| LroError::Auth(format!("metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(LroError::Auth(format!(
                "metadata server returned {} for {}",
                response.status(),
                path
            )));
        }
        Ok(response)
    }

    async fn fetch(&self) -> Result<CachedToken, LroError> {
        let token: TokenResponse = self
            .get("instance/service-accounts/default/token")
            .await?
            .json()
            .await
            .map_err(|e| LroError::Auth(format!("malformed token response: {}", e)))?;

        let project = match self.get("project/project-id").await {
            Ok(response) => response.text().await.ok().filter(|p| !p.is_empty()),
            Err(e) => {
                tracing::debug!("Project id unavailable: {}", e);
                None
            }
        };

        let mut credentials = Credentials::new(token.access_token);
        if let Some(project) = project {
            credentials = credentials.with_project(project);
        }
        Ok(CachedToken {
            credentials,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

impl Default for MetadataServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for MetadataServer {
    async fn credentials(&self) -> lroflow_core::Result<Credentials> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(cached.credentials.clone());
            }
        }

        tracing::debug!("Fetching access token from the metadata server");
        let fresh = self.fetch().await?;
        let credentials = fresh.credentials.clone();
        *cache = Some(fresh);
        Ok(credentials)
    }
}

/// gcloud CLI token source
pub struct GcloudCli {
    program: String,
}

impl GcloudCli {
    pub fn new() -> Self {
        Self {
            program: "gcloud".to_string(),
        }
    }

    /// Run gcloud and return trimmed stdout
    async fn run_command(&self, args: &[&str]) -> Result<String, LroError> {
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LroError::Auth(format!("cannot run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LroError::Auth(format!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GcloudCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for GcloudCli {
    async fn credentials(&self) -> lroflow_core::Result<Credentials> {
        let token = self.run_command(&["auth", "print-access-token"]).await?;
        if token.is_empty() {
            return Err(LroError::Auth("gcloud returned an empty access token".into()));
        }

        let mut credentials = Credentials::new(token);
        match self.run_command(&["config", "get-value", "project"]).await {
            Ok(project) if !project.is_empty() => credentials = credentials.with_project(project),
            _ => {}
        }
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_env_token() {
        let provider = temp_env::with_vars(
            [
                (ACCESS_TOKEN_ENV, Some(" env-token \n")),
                (PROJECT_ENV, Some("env-project")),
            ],
            EnvToken::from_env,
        )
        .unwrap();

        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.token, "env-token");
        assert_eq!(credentials.project.as_deref(), Some("env-project"));
    }

    #[test]
    #[serial]
    fn test_env_mode_requires_token() {
        temp_env::with_var_unset(ACCESS_TOKEN_ENV, || {
            assert!(EnvToken::from_env().is_none());
            assert!(matches!(
                token_provider(AuthMode::Env),
                Err(LroError::Auth(_))
            ));
            assert!(token_provider(AuthMode::Auto).is_ok());
        });
    }

    #[tokio::test]
    async fn test_unreachable_metadata_server_is_auth_error() {
        let provider = MetadataServer::with_base("http://127.0.0.1:9/computeMetadata/v1");
        assert!(matches!(
            provider.credentials().await,
            Err(LroError::Auth(_))
        ));
    }
}
