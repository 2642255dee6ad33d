//! Resource ledger
//!
//! Manages the `gcp_resources` file: a JSON record of every cloud object a
//! runner has already attempted to create. The file outlives the process, so
//! a restarted runner reads it to decide whether to resume or submit.

use crate::error::{LroError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// One tracked cloud object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Type tag (e.g. "DataprocLro", "DataprocBatch")
    #[serde(alias = "resourceType")]
    pub resource_type: String,

    /// Fully-qualified URI of the object
    #[serde(alias = "resourceUri")]
    pub resource_uri: String,
}

impl ResourceDescriptor {
    pub fn new(resource_type: impl Into<String>, resource_uri: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_uri: resource_uri.into(),
        }
    }
}

/// Ordered list of descriptors, at most one per resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    resources: Vec<ResourceDescriptor>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Find the descriptor of a given type.
    ///
    /// More than one match means the ledger cannot say which object is
    /// authoritative, so this fails instead of picking one.
    pub fn find(&self, resource_type: &str) -> Result<Option<&ResourceDescriptor>> {
        let mut matches = self
            .resources
            .iter()
            .filter(|r| r.resource_type == resource_type);
        let first = matches.next();
        if matches.next().is_some() {
            return Err(LroError::Format(format!(
                "ledger holds more than one {} resource",
                resource_type
            )));
        }
        Ok(first)
    }

    /// Append a descriptor; a second descriptor of the same type is refused
    pub fn push(&mut self, descriptor: ResourceDescriptor) -> Result<()> {
        if self.find(&descriptor.resource_type)?.is_some() {
            return Err(LroError::Format(format!(
                "ledger already tracks a {} resource",
                descriptor.resource_type
            )));
        }
        self.resources.push(descriptor);
        Ok(())
    }

    /// Check the one-descriptor-per-type invariant across the whole ledger
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.resource_type.as_str()) {
                return Err(LroError::Format(format!(
                    "ledger holds more than one {} resource",
                    resource.resource_type
                )));
            }
        }
        Ok(())
    }
}

/// Reads and writes a ledger file
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next ledger is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the ledger. A missing or empty file is an empty ledger.
    pub async fn load(&self) -> Result<Ledger> {
        if !fs::try_exists(&self.path).await? {
            tracing::debug!("Ledger {} not found, starting empty", self.path.display());
            return Ok(Ledger::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            tracing::debug!("Ledger {} is empty", self.path.display());
            return Ok(Ledger::new());
        }

        let ledger: Ledger = serde_json::from_str(&content).map_err(|e| {
            LroError::Format(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        ledger.validate()?;

        tracing::debug!(
            "Loaded ledger {} with {} resources",
            self.path.display(),
            ledger.len()
        );
        Ok(ledger)
    }

    /// Replace the ledger file.
    ///
    /// The new content is fully written and synced to a staging file, then
    /// renamed over the old one, so readers see either the old or the new
    /// ledger and never a partial write.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        ledger.validate()?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).await?;

        let staging = self.staging_path();
        let content = serde_json::to_string(ledger)?;
        let mut file = fs::File::create(&staging).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;
        sync_dir(&parent).await?;

        tracing::debug!(
            "Saved ledger {} with {} resources",
            self.path.display(),
            ledger.len()
        );
        Ok(())
    }
}

/// Persist a rename by syncing the directory entry
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir).await?.sync_all().await?;
    Ok(())
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
