//! Runner settings
//!
//! Settings are optional; every field has a default. The file is looked up
//! in this order:
//! 1. `LROFLOW_CONFIG_PATH` (must exist when set)
//! 2. `./lroflow.yaml`
//! 3. `<config dir>/lroflow/config.yaml`

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "LROFLOW_CONFIG_PATH";
pub const POLL_INTERVAL_ENV: &str = "LROFLOW_POLL_INTERVAL_SECS";

const LOCAL_FILE: &str = "lroflow.yaml";
const APP_DIR: &str = "lroflow";
const GLOBAL_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll: PollSettings,
    pub endpoints: EndpointSettings,
}

/// Delay schedule between operation status requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub initial_interval_secs: u64,
    pub max_interval_secs: u64,
    pub multiplier: f64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_interval_secs: 20,
            max_interval_secs: 300,
            multiplier: 1.0,
        }
    }
}

impl PollSettings {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_secs(self.initial_interval_secs)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_interval_secs == 0 {
            return Err(invalid("poll.initial_interval_secs", "must be at least 1"));
        }
        if self.max_interval_secs < self.initial_interval_secs {
            return Err(invalid(
                "poll.max_interval_secs",
                "must not be smaller than poll.initial_interval_secs",
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(invalid("poll.multiplier", "must be a finite number >= 1.0"));
        }
        Ok(())
    }
}

/// API root overrides, e.g. for private service endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Dataproc API root, e.g. `https://dataproc.googleapis.com/v1`
    pub dataproc: Option<String>,

    /// Vertex AI API root; `{location}` is replaced with the target location
    pub vertex: Option<String>,
}

impl EndpointSettings {
    pub fn vertex_for(&self, location: &str) -> Option<String> {
        self.vertex
            .as_ref()
            .map(|template| template.replace("{location}", location))
    }
}

impl Settings {
    /// Load settings from the first file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file()? {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env_overrides()?;
        settings.poll.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings = serde_yaml::from_str(&content).map_err(|source| {
            ConfigError::InvalidSettings {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(POLL_INTERVAL_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(POLL_INTERVAL_ENV, "must be a whole number of seconds"))?;
            self.poll.initial_interval_secs = secs;
            if self.poll.max_interval_secs < secs {
                self.poll.max_interval_secs = secs;
            }
        }
        Ok(())
    }
}

/// Locate the settings file, if any
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    // 1. Explicit path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if !path.exists() {
            return Err(ConfigError::SettingsFileNotFound(path));
        }
        return Ok(Some(path));
    }

    // 2. Current directory
    let local = std::env::current_dir()?.join(LOCAL_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    // 3. User config directory
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join(APP_DIR).join(GLOBAL_FILE);
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.poll.initial_interval(), Duration::from_secs(20));
        assert_eq!(settings.poll.multiplier, 1.0);
        assert!(settings.endpoints.dataproc.is_none());
        assert!(settings.poll.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lroflow.yaml");
        fs::write(
            &path,
            "poll:\n  initial_interval_secs: 5\n  multiplier: 1.5\nendpoints:\n  vertex: https://{location}-aiplatform.example.com/v1\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.poll.initial_interval_secs, 5);
        assert_eq!(settings.poll.max_interval_secs, 300);
        assert_eq!(settings.poll.multiplier, 1.5);
        assert_eq!(
            settings.endpoints.vertex_for("europe-west4").as_deref(),
            Some("https://europe-west4-aiplatform.example.com/v1")
        );
    }

    #[test]
    fn test_from_file_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lroflow.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_from_file_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lroflow.yaml");
        fs::write(&path, "poll: [1, 2").unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_schedule() {
        let poll = PollSettings {
            initial_interval_secs: 0,
            ..Default::default()
        };
        assert!(poll.validate().is_err());

        let poll = PollSettings {
            initial_interval_secs: 60,
            max_interval_secs: 30,
            ..Default::default()
        };
        assert!(poll.validate().is_err());

        let poll = PollSettings {
            multiplier: 0.5,
            ..Default::default()
        };
        assert!(poll.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_config_path_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "poll:\n  initial_interval_secs: 7\n").unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (POLL_INTERVAL_ENV, None),
            ],
            || {
                assert_eq!(find_settings_file().unwrap(), Some(path.clone()));
                let settings = Settings::load().unwrap();
                assert_eq!(settings.poll.initial_interval_secs, 7);
            },
        );
    }

    #[test]
    #[serial]
    fn test_config_path_env_missing_file() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/nonexistent/lroflow.yaml"), || {
            assert!(matches!(
                find_settings_file(),
                Err(ConfigError::SettingsFileNotFound(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_poll_interval_env_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "poll:\n  max_interval_secs: 30\n").unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (POLL_INTERVAL_ENV, Some("45")),
            ],
            || {
                let settings = Settings::load().unwrap();
                assert_eq!(settings.poll.initial_interval_secs, 45);
                assert_eq!(settings.poll.max_interval_secs, 45);
            },
        );

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (POLL_INTERVAL_ENV, Some("soon")),
            ],
            || {
                assert!(matches!(
                    Settings::load(),
                    Err(ConfigError::InvalidValue { .. })
                ));
            },
        );
    }

    #[test]
    #[serial]
    fn test_local_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join(LOCAL_FILE), "poll:\n  initial_interval_secs: 3\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let found = temp_env::with_var_unset(CONFIG_PATH_ENV, find_settings_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(found.unwrap().unwrap().ends_with(LOCAL_FILE));
    }
}
