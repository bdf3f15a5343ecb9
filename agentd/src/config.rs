//! # Agent Configuration
//!
//! Two JSON documents drive the agent:
//!
//! - the host configuration (`--config`): which modules to load and how
//!   to size notification buffers
//! - the startup configuration (`--startup`): persisted configuration of
//!   each module, applied between `init` and `init2`
//!
//! ```json
//! { "version": 1, "modules": { "starter": { "appName": "fw" } } }
//! ```

use ipc::MessagePayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported startup configuration version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A module the agent loads at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    /// Any revision when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

/// Host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Modules to load, in load order
    pub modules: Vec<ModuleSpec>,
    /// Startup configuration file, overridden by `--startup`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_config: Option<PathBuf>,
    /// Notifications kept for late subscribers
    pub notification_history: usize,
    /// Pending notifications per subscriber before the oldest are dropped
    pub subscriber_queue: usize,
    /// Interval between module polls
    pub poll_interval_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            modules: vec![
                ModuleSpec::new(y_starter::MODULE_NAME).with_revision(y_starter::REVISION)
            ],
            startup_config: None,
            notification_history: crate::subscriptions::DEFAULT_HISTORY,
            subscriber_queue: crate::subscriptions::DEFAULT_QUEUE,
            poll_interval_ms: 500,
        }
    }
}

impl HostConfig {
    /// Reads a host configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), modules = config.modules.len(), "Host configuration loaded");
        Ok(config)
    }

    /// Checks value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscriber_queue == 0 {
            return Err(ConfigError::Invalid("subscriber_queue must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Persisted configuration of every module, keyed by module name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupConfig {
    pub version: u32,
    #[serde(default)]
    pub modules: BTreeMap<String, serde_json::Value>,
}

impl StartupConfig {
    pub const CURRENT_VERSION: u32 = 1;

    /// An empty configuration: every module starts from its defaults
    pub fn empty() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            modules: BTreeMap::new(),
        }
    }

    /// Reads a startup configuration file
    ///
    /// A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No startup configuration, using defaults");
            return Ok(Self::empty());
        }
        let text = read(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check_version()?;
        Ok(config)
    }

    fn check_version(&self) -> Result<(), ConfigError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                expected: Self::CURRENT_VERSION,
            });
        }
        Ok(())
    }

    /// Returns the persisted configuration of `module`
    pub fn module(&self, module: &str) -> Option<MessagePayload> {
        self.modules
            .get(module)
            .cloned()
            .map(MessagePayload::from_value)
    }

    /// Sets the persisted configuration of `module`
    pub fn set_module(&mut self, module: impl Into<String>, config: serde_json::Value) {
        self.modules.insert(module.into(), config);
    }

    /// Writes the configuration to `path`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self::empty()
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
