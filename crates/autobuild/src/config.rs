//! Configuration management for autobuild.
//!
//! Configuration is a YAML file:
//!
//! ```yaml
//! publisher:
//!   endpoint: https://build.example.org
//!   token: s3cr3t
//!   timeout-secs: 60
//! dot-output: lifted.gv
//! ```
//!
//! Lookup order: an explicit path, then `$AUTOBUILD_CONFIG`, then
//! `autobuild.yaml` in the working directory. Without any file the defaults
//! apply. `AUTOBUILD_PUBLISH_URL` and `AUTOBUILD_PUBLISH_TOKEN` override the
//! publisher settings from the file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "autobuild.yaml";

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "AUTOBUILD_CONFIG";

/// Environment variable overriding the publisher endpoint
pub const PUBLISH_URL_ENV: &str = "AUTOBUILD_PUBLISH_URL";

/// Environment variable overriding the publisher token
pub const PUBLISH_TOKEN_ENV: &str = "AUTOBUILD_PUBLISH_TOKEN";

/// Default path for the DOT dump written on cycle failures
pub const DEFAULT_DOT_OUTPUT: &str = "lifted.gv";

/// Configuration for autobuild
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Build server settings
    pub publisher: PublisherConfig,

    /// Where to write the lifted graph when a cycle is found
    pub dot_output: PathBuf,
}

/// Build server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct PublisherConfig {
    /// Base URL of the build server
    pub endpoint: Option<String>,

    /// Bearer token sent with every submission
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            publisher: PublisherConfig::default(),
            dot_output: PathBuf::from(DEFAULT_DOT_OUTPUT),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Find and load configuration, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file (argument or
    /// `$AUTOBUILD_CONFIG`) is missing, or any found file is invalid.
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        Self::discover_with(explicit, working_dir, |key| std::env::var(key).ok())
    }

    fn discover_with<F>(explicit: Option<&Path>, working_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));

        let mut config = match named {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::load(&path)?
            }
            None => {
                let default_path = working_dir.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load(&default_path)?
                } else {
                    tracing::debug!("No configuration file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(env);
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(PUBLISH_URL_ENV).filter(|v| !v.is_empty()) {
            self.publisher.endpoint = Some(url);
        }
        if let Some(token) = env(PUBLISH_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.publisher.token = Some(token);
        }
    }
}
