//! TOML job file
//!
//! A scheduled job can keep its run parameters in a file instead of flags:
//!
//! ```toml
//! package_manager = "pipenv"
//! versioning_strategy = "increase"
//! directory = "/api"
//! branch = "develop"
//! pull_request_limit = 3
//! helper = ["dependabot-helper", "--json"]
//!
//! [source]
//! provider = "github"
//! repo = "acme/widgets"
//!
//! [filter]
//! ignore = ["rails"]
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Run parameters as written in a job file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub package_manager: Option<String>,
    pub versioning_strategy: Option<String>,
    pub directory: Option<String>,
    pub branch: Option<String>,
    /// Accepts an integer or a string so malformed values get a clear error
    pub pull_request_limit: Option<toml::Value>,
    pub helper: Option<Vec<String>>,
    pub credentials: Option<String>,
    pub source: JobSource,
    pub filter: JobFilter,
}

/// `[source]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSource {
    pub provider: Option<String>,
    pub hostname: Option<String>,
    pub api_endpoint: Option<String>,
    pub repo: Option<String>,
}

/// `[filter]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFilter {
    pub allow: Vec<String>,
    pub ignore: Vec<String>,
}

impl JobFile {
    /// Parse a job file from TOML text
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a job file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Returns the pull request limit as the raw text the resolver parses
    pub fn pull_request_limit_text(&self) -> Option<String> {
        self.pull_request_limit.as_ref().map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
