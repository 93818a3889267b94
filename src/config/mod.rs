//! Run configuration
//!
//! This module provides:
//! - Package manager and versioning strategy alias resolution
//! - The immutable `RunConfig` shared by every component of a run
//! - TOML job files and JSON credential files

mod aliases;
mod file;

pub use aliases::{
    canonical_package_manager, canonical_versioning_strategy, DEFAULT_VERSIONING_STRATEGY,
    PACKAGE_MANAGER_ALIASES, VERSIONING_STRATEGY_ALIASES,
};
pub use file::{JobFile, JobFilter, JobSource};

use crate::domain::Credential;
use crate::error::ConfigError;
use crate::update::DependencyFilter;
use std::path::Path;

/// Open pull request limit used when none is configured
pub const DEFAULT_PULL_REQUEST_LIMIT: i64 = 5;

/// Directory used when none is configured
pub const DEFAULT_DIRECTORY: &str = "/";

/// Run parameters before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRunConfig {
    pub package_manager: String,
    pub versioning_strategy: Option<String>,
    pub directory: Option<String>,
    pub branch: Option<String>,
    pub pull_request_limit: Option<String>,
    pub dry_run: bool,
    pub allow: Vec<String>,
    pub ignore: Vec<String>,
}

/// Normalized, immutable run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Canonical package manager key
    pub package_manager: String,
    /// Canonical versioning strategy key
    pub versioning_strategy: String,
    /// Directory holding the manifests
    pub directory: String,
    /// Target branch; the repository default when absent
    pub branch: Option<String>,
    /// Open pull request limit (0 or less means unlimited)
    pub pull_request_limit: i64,
    /// Build updates without requesting pull requests
    pub dry_run: bool,
    /// Which top-level dependencies to consider
    pub filter: DependencyFilter,
}

impl RunConfig {
    /// Normalize raw run parameters
    ///
    /// Alias resolution never fails. Only a malformed pull request limit is
    /// rejected; an absent one falls back to `DEFAULT_PULL_REQUEST_LIMIT`.
    pub fn resolve(raw: RawRunConfig) -> Result<Self, ConfigError> {
        let pull_request_limit = match raw.pull_request_limit.as_deref() {
            Some(value) => parse_pull_request_limit(value)?,
            None => DEFAULT_PULL_REQUEST_LIMIT,
        };

        let directory = raw
            .directory
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());

        let branch = raw
            .branch
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        Ok(Self {
            package_manager: canonical_package_manager(&raw.package_manager),
            versioning_strategy: canonical_versioning_strategy(
                raw.versioning_strategy.as_deref(),
            ),
            directory,
            branch,
            pull_request_limit,
            dry_run: raw.dry_run,
            filter: DependencyFilter::new()
                .with_allow(raw.allow)
                .with_ignore(raw.ignore),
        })
    }
}

/// Parse an open pull request limit; surrounding whitespace is ignored
pub fn parse_pull_request_limit(value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidPullRequestLimit {
            value: value.to_string(),
        })
}

/// Load credentials from a JSON file holding an array of records
pub fn load_credentials(path: &Path) -> Result<Vec<Credential>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Credentials {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
