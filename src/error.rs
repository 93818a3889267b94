//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: Invalid run parameters or unsupported package managers
//! - CollaboratorError: A fetch/parse/check/update/create service failed
//! - RunError: A collaborator failure with the run stage it happened in

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors that aborted an update run
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The open pull request limit was not an integer
    #[error("invalid pull request limit '{value}': expected an integer (0 or less means unlimited)")]
    InvalidPullRequestLimit { value: String },

    /// No collaborator backend handles this package manager
    #[error("unsupported package manager '{package_manager}'")]
    UnsupportedPackageManager { package_manager: String },

    /// No package manager was given
    #[error("missing package manager: pass --package-manager or set it in the config file")]
    MissingPackageManager,

    /// No repository was given
    #[error("missing repository: pass --repo or set it in the config file")]
    MissingRepository,

    /// No helper command was given
    #[error("missing helper command: pass --helper or set it in the config file")]
    MissingHelper,

    /// Failed to read or parse the TOML config file
    #[error("failed to load config file {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    /// Failed to read or parse the credentials file
    #[error("failed to load credentials from {path}: {message}")]
    Credentials { path: PathBuf, message: String },
}

/// Failure reported by an external collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collaborator} failed: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed (e.g. "file fetcher")
    pub collaborator: String,
    /// Human-readable failure message
    pub message: String,
}

impl CollaboratorError {
    /// Creates a new CollaboratorError
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort a whole update run
#[derive(Error, Debug)]
pub enum RunError {
    /// Fetching dependency files failed
    #[error("failed to fetch dependency files: {0}")]
    Fetch(#[source] CollaboratorError),

    /// Parsing dependency files failed
    #[error("failed to parse dependency files: {0}")]
    Parse(#[source] CollaboratorError),

    /// An update checker query failed
    #[error("failed to check {dependency}: {source}")]
    Check {
        dependency: String,
        #[source]
        source: CollaboratorError,
    },

    /// Building updated files failed
    #[error("failed to update files for {dependency}: {source}")]
    Update {
        dependency: String,
        #[source]
        source: CollaboratorError,
    },

    /// The pull request creator failed outright (not a status response)
    #[error("failed to create pull request for {dependency}: {source}")]
    PullRequest {
        dependency: String,
        #[source]
        source: CollaboratorError,
    },
}

impl RunError {
    /// Creates a Check error
    pub fn check(dependency: impl Into<String>, source: CollaboratorError) -> Self {
        RunError::Check {
            dependency: dependency.into(),
            source,
        }
    }

    /// Creates an Update error
    pub fn update(dependency: impl Into<String>, source: CollaboratorError) -> Self {
        RunError::Update {
            dependency: dependency.into(),
            source,
        }
    }

    /// Creates a PullRequest error
    pub fn pull_request(dependency: impl Into<String>, source: CollaboratorError) -> Self {
        RunError::PullRequest {
            dependency: dependency.into(),
            source,
        }
    }
}
