//! Collaborator contracts
//!
//! The core never fetches, parses, resolves versions, rewrites files or talks
//! to a repository host itself. It reaches those services through the traits
//! below. `helper` provides one implementation that forwards every call to an
//! external helper process.

pub mod helper;

pub use helper::{HelperBackend, HelperCommand};

use crate::config::RunConfig;
use crate::domain::{
    CreatedPullRequest, Credential, Dependency, DependencyFile, FetchedFiles, Source, UnlockScope,
};
use crate::error::{CollaboratorError, ConfigError};
use async_trait::async_trait;
use std::sync::Arc;

/// Package managers the default registry has a backend for
pub const SUPPORTED_PACKAGE_MANAGERS: &[&str] = &[
    "bundler",
    "pip",
    "npm_and_yarn",
    "maven",
    "gradle",
    "cargo",
    "hex",
    "composer",
    "nuget",
    "go_modules",
    "elm",
    "submodules",
    "docker",
    "terraform",
    "github_actions",
];

/// Retrieves dependency files from the repository host
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fetch manifests/lockfiles and the commit they were read at
    async fn fetch(
        &self,
        source: &Source,
        credentials: &[Credential],
    ) -> Result<FetchedFiles, CollaboratorError>;
}

/// Turns dependency files into dependency records
#[async_trait]
pub trait FileParser: Send + Sync {
    /// Parse files into dependencies, in manifest order
    async fn parse(
        &self,
        files: &[DependencyFile],
        source: &Source,
        credentials: &[Credential],
    ) -> Result<Vec<Dependency>, CollaboratorError>;
}

/// Answers update questions for one dependency
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// Whether the dependency is already at the latest allowed version
    async fn up_to_date(&self) -> Result<bool, CollaboratorError>;

    /// Whether requirements are unlocked already or may be rewritten
    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CollaboratorError>;

    /// Whether an update is possible within `scope`
    async fn can_update(&self, scope: UnlockScope) -> Result<bool, CollaboratorError>;

    /// The dependency set an update within `scope` produces, target first
    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<Dependency>, CollaboratorError>;

    /// Latest available version
    async fn latest_version(&self) -> Result<Option<String>, CollaboratorError>;
}

/// Builds an `UpdateChecker` per dependency
pub trait UpdateCheckerFactory: Send + Sync {
    /// Create a checker for `dependency`
    fn checker_for(
        &self,
        dependency: &Dependency,
        files: &[DependencyFile],
        credentials: &[Credential],
    ) -> Box<dyn UpdateChecker>;
}

/// Rewrites dependency files for an update
#[async_trait]
pub trait FileUpdater: Send + Sync {
    /// Return the files that change when `dependencies` are updated
    async fn update(
        &self,
        dependencies: &[Dependency],
        files: &[DependencyFile],
        credentials: &[Credential],
    ) -> Result<Vec<DependencyFile>, CollaboratorError>;
}

/// Everything the creator needs to open one pull request
#[derive(Debug, Clone, Copy)]
pub struct PullRequestRequest<'a> {
    pub source: &'a Source,
    pub base_commit: &'a str,
    pub dependencies: &'a [Dependency],
    pub files: &'a [DependencyFile],
    pub credentials: &'a [Credential],
}

/// Opens pull requests on the repository host
#[async_trait]
pub trait PullRequestCreator: Send + Sync {
    /// Open a pull request
    ///
    /// Returns `None` when an equivalent request already exists and
    /// nothing was created.
    async fn create(
        &self,
        request: PullRequestRequest<'_>,
    ) -> Result<Option<CreatedPullRequest>, CollaboratorError>;
}

/// The collaborator set one run uses
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn FileFetcher>,
    pub parser: Arc<dyn FileParser>,
    pub checkers: Arc<dyn UpdateCheckerFactory>,
    pub updater: Arc<dyn FileUpdater>,
    pub creator: Arc<dyn PullRequestCreator>,
}

impl Collaborators {
    /// Use one backend for every contract
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: FileFetcher
            + FileParser
            + UpdateCheckerFactory
            + FileUpdater
            + PullRequestCreator
            + 'static,
    {
        Self {
            fetcher: backend.clone(),
            parser: backend.clone(),
            checkers: backend.clone(),
            updater: backend.clone(),
            creator: backend,
        }
    }
}

/// Looks up collaborators by canonical package manager key
///
/// This is where unknown package managers are rejected; alias resolution
/// passes them through.
pub struct CollaboratorRegistry {
    supported: Vec<String>,
    helper: HelperCommand,
}

impl CollaboratorRegistry {
    /// Registry backed by a helper process for every supported package manager
    pub fn new(helper: HelperCommand) -> Self {
        Self {
            supported: SUPPORTED_PACKAGE_MANAGERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            helper,
        }
    }

    /// Returns true if a backend exists for `package_manager`
    pub fn supports(&self, package_manager: &str) -> bool {
        self.supported.iter().any(|pm| pm == package_manager)
    }

    /// Build the collaborator set for a resolved run configuration
    pub fn lookup(&self, config: &RunConfig) -> Result<Collaborators, ConfigError> {
        if !self.supports(&config.package_manager) {
            return Err(ConfigError::UnsupportedPackageManager {
                package_manager: config.package_manager.clone(),
            });
        }
        let backend = HelperBackend::new(self.helper.clone(), &config.package_manager)
            .with_versioning_strategy(&config.versioning_strategy);
        Ok(Collaborators::from_backend(Arc::new(backend)))
    }
}
