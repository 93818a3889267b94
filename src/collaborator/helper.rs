//! Helper-process collaborator backend
//!
//! Every collaborator call runs the configured helper command once. The
//! request goes to stdin as JSON:
//!
//! ```json
//! {"function": "can_update", "package_manager": "bundler", "args": {...}}
//! ```
//!
//! and the helper answers on stdout with `{"result": ...}` or
//! `{"error": "..."}`.

use super::{
    FileFetcher, FileParser, FileUpdater, PullRequestCreator, PullRequestRequest, UpdateChecker,
    UpdateCheckerFactory,
};
use crate::domain::{
    CreatedPullRequest, Credential, Dependency, DependencyFile, FetchedFiles, Source, UnlockScope,
};
use crate::error::{CollaboratorError, ConfigError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Program and arguments used to start the helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl HelperCommand {
    /// Create from a command line split into words; the first word is the program
    pub fn new(command: Vec<String>) -> Result<Self, ConfigError> {
        let mut words = command.into_iter().filter(|w| !w.is_empty());
        let program = words.next().ok_or(ConfigError::MissingHelper)?;
        Ok(Self {
            program,
            args: words.collect(),
            working_dir: None,
        })
    }

    /// Run the helper in `dir` (builder pattern)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns the program name
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[derive(Serialize)]
struct HelperRequest<'a> {
    function: &'a str,
    package_manager: &'a str,
    args: Value,
}

#[derive(Deserialize)]
struct HelperResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Collaborator for a single package manager backed by a helper process
#[derive(Debug, Clone)]
pub struct HelperBackend {
    command: HelperCommand,
    package_manager: String,
    versioning_strategy: String,
}

impl HelperBackend {
    /// Create a backend for `package_manager`
    pub fn new(command: HelperCommand, package_manager: impl Into<String>) -> Self {
        Self {
            command,
            package_manager: package_manager.into(),
            versioning_strategy: crate::config::DEFAULT_VERSIONING_STRATEGY.to_string(),
        }
    }

    /// Set the versioning strategy forwarded to update checks (builder pattern)
    pub fn with_versioning_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.versioning_strategy = strategy.into();
        self
    }

    /// Run one helper function and decode its result
    async fn call<T: DeserializeOwned>(
        &self,
        collaborator: &str,
        function: &str,
        args: Value,
    ) -> Result<T, CollaboratorError> {
        let fail = |message: String| CollaboratorError::new(collaborator, message);

        let request = serde_json::to_vec(&HelperRequest {
            function,
            package_manager: &self.package_manager,
            args,
        })
        .map_err(|e| fail(format!("failed to encode request: {}", e)))?;

        debug!(
            helper = %self.command.program,
            function,
            package_manager = %self.package_manager,
            "Calling helper"
        );

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| fail(format!("failed to start {}: {}", self.command.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&request).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(fail(format!("failed to write request: {}", e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| fail(format!("helper did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "{} exited with {}: {}",
                function,
                output.status,
                stderr.trim()
            )));
        }

        let response: HelperResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| fail(format!("invalid response to {}: {}", function, e)))?;

        if let Some(error) = response.error {
            return Err(fail(error));
        }

        serde_json::from_value(response.result.unwrap_or(Value::Null))
            .map_err(|e| fail(format!("unexpected result from {}: {}", function, e)))
    }
}

#[async_trait]
impl FileFetcher for HelperBackend {
    async fn fetch(
        &self,
        source: &Source,
        credentials: &[Credential],
    ) -> Result<FetchedFiles, CollaboratorError> {
        self.call(
            "file fetcher",
            "fetch_files",
            json!({ "source": source, "credentials": credentials }),
        )
        .await
    }
}

#[async_trait]
impl FileParser for HelperBackend {
    async fn parse(
        &self,
        files: &[DependencyFile],
        source: &Source,
        credentials: &[Credential],
    ) -> Result<Vec<Dependency>, CollaboratorError> {
        self.call(
            "file parser",
            "parse",
            json!({ "dependency_files": files, "source": source, "credentials": credentials }),
        )
        .await
    }
}

/// Update checker for one dependency; each query is one helper call
pub struct HelperUpdateChecker {
    backend: HelperBackend,
    dependency: Dependency,
    files: Vec<DependencyFile>,
    credentials: Vec<Credential>,
}

impl HelperUpdateChecker {
    fn args(&self, scope: Option<UnlockScope>) -> Value {
        let mut args = json!({
            "dependency": self.dependency,
            "dependency_files": self.files,
            "credentials": self.credentials,
            "versioning_strategy": self.backend.versioning_strategy,
        });
        if let Some(scope) = scope {
            args["requirements_to_unlock"] = json!(scope);
        }
        args
    }

    async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        scope: Option<UnlockScope>,
    ) -> Result<T, CollaboratorError> {
        self.backend
            .call("update checker", function, self.args(scope))
            .await
    }
}

#[async_trait]
impl UpdateChecker for HelperUpdateChecker {
    async fn up_to_date(&self) -> Result<bool, CollaboratorError> {
        self.query("up_to_date", None).await
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CollaboratorError> {
        self.query("requirements_unlocked_or_can_be", None).await
    }

    async fn can_update(&self, scope: UnlockScope) -> Result<bool, CollaboratorError> {
        self.query("can_update", Some(scope)).await
    }

    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<Dependency>, CollaboratorError> {
        self.query("updated_dependencies", Some(scope)).await
    }

    async fn latest_version(&self) -> Result<Option<String>, CollaboratorError> {
        self.query("latest_version", None).await
    }
}

impl UpdateCheckerFactory for HelperBackend {
    fn checker_for(
        &self,
        dependency: &Dependency,
        files: &[DependencyFile],
        credentials: &[Credential],
    ) -> Box<dyn UpdateChecker> {
        Box::new(HelperUpdateChecker {
            backend: self.clone(),
            dependency: dependency.clone(),
            files: files.to_vec(),
            credentials: credentials.to_vec(),
        })
    }
}

#[async_trait]
impl FileUpdater for HelperBackend {
    async fn update(
        &self,
        dependencies: &[Dependency],
        files: &[DependencyFile],
        credentials: &[Credential],
    ) -> Result<Vec<DependencyFile>, CollaboratorError> {
        self.call(
            "file updater",
            "update_files",
            json!({
                "dependencies": dependencies,
                "dependency_files": files,
                "credentials": credentials,
            }),
        )
        .await
    }
}

#[async_trait]
impl PullRequestCreator for HelperBackend {
    async fn create(
        &self,
        request: PullRequestRequest<'_>,
    ) -> Result<Option<CreatedPullRequest>, CollaboratorError> {
        self.call(
            "pull request creator",
            "create_pull_request",
            json!({
                "source": request.source,
                "base_commit": request.base_commit,
                "dependencies": request.dependencies,
                "files": request.files,
                "credentials": request.credentials,
            }),
        )
        .await
    }
}
