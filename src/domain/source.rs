//! Repository source descriptor, credentials and dependency files

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the repository being updated; passed unchanged to collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Repository host provider (e.g. "github", "gitlab")
    pub provider: String,
    /// Host name, when not the provider's public host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// API endpoint, when not the provider's public endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Repository identifier (e.g. "owner/name")
    pub repo: String,
    /// Directory holding the manifests, relative to the repository root
    pub directory: String,
    /// Target branch; the repository default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.provider, self.repo, self.directory)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}

/// An opaque credential record
///
/// The core never inspects credentials; `Debug` does not print them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(serde_json::Map<String, serde_json::Value>);

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([redacted])")
    }
}

/// A manifest or lockfile as fetched from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// File name relative to `directory`
    pub name: String,
    /// Directory the file lives in
    pub directory: String,
    /// File content
    pub content: String,
}

impl DependencyFile {
    /// Creates a new dependency file
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            content: content.into(),
        }
    }
}

/// Files fetched from the repository plus the commit they were read at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFiles {
    /// Manifest and lock files
    pub files: Vec<DependencyFile>,
    /// Commit the files were read at; base for pull requests
    pub commit: String,
}
