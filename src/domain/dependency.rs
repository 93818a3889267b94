//! Dependency information structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single declared requirement for a dependency (one per manifest entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Requirement string as written in the manifest (e.g. "~> 1.2", ">=2.0")
    pub requirement: Option<String>,
    /// Manifest file this requirement was declared in
    pub file: String,
    /// Dependency groups (e.g. "default", "development")
    #[serde(default)]
    pub groups: Vec<String>,
    /// Ecosystem-specific source details, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
}

impl Requirement {
    /// Creates a requirement declared in `file`
    pub fn new(requirement: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            requirement: Some(requirement.into()),
            file: file.into(),
            groups: Vec::new(),
            source: None,
        }
    }
}

/// A package dependency as reported by the file parser
///
/// Records are never mutated by the core; an update produces a new record
/// carrying the old state in `previous_version` / `previous_requirements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name, unique within one dependency set
    pub name: String,
    /// Resolved version; absent for purely range-constrained ecosystems
    #[serde(default)]
    pub version: Option<String>,
    /// Declared requirements
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Whether the project manifest declares this dependency directly
    #[serde(default)]
    pub top_level: bool,
    /// Canonical package manager key
    pub package_manager: String,
    /// Version before an update (only set on updated records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    /// Requirements before an update (only set on updated records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_requirements: Option<Vec<Requirement>>,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        top_level: bool,
        package_manager: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            requirements: Vec::new(),
            top_level,
            package_manager: package_manager.into(),
            previous_version: None,
            previous_requirements: None,
        }
    }

    /// Creates a top-level dependency with a resolved version
    pub fn top_level(
        name: impl Into<String>,
        version: impl Into<String>,
        package_manager: impl Into<String>,
    ) -> Self {
        Self::new(name, Some(version.into()), true, package_manager)
    }

    /// Creates a transitive dependency with a resolved version
    pub fn transitive(
        name: impl Into<String>,
        version: impl Into<String>,
        package_manager: impl Into<String>,
    ) -> Self {
        Self::new(name, Some(version.into()), false, package_manager)
    }

    /// Adds a requirement (builder pattern)
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Returns an updated copy of this record at `version`, remembering the old state
    pub fn updated_to(&self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            previous_version: self.version.clone(),
            previous_requirements: Some(self.requirements.clone()),
            ..self.clone()
        }
    }

    /// Returns the version for display, or the first requirement when unresolved
    pub fn display_version(&self) -> &str {
        self.version
            .as_deref()
            .or_else(|| {
                self.requirements
                    .iter()
                    .find_map(|r| r.requirement.as_deref())
            })
            .unwrap_or("unknown")
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.display_version())?;
        if !self.top_level {
            write!(f, " (transitive)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_constructor() {
        let dep = Dependency::top_level("rails", "7.0.4", "bundler");
        assert_eq!(dep.name, "rails");
        assert_eq!(dep.version.as_deref(), Some("7.0.4"));
        assert!(dep.top_level);
        assert_eq!(dep.package_manager, "bundler");
    }

    #[test]
    fn test_transitive_constructor() {
        let dep = Dependency::transitive("rack", "2.2.4", "bundler");
        assert!(!dep.top_level);
    }

    #[test]
    fn test_updated_to_keeps_previous_state() {
        let dep = Dependency::top_level("rails", "7.0.4", "bundler")
            .with_requirement(Requirement::new("~> 7.0", "Gemfile"));
        let updated = dep.updated_to("7.1.0");

        assert_eq!(updated.version.as_deref(), Some("7.1.0"));
        assert_eq!(updated.previous_version.as_deref(), Some("7.0.4"));
        assert_eq!(updated.previous_requirements, Some(dep.requirements.clone()));
        // original untouched
        assert_eq!(dep.version.as_deref(), Some("7.0.4"));
        assert!(dep.previous_version.is_none());
    }

    #[test]
    fn test_display_version_falls_back_to_requirement() {
        let dep = Dependency::new("left-pad", None, true, "npm_and_yarn")
            .with_requirement(Requirement::new("^1.3.0", "package.json"));
        assert_eq!(dep.display_version(), "^1.3.0");

        let bare = Dependency::new("left-pad", None, true, "npm_and_yarn");
        assert_eq!(bare.display_version(), "unknown");
    }

    #[test]
    fn test_display() {
        let dep = Dependency::top_level("serde", "1.0.190", "cargo");
        assert_eq!(dep.to_string(), "serde@1.0.190");

        let dep = Dependency::transitive("itoa", "1.0.9", "cargo");
        assert_eq!(dep.to_string(), "itoa@1.0.9 (transitive)");
    }

    #[test]
    fn test_deserialize_parser_output() {
        let json = r#"{
            "name": "requests",
            "version": "2.28.0",
            "requirements": [
                {"requirement": ">=2.28.0", "file": "Pipfile", "groups": ["default"]}
            ],
            "top_level": true,
            "package_manager": "pip"
        }"#;
        let dep: Dependency = serde_json::from_str(json).unwrap();
        assert_eq!(dep.name, "requests");
        assert_eq!(dep.requirements.len(), 1);
        assert_eq!(dep.requirements[0].groups, vec!["default"]);
        assert!(dep.previous_version.is_none());
    }
}
