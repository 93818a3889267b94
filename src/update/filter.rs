//! Dependency filter configuration
//!
//! Decides which parsed dependencies a run looks at: only top-level
//! dependencies, narrowed further by optional allow/ignore name lists.

use crate::domain::Dependency;

/// Filter configuration for dependency selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyFilter {
    /// If non-empty, only these dependencies are considered
    pub allow: Vec<String>,
    /// Dependencies never considered
    pub ignore: Vec<String>,
}

impl DependencyFilter {
    /// Create a filter that allows everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allow list
    pub fn with_allow(mut self, allow: Vec<String>) -> Self {
        self.allow = allow;
        self
    }

    /// Set the ignore list
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Check if a dependency name passes the allow/ignore lists
    pub fn allows(&self, name: &str) -> bool {
        if self.ignore.iter().any(|n| n == name) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|n| n == name)
    }

    /// Top-level dependencies, in parser order
    pub fn top_level<'a>(
        &self,
        dependencies: &'a [Dependency],
    ) -> impl Iterator<Item = &'a Dependency> {
        dependencies.iter().filter(|d| d.top_level)
    }
}
