//! Unlock scopes and decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of a declared requirement an update may rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockScope {
    /// Leave every requirement as written
    None,
    /// Rewrite this dependency's own requirement
    Own,
    /// Rewrite requirements of dependencies sharing a constraint too
    All,
}

impl UnlockScope {
    /// Returns the wire name of this scope
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockScope::None => "none",
            UnlockScope::Own => "own",
            UnlockScope::All => "all",
        }
    }
}

impl fmt::Display for UnlockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of unlock strategy selection for one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockDecision {
    /// Update without touching requirements
    None,
    /// Update by relaxing the dependency's own requirement
    Own,
    /// Update by relaxing requirements of co-constrained dependencies too
    All,
    /// No permitted unlock allows an update
    NotPossible,
}

impl UnlockDecision {
    /// Returns the scope to update with, or `None` when no update is possible
    pub fn scope(&self) -> Option<UnlockScope> {
        match self {
            UnlockDecision::None => Some(UnlockScope::None),
            UnlockDecision::Own => Some(UnlockScope::Own),
            UnlockDecision::All => Some(UnlockScope::All),
            UnlockDecision::NotPossible => None,
        }
    }

    /// Returns the wire name of this decision
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockDecision::None => "none",
            UnlockDecision::Own => "own",
            UnlockDecision::All => "all",
            UnlockDecision::NotPossible => "not_possible",
        }
    }
}

impl From<UnlockScope> for UnlockDecision {
    fn from(scope: UnlockScope) -> Self {
        match scope {
            UnlockScope::None => UnlockDecision::None,
            UnlockScope::Own => UnlockDecision::Own,
            UnlockScope::All => UnlockDecision::All,
        }
    }
}

impl fmt::Display for UnlockDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
