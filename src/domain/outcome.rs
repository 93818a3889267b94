//! Per-dependency attempt results and final outcomes

use super::{Dependency, UnlockDecision};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP status the pull request creator reports for a newly opened request
pub const PULL_REQUEST_CREATED: u16 = 201;

/// Per-dependency processing state, used for tracing transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    Start,
    CheckingUpToDate,
    SelectingStrategy,
    BuildingUpdate,
    CreatingPullRequest,
    Recorded,
    Skipped,
    Blocked,
}

impl DependencyState {
    /// Returns the snake_case name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyState::Start => "start",
            DependencyState::CheckingUpToDate => "checking_up_to_date",
            DependencyState::SelectingStrategy => "selecting_strategy",
            DependencyState::BuildingUpdate => "building_update",
            DependencyState::CreatingPullRequest => "creating_pull_request",
            DependencyState::Recorded => "recorded",
            DependencyState::Skipped => "skipped",
            DependencyState::Blocked => "blocked",
        }
    }
}

impl fmt::Display for DependencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking and unlocking one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAttemptResult {
    /// The dependency is already up to date
    NoUpdateNeeded,
    /// An update is possible; dependencies are ordered target first, then peers
    Unlocked(UnlockDecision, Vec<Dependency>),
    /// No permitted unlock allows an update this run
    Blocked,
}

/// Response from the pull request creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPullRequest {
    /// HTTP-style status code
    pub status: u16,
    /// Structured response body
    #[serde(default)]
    pub body: serde_json::Value,
}

impl CreatedPullRequest {
    /// Creates a new response
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Returns true if the status confirms a new pull request
    pub fn is_created(&self) -> bool {
        self.status == PULL_REQUEST_CREATED
    }

    /// Returns the body's `message` field, if any
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(|m| m.as_str())
    }

    /// Returns the body's `number` field, if any
    pub fn number(&self) -> Option<u64> {
        self.body.get("number").and_then(|n| n.as_u64())
    }

    /// Returns the body's `html_url` (or `web_url`) field, if any
    pub fn url(&self) -> Option<&str> {
        self.body
            .get("html_url")
            .or_else(|| self.body.get("web_url"))
            .and_then(|u| u.as_str())
    }
}

/// Reason a dependency finished without a new pull request or a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already at the latest allowed version
    UpToDate,
    /// Excluded by the allow/ignore lists
    Filtered,
    /// The creator returned nothing; an equivalent request already exists
    DuplicatePullRequest,
    /// Dry run; files were built but no pull request was requested
    DryRun,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpToDate => write!(f, "up to date"),
            SkipReason::Filtered => write!(f, "filtered"),
            SkipReason::DuplicatePullRequest => write!(f, "pull request already exists"),
            SkipReason::DryRun => write!(f, "dry run"),
        }
    }
}

/// Reason a dependency could not be updated this run (non-fatal)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    /// No unlock scope allows an update
    UpdateNotPossible,
    /// The creator answered with a status other than 201
    PullRequestFailed { status: u16, message: Option<String> },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::UpdateNotPossible => write!(f, "update not possible"),
            BlockReason::PullRequestFailed {
                status,
                message: Some(message),
            } => write!(f, "pull request failed ({}): {}", status, message),
            BlockReason::PullRequestFailed {
                status,
                message: None,
            } => write!(f, "pull request failed ({})", status),
        }
    }
}

/// Terminal state of one dependency in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DependencyOutcome {
    /// A new pull request was created and counted
    Recorded { pull_request: CreatedPullRequest },
    /// Nothing to do, or nothing new created
    Skipped { reason: SkipReason },
    /// Update impossible or creation rejected
    Blocked { reason: BlockReason },
}

impl DependencyOutcome {
    /// Creates a Skipped outcome
    pub fn skipped(reason: SkipReason) -> Self {
        DependencyOutcome::Skipped { reason }
    }

    /// Creates a Blocked outcome
    pub fn blocked(reason: BlockReason) -> Self {
        DependencyOutcome::Blocked { reason }
    }

    /// Returns true if a pull request was created
    pub fn is_recorded(&self) -> bool {
        matches!(self, DependencyOutcome::Recorded { .. })
    }

    /// Returns true if the dependency was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, DependencyOutcome::Skipped { .. })
    }

    /// Returns true if the dependency was blocked
    pub fn is_blocked(&self) -> bool {
        matches!(self, DependencyOutcome::Blocked { .. })
    }

    /// Returns the terminal state this outcome corresponds to
    pub fn state(&self) -> DependencyState {
        match self {
            DependencyOutcome::Recorded { .. } => DependencyState::Recorded,
            DependencyOutcome::Skipped { .. } => DependencyState::Skipped,
            DependencyOutcome::Blocked { .. } => DependencyState::Blocked,
        }
    }
}

impl fmt::Display for DependencyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyOutcome::Recorded { pull_request } => match pull_request.number() {
                Some(number) => write!(f, "pull request #{} created", number),
                None => write!(f, "pull request created"),
            },
            DependencyOutcome::Skipped { reason } => write!(f, "skipped ({})", reason),
            DependencyOutcome::Blocked { reason } => write!(f, "blocked ({})", reason),
        }
    }
}
