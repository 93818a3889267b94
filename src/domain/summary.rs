//! Run summary types
//!
//! Provides structures for tracking per-dependency results and run totals.

use super::{DependencyOutcome, UnlockDecision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result for a single top-level dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Dependency name
    pub name: String,
    /// Version before the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    /// Version the update moved to, when one was built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    /// Unlock decision, when strategy selection ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<UnlockDecision>,
    /// Peers updated together with this dependency
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peers: Vec<String>,
    /// Terminal state
    #[serde(flatten)]
    pub outcome: DependencyOutcome,
}

impl DependencyReport {
    /// Creates a report with only a name, previous version and outcome
    pub fn new(
        name: impl Into<String>,
        previous_version: Option<String>,
        outcome: DependencyOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            previous_version,
            new_version: None,
            decision: None,
            peers: Vec::new(),
            outcome,
        }
    }
}

/// Overall summary of one update run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Canonical package manager key
    pub package_manager: String,
    /// Commit the dependency files were read at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_commit: Option<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Configured open pull request limit (0 or less means unlimited)
    pub pull_request_limit: i64,
    /// Pull requests created during the run
    pub pull_requests_created: u32,
    /// Per-dependency results in processing order
    pub reports: Vec<DependencyReport>,
    /// Top-level dependencies left untouched because the limit was reached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unprocessed: Vec<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Creates an empty summary starting now
    pub fn new(package_manager: impl Into<String>, dry_run: bool, pull_request_limit: i64) -> Self {
        Self {
            package_manager: package_manager.into(),
            base_commit: None,
            dry_run,
            pull_request_limit,
            pull_requests_created: 0,
            reports: Vec::new(),
            unprocessed: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Adds a dependency report
    pub fn add_report(&mut self, report: DependencyReport) {
        self.reports.push(report);
    }

    /// Marks the run finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns the reports that created a pull request
    pub fn recorded(&self) -> impl Iterator<Item = &DependencyReport> {
        self.reports.iter().filter(|r| r.outcome.is_recorded())
    }

    /// Returns the skipped reports
    pub fn skipped(&self) -> impl Iterator<Item = &DependencyReport> {
        self.reports.iter().filter(|r| r.outcome.is_skipped())
    }

    /// Returns the blocked reports
    pub fn blocked(&self) -> impl Iterator<Item = &DependencyReport> {
        self.reports.iter().filter(|r| r.outcome.is_blocked())
    }

    /// Returns true if the run stopped early at the pull request limit
    pub fn halted(&self) -> bool {
        !self.unprocessed.is_empty()
    }

    /// Returns true if any pull request creation was rejected
    pub fn has_failed_pull_requests(&self) -> bool {
        self.reports.iter().any(|r| {
            matches!(
                &r.outcome,
                DependencyOutcome::Blocked {
                    reason: super::BlockReason::PullRequestFailed { .. }
                }
            )
        })
    }
}
