//! Update orchestrator for coordinating a whole run
//!
//! This module provides:
//! - Workflow coordination: fetch → parse → check → decide → build → create
//! - Pull request throttling with early halt
//! - Dry-run mode support
//! - Allow/ignore filters over top-level dependencies
//!
//! Dependencies are processed strictly one at a time in parser order.

use crate::collaborator::{Collaborators, PullRequestRequest};
use crate::config::RunConfig;
use crate::domain::{
    BlockReason, CreatedPullRequest, Credential, Dependency, DependencyOutcome, DependencyReport,
    DependencyState, FetchedFiles, RunSummary, SkipReason, Source, UnlockDecision,
    UpdateAttemptResult,
};
use crate::error::RunError;
use crate::progress::Progress;
use crate::throttle::PullRequestThrottle;
use crate::update::UnlockStrategySelector;
use tracing::{debug, info, warn};

/// Orchestrator for one update run against one repository directory
pub struct Orchestrator {
    config: RunConfig,
    source: Source,
    credentials: Vec<Credential>,
    collaborators: Collaborators,
    selector: UnlockStrategySelector,
    show_progress: bool,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        config: RunConfig,
        source: Source,
        credentials: Vec<Credential>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            config,
            source,
            credentials,
            collaborators,
            selector: UnlockStrategySelector::new(),
            show_progress: false,
        }
    }

    /// Show a progress bar while running (builder pattern)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch, parse and process every top-level dependency
    ///
    /// Fetch and parse failures abort the run, as do errors from any other
    /// collaborator call. Non-201 pull request responses do not.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let mut progress = Progress::new(self.show_progress);

        progress.waiting("Fetching dependency files...");
        let fetched = self
            .collaborators
            .fetcher
            .fetch(&self.source, &self.credentials)
            .await
            .map_err(RunError::Fetch)?;
        info!(
            files = fetched.files.len(),
            commit = %fetched.commit,
            "Fetched dependency files"
        );

        progress.waiting("Parsing dependency files...");
        let dependencies = self
            .collaborators
            .parser
            .parse(&fetched.files, &self.source, &self.credentials)
            .await
            .map_err(RunError::Parse)?;
        progress.clear();

        self.process_with(&fetched, &dependencies, &mut progress)
            .await
    }

    /// Process already fetched and parsed dependencies
    pub async fn process(
        &self,
        fetched: &FetchedFiles,
        dependencies: &[Dependency],
    ) -> Result<RunSummary, RunError> {
        let mut progress = Progress::new(self.show_progress);
        self.process_with(fetched, dependencies, &mut progress)
            .await
    }

    async fn process_with(
        &self,
        fetched: &FetchedFiles,
        dependencies: &[Dependency],
        progress: &mut Progress,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::new(
            &self.config.package_manager,
            self.config.dry_run,
            self.config.pull_request_limit,
        );
        summary.base_commit = Some(fetched.commit.clone());
        let mut throttle = PullRequestThrottle::new(self.config.pull_request_limit);

        let candidates: Vec<&Dependency> = self.config.filter.top_level(dependencies).collect();
        info!(
            dependencies = dependencies.len(),
            top_level = candidates.len(),
            limit = self.config.pull_request_limit,
            "Processing top-level dependencies"
        );

        progress.dependencies(candidates.len());
        for (index, dependency) in candidates.iter().enumerate() {
            progress.working_on(&dependency.name);

            let report = self
                .process_dependency(dependency, fetched, &mut throttle)
                .await?;
            log_report(&report);
            summary.add_report(report);
            progress.done_one();

            if !throttle.should_continue() {
                summary.unprocessed = candidates[index + 1..]
                    .iter()
                    .map(|d| d.name.clone())
                    .collect();
                if !summary.unprocessed.is_empty() {
                    info!(
                        limit = throttle.limit(),
                        remaining = summary.unprocessed.len(),
                        "Pull request limit reached, stopping run"
                    );
                }
                break;
            }
        }
        progress.clear();

        summary.pull_requests_created = throttle.created();
        summary.finish();
        Ok(summary)
    }

    /// Drive one dependency to Recorded, Skipped or Blocked
    async fn process_dependency(
        &self,
        dependency: &Dependency,
        fetched: &FetchedFiles,
        throttle: &mut PullRequestThrottle,
    ) -> Result<DependencyReport, RunError> {
        let name = dependency.name.as_str();
        debug!(dependency = %dependency, state = %DependencyState::Start);

        if !self.config.filter.allows(name) {
            return Ok(DependencyReport::new(
                name,
                dependency.version.clone(),
                DependencyOutcome::skipped(SkipReason::Filtered),
            ));
        }

        let checker =
            self.collaborators
                .checkers
                .checker_for(dependency, &fetched.files, &self.credentials);

        let attempt = self
            .selector
            .attempt(name, checker.as_ref())
            .await
            .map_err(|e| RunError::check(name, e))?;

        let (decision, updated) = match attempt {
            UpdateAttemptResult::NoUpdateNeeded => {
                return Ok(DependencyReport::new(
                    name,
                    dependency.version.clone(),
                    DependencyOutcome::skipped(SkipReason::UpToDate),
                ));
            }
            UpdateAttemptResult::Blocked => {
                let latest = match checker.latest_version().await {
                    Ok(latest) => latest,
                    Err(e) => {
                        debug!(dependency = name, error = %e, "Latest version unavailable");
                        None
                    }
                };
                warn!(
                    dependency = name,
                    current = dependency.display_version(),
                    latest = latest.as_deref().unwrap_or("unknown"),
                    "Update not possible"
                );
                let mut report = DependencyReport::new(
                    name,
                    dependency.version.clone(),
                    DependencyOutcome::blocked(BlockReason::UpdateNotPossible),
                );
                report.decision = Some(UnlockDecision::NotPossible);
                return Ok(report);
            }
            UpdateAttemptResult::Unlocked(decision, updated) => (decision, updated),
        };

        debug!(
            dependency = name,
            state = %DependencyState::BuildingUpdate,
            decision = %decision,
            updated = updated.len()
        );
        let files = self
            .collaborators
            .updater
            .update(&updated, &fetched.files, &self.credentials)
            .await
            .map_err(|e| RunError::update(name, e))?;

        let mut report = DependencyReport::new(
            name,
            dependency.version.clone(),
            DependencyOutcome::skipped(SkipReason::DryRun),
        );
        report.decision = Some(decision);
        report.new_version = updated.first().and_then(|d| d.version.clone());
        report.peers = updated.iter().skip(1).map(|d| d.name.clone()).collect();

        if self.config.dry_run {
            info!(
                dependency = name,
                files = ?files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                "Dry run, not creating pull request"
            );
            return Ok(report);
        }

        debug!(dependency = name, state = %DependencyState::CreatingPullRequest);
        let response = self
            .collaborators
            .creator
            .create(PullRequestRequest {
                source: &self.source,
                base_commit: &fetched.commit,
                dependencies: &updated,
                files: &files,
                credentials: &self.credentials,
            })
            .await
            .map_err(|e| RunError::pull_request(name, e))?;

        report.outcome = interpret_response(response);
        if report.outcome.is_recorded() {
            throttle.record_created();
        }
        Ok(report)
    }
}

/// Map a creator response to an outcome
///
/// Nothing returned means an equivalent request exists already.
fn interpret_response(response: Option<CreatedPullRequest>) -> DependencyOutcome {
    match response {
        None => DependencyOutcome::skipped(SkipReason::DuplicatePullRequest),
        Some(pull_request) if pull_request.is_created() => {
            DependencyOutcome::Recorded { pull_request }
        }
        Some(pull_request) => DependencyOutcome::blocked(BlockReason::PullRequestFailed {
            status: pull_request.status,
            message: pull_request.message().map(str::to_string),
        }),
    }
}

fn log_report(report: &DependencyReport) {
    let state = report.outcome.state();
    match &report.outcome {
        DependencyOutcome::Recorded { pull_request } => info!(
            dependency = %report.name,
            state = %state,
            number = pull_request.number(),
            url = pull_request.url(),
            "Created pull request"
        ),
        DependencyOutcome::Skipped { reason } => info!(
            dependency = %report.name,
            state = %state,
            reason = %reason,
            "Skipped"
        ),
        DependencyOutcome::Blocked {
            reason: BlockReason::PullRequestFailed { status, message },
        } => warn!(
            dependency = %report.name,
            state = %state,
            status,
            message = message.as_deref().unwrap_or(""),
            "Pull request creation failed"
        ),
        DependencyOutcome::Blocked { reason } => info!(
            dependency = %report.name,
            state = %state,
            reason = %reason,
            "Blocked"
        ),
    }
}
