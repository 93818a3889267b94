//! Integration tests for the update orchestrator
//!
//! These tests verify:
//! - Up-to-date and blocked dependencies never reach the updater or creator
//! - The open pull request limit halts a run and leaves the rest unprocessed
//! - Only a 201 response counts toward the limit
//! - A missing creator result is a skip, so rerunning does not double-count
//! - Dry runs, filters and collaborator failures

use async_trait::async_trait;
use depbot::collaborator::{
    Collaborators, FileFetcher, FileParser, FileUpdater, PullRequestCreator, PullRequestRequest,
    UpdateChecker, UpdateCheckerFactory,
};
use depbot::config::{RawRunConfig, RunConfig};
use depbot::domain::{
    BlockReason, CreatedPullRequest, Credential, Dependency, DependencyFile, DependencyOutcome,
    FetchedFiles, RunSummary, SkipReason, Source, UnlockDecision, UnlockScope,
};
use depbot::error::{CollaboratorError, RunError};
use depbot::orchestrator::Orchestrator;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

const PM: &str = "bundler";

/// How the fake checker answers for one dependency
#[derive(Debug, Clone)]
struct Script {
    up_to_date: bool,
    unlockable: bool,
    can_none: bool,
    can_own: bool,
    can_all: bool,
    peers: Vec<&'static str>,
    latest_fails: bool,
}

impl Script {
    fn up_to_date() -> Self {
        Self {
            up_to_date: true,
            ..Self::updatable()
        }
    }

    fn updatable() -> Self {
        Self {
            up_to_date: false,
            unlockable: false,
            can_none: true,
            can_own: false,
            can_all: false,
            peers: Vec::new(),
            latest_fails: false,
        }
    }

    fn not_possible() -> Self {
        Self {
            can_none: false,
            ..Self::updatable()
        }
    }

    fn needs_all(peers: Vec<&'static str>) -> Self {
        Self {
            unlockable: true,
            can_own: false,
            can_all: true,
            peers,
            ..Self::updatable()
        }
    }
}

/// How the fake creator answers
#[derive(Debug, Clone, Copy)]
enum Creator {
    /// 201 for names not seen before, nothing for names already opened
    Created,
    /// Always answer with this status
    Status(u16),
}

/// Records every collaborator call in order
#[derive(Debug, Default, Clone)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

struct FakeBackend {
    dependencies: Vec<Dependency>,
    scripts: HashMap<String, Script>,
    creator: Mutex<HashMap<String, Creator>>,
    opened: Mutex<HashSet<String>>,
    fail: Option<&'static str>,
    log: CallLog,
}

impl FakeBackend {
    fn new(dependencies: Vec<(&str, Script)>) -> Self {
        Self {
            dependencies: dependencies
                .iter()
                .map(|(name, _)| Dependency::top_level(*name, "1.0.0", PM))
                .collect(),
            scripts: dependencies
                .into_iter()
                .map(|(name, script)| (name.to_string(), script))
                .collect(),
            creator: Mutex::new(HashMap::new()),
            opened: Mutex::new(HashSet::new()),
            fail: None,
            log: CallLog::default(),
        }
    }

    fn with_transitive(mut self, name: &str) -> Self {
        self.dependencies
            .push(Dependency::transitive(name, "0.1.0", PM));
        self
    }

    fn responding(self, name: &str, creator: Creator) -> Self {
        self.creator
            .lock()
            .unwrap()
            .insert(name.to_string(), creator);
        self
    }

    fn failing(mut self, stage: &'static str) -> Self {
        self.fail = Some(stage);
        self
    }

    fn check_fail(&self, stage: &str) -> Result<(), CollaboratorError> {
        if self.fail == Some(stage) {
            Err(CollaboratorError::new(stage, "boom"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FileFetcher for FakeBackend {
    async fn fetch(
        &self,
        _source: &Source,
        _credentials: &[Credential],
    ) -> Result<FetchedFiles, CollaboratorError> {
        self.log.push("fetch".to_string());
        self.check_fail("fetch")?;
        Ok(FetchedFiles {
            files: vec![
                DependencyFile::new("Gemfile", "/", "gem 'rails'"),
                DependencyFile::new("Gemfile.lock", "/", "GEM"),
            ],
            commit: "abc123".to_string(),
        })
    }
}

#[async_trait]
impl FileParser for FakeBackend {
    async fn parse(
        &self,
        files: &[DependencyFile],
        _source: &Source,
        _credentials: &[Credential],
    ) -> Result<Vec<Dependency>, CollaboratorError> {
        self.log.push(format!("parse:{}", files.len()));
        self.check_fail("parse")?;
        Ok(self.dependencies.clone())
    }
}

struct FakeChecker {
    name: String,
    script: Script,
    log: CallLog,
}

impl FakeChecker {
    fn record(&self, query: &str) {
        self.log.push(format!("check:{}:{}", self.name, query));
    }
}

#[async_trait]
impl UpdateChecker for FakeChecker {
    async fn up_to_date(&self) -> Result<bool, CollaboratorError> {
        self.record("up_to_date");
        Ok(self.script.up_to_date)
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CollaboratorError> {
        self.record("requirements_unlocked_or_can_be");
        Ok(self.script.unlockable)
    }

    async fn can_update(&self, scope: UnlockScope) -> Result<bool, CollaboratorError> {
        self.record(&format!("can_update:{}", scope));
        Ok(match scope {
            UnlockScope::None => self.script.can_none,
            UnlockScope::Own => self.script.can_own,
            UnlockScope::All => self.script.can_all,
        })
    }

    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<Dependency>, CollaboratorError> {
        self.record(&format!("updated_dependencies:{}", scope));
        let target = Dependency::top_level(self.name.as_str(), "1.0.0", PM).updated_to("2.0.0");
        let peers = self
            .script
            .peers
            .iter()
            .map(|peer| Dependency::top_level(*peer, "0.9.0", PM).updated_to("1.0.0"));
        Ok(std::iter::once(target).chain(peers).collect())
    }

    async fn latest_version(&self) -> Result<Option<String>, CollaboratorError> {
        self.record("latest_version");
        if self.script.latest_fails {
            return Err(CollaboratorError::new("update checker", "registry unreachable"));
        }
        Ok(Some("2.0.0".to_string()))
    }
}

impl UpdateCheckerFactory for FakeBackend {
    fn checker_for(
        &self,
        dependency: &Dependency,
        _files: &[DependencyFile],
        _credentials: &[Credential],
    ) -> Box<dyn UpdateChecker> {
        Box::new(FakeChecker {
            name: dependency.name.clone(),
            script: self
                .scripts
                .get(&dependency.name)
                .cloned()
                .unwrap_or_else(Script::up_to_date),
            log: self.log.clone(),
        })
    }
}

#[async_trait]
impl FileUpdater for FakeBackend {
    async fn update(
        &self,
        dependencies: &[Dependency],
        files: &[DependencyFile],
        _credentials: &[Credential],
    ) -> Result<Vec<DependencyFile>, CollaboratorError> {
        self.log.push(format!("update:{}", dependencies[0].name));
        self.check_fail("update")?;
        Ok(files
            .iter()
            .map(|f| DependencyFile::new(f.name.as_str(), f.directory.as_str(), "updated"))
            .collect())
    }
}

#[async_trait]
impl PullRequestCreator for FakeBackend {
    async fn create(
        &self,
        request: PullRequestRequest<'_>,
    ) -> Result<Option<CreatedPullRequest>, CollaboratorError> {
        let name = request.dependencies[0].name.clone();
        self.log.push(format!("create:{}", name));
        self.check_fail("create")?;
        assert_eq!(request.base_commit, "abc123");
        assert!(request.files.iter().all(|f| f.content == "updated"));

        let creator = self
            .creator
            .lock()
            .unwrap()
            .get(&name)
            .copied()
            .unwrap_or(Creator::Created);
        Ok(match creator {
            Creator::Status(status) => Some(CreatedPullRequest::new(
                status,
                json!({"message": "Validation Failed"}),
            )),
            Creator::Created => {
                let mut opened = self.opened.lock().unwrap();
                if opened.insert(name) {
                    Some(CreatedPullRequest::new(201, json!({"number": opened.len()})))
                } else {
                    None
                }
            }
        })
    }
}

fn source() -> Source {
    Source {
        provider: "github".to_string(),
        hostname: None,
        api_endpoint: None,
        repo: "acme/widgets".to_string(),
        directory: "/".to_string(),
        branch: None,
    }
}

fn config(limit: &str) -> RawRunConfig {
    RawRunConfig {
        package_manager: PM.to_string(),
        pull_request_limit: Some(limit.to_string()),
        ..Default::default()
    }
}

fn orchestrator(backend: &Arc<FakeBackend>, raw: RawRunConfig) -> Orchestrator {
    Orchestrator::new(
        RunConfig::resolve(raw).unwrap(),
        source(),
        Vec::new(),
        Collaborators::from_backend(backend.clone()),
    )
}

async fn run(backend: &Arc<FakeBackend>, raw: RawRunConfig) -> RunSummary {
    orchestrator(backend, raw).run().await.unwrap()
}

fn five_updatable() -> Vec<(&'static str, Script)> {
    ["rails", "rack", "puma", "sidekiq", "nokogiri"]
        .into_iter()
        .map(|name| (name, Script::updatable()))
        .collect()
}

mod flow {
    use super::*;

    #[tokio::test]
    async fn test_up_to_date_never_reaches_updater_or_creator() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("rails", Script::up_to_date()),
            ("rack", Script::up_to_date()),
        ]));
        let summary = run(&backend, config("5")).await;

        assert_eq!(backend.log.count("update:"), 0);
        assert_eq!(backend.log.count("create:"), 0);
        assert_eq!(backend.log.count("check:rails:requirements"), 0);
        assert_eq!(summary.pull_requests_created, 0);
        assert!(summary
            .reports
            .iter()
            .all(|r| r.outcome == DependencyOutcome::skipped(SkipReason::UpToDate)));
    }

    #[tokio::test]
    async fn test_calls_run_in_order() {
        let backend = Arc::new(FakeBackend::new(vec![("rails", Script::updatable())]));
        run(&backend, config("5")).await;

        assert_eq!(
            backend.log.calls(),
            vec![
                "fetch",
                "parse:2",
                "check:rails:up_to_date",
                "check:rails:requirements_unlocked_or_can_be",
                "check:rails:can_update:none",
                "check:rails:updated_dependencies:none",
                "update:rails",
                "create:rails",
            ]
        );
    }

    #[tokio::test]
    async fn test_recorded_report_fields() {
        let backend = Arc::new(FakeBackend::new(vec![(
            "rails",
            Script::needs_all(vec!["actionpack", "activesupport"]),
        )]));
        let summary = run(&backend, config("5")).await;

        let report = &summary.reports[0];
        assert!(report.outcome.is_recorded());
        assert_eq!(report.decision, Some(UnlockDecision::All));
        assert_eq!(report.previous_version.as_deref(), Some("1.0.0"));
        assert_eq!(report.new_version.as_deref(), Some("2.0.0"));
        assert_eq!(report.peers, vec!["actionpack", "activesupport"]);
        assert_eq!(summary.base_commit.as_deref(), Some("abc123"));
        assert!(summary.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_not_possible_is_blocked_without_update() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("rails", Script::not_possible()),
            ("rack", Script::updatable()),
        ]));
        let summary = run(&backend, config("5")).await;

        assert_eq!(
            summary.reports[0].outcome,
            DependencyOutcome::blocked(BlockReason::UpdateNotPossible)
        );
        assert_eq!(summary.reports[0].decision, Some(UnlockDecision::NotPossible));
        assert_eq!(backend.log.count("update:rails"), 0);
        assert_eq!(backend.log.count("check:rails:updated_dependencies"), 0);
        assert_eq!(backend.log.count("check:rails:latest_version"), 1);
        // a blocked dependency does not stop the run
        assert!(summary.reports[1].outcome.is_recorded());
        assert!(!summary.has_failed_pull_requests());
    }

    #[tokio::test]
    async fn test_latest_version_failure_does_not_abort_run() {
        let backend = Arc::new(FakeBackend::new(vec![
            (
                "rails",
                Script {
                    latest_fails: true,
                    ..Script::not_possible()
                },
            ),
            ("rack", Script::updatable()),
        ]));
        let summary = run(&backend, config("5")).await;

        assert_eq!(backend.log.count("check:rails:latest_version"), 1);
        assert_eq!(
            summary.reports[0].outcome,
            DependencyOutcome::blocked(BlockReason::UpdateNotPossible)
        );
        assert!(summary.reports[1].outcome.is_recorded());
        assert_eq!(summary.pull_requests_created, 1);
    }

    #[tokio::test]
    async fn test_transitive_dependencies_are_ignored() {
        let backend = Arc::new(
            FakeBackend::new(vec![("rails", Script::updatable())]).with_transitive("rack"),
        );
        let summary = run(&backend, config("0")).await;

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(backend.log.count("check:rack"), 0);
    }

    #[tokio::test]
    async fn test_ignored_dependency_is_filtered() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("rails", Script::updatable()),
            ("rack", Script::updatable()),
        ]));
        let summary = run(
            &backend,
            RawRunConfig {
                ignore: vec!["rails".to_string()],
                ..config("5")
            },
        )
        .await;

        assert_eq!(
            summary.reports[0].outcome,
            DependencyOutcome::skipped(SkipReason::Filtered)
        );
        assert_eq!(backend.log.count("check:rails"), 0);
        assert!(summary.reports[1].outcome.is_recorded());
    }

    #[tokio::test]
    async fn test_process_reuses_fetched_files() {
        let backend = Arc::new(FakeBackend::new(vec![("rails", Script::updatable())]));
        let fetched = FetchedFiles {
            files: vec![DependencyFile::new("Gemfile", "/", "gem 'rails'")],
            commit: "abc123".to_string(),
        };
        let deps = vec![Dependency::top_level("rails", "1.0.0", PM)];

        let summary = orchestrator(&backend, config("5"))
            .process(&fetched, &deps)
            .await
            .unwrap();

        assert_eq!(summary.pull_requests_created, 1);
        assert_eq!(backend.log.count("fetch"), 0);
        assert_eq!(backend.log.count("parse"), 0);
    }
}

mod throttling {
    use super::*;

    #[tokio::test]
    async fn test_limit_halts_run() {
        let backend = Arc::new(FakeBackend::new(five_updatable()));
        let summary = run(&backend, config("2")).await;

        assert_eq!(summary.pull_requests_created, 2);
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.unprocessed, vec!["puma", "sidekiq", "nokogiri"]);
        assert!(summary.halted());
        assert_eq!(backend.log.count("create:"), 2);
        assert_eq!(backend.log.count("check:puma"), 0);
    }

    #[tokio::test]
    async fn test_unlimited_processes_everything() {
        for limit in ["0", "-1"] {
            let backend = Arc::new(FakeBackend::new(five_updatable()));
            let summary = run(&backend, config(limit)).await;

            assert_eq!(summary.pull_requests_created, 5, "limit {}", limit);
            assert!(summary.unprocessed.is_empty());
        }
    }

    #[tokio::test]
    async fn test_limit_reached_on_last_dependency_leaves_nothing_unprocessed() {
        let backend = Arc::new(FakeBackend::new(five_updatable()));
        let summary = run(&backend, config("5")).await;

        assert_eq!(summary.pull_requests_created, 5);
        assert!(!summary.halted());
    }

    #[tokio::test]
    async fn test_only_201_counts() {
        let backend = Arc::new(
            FakeBackend::new(vec![
                ("rails", Script::updatable()),
                ("rack", Script::updatable()),
                ("puma", Script::updatable()),
            ])
            .responding("rails", Creator::Status(422))
            .responding("rack", Creator::Status(200)),
        );
        let summary = run(&backend, config("1")).await;

        // two rejections do not count, the third request reaches the limit
        assert_eq!(summary.pull_requests_created, 1);
        assert_eq!(summary.reports.len(), 3);
        assert_eq!(
            summary.reports[0].outcome,
            DependencyOutcome::blocked(BlockReason::PullRequestFailed {
                status: 422,
                message: Some("Validation Failed".to_string()),
            })
        );
        assert!(summary.reports[1].outcome.is_blocked());
        assert!(summary.reports[2].outcome.is_recorded());
        assert!(summary.has_failed_pull_requests());
    }

    #[tokio::test]
    async fn test_missing_creator_result_is_skip() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("rails", Script::updatable()),
            ("rack", Script::updatable()),
        ]));
        // rails already has an open pull request
        backend.opened.lock().unwrap().insert("rails".to_string());

        let summary = run(&backend, config("1")).await;

        assert_eq!(
            summary.reports[0].outcome,
            DependencyOutcome::skipped(SkipReason::DuplicatePullRequest)
        );
        assert!(summary.reports[1].outcome.is_recorded());
        assert_eq!(summary.pull_requests_created, 1);
    }

    #[tokio::test]
    async fn test_rerun_does_not_double_count() {
        let backend = Arc::new(FakeBackend::new(five_updatable()));
        let orchestrator = orchestrator(&backend, config("0"));

        let first = orchestrator.run().await.unwrap();
        let second = orchestrator.run().await.unwrap();

        assert_eq!(first.pull_requests_created, 5);
        assert_eq!(second.pull_requests_created, 0);
        assert!(second
            .reports
            .iter()
            .all(|r| r.outcome == DependencyOutcome::skipped(SkipReason::DuplicatePullRequest)));
    }

    #[tokio::test]
    async fn test_dry_run_never_creates() {
        let backend = Arc::new(FakeBackend::new(five_updatable()));
        let summary = run(
            &backend,
            RawRunConfig {
                dry_run: true,
                ..config("1")
            },
        )
        .await;

        assert_eq!(backend.log.count("update:"), 5);
        assert_eq!(backend.log.count("create:"), 0);
        assert_eq!(summary.pull_requests_created, 0);
        assert!(!summary.halted());
        assert!(summary
            .reports
            .iter()
            .all(|r| r.outcome == DependencyOutcome::skipped(SkipReason::DryRun)));
        assert_eq!(summary.reports[0].new_version.as_deref(), Some("2.0.0"));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_parse() {
        let backend = Arc::new(FakeBackend::new(five_updatable()).failing("fetch"));
        let err = orchestrator(&backend, config("5")).run().await.unwrap_err();

        assert!(matches!(err, RunError::Fetch(_)));
        assert_eq!(backend.log.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_parse_failure_aborts() {
        let backend = Arc::new(FakeBackend::new(five_updatable()).failing("parse"));
        let err = orchestrator(&backend, config("5")).run().await.unwrap_err();

        assert!(matches!(err, RunError::Parse(_)));
        assert_eq!(backend.log.count("check:"), 0);
    }

    #[tokio::test]
    async fn test_update_failure_names_dependency() {
        let backend = Arc::new(FakeBackend::new(five_updatable()).failing("update"));
        let err = orchestrator(&backend, config("5")).run().await.unwrap_err();

        match err {
            RunError::Update { dependency, source } => {
                assert_eq!(dependency, "rails");
                assert_eq!(source.message, "boom");
            }
            other => panic!("expected Update error, got {:?}", other),
        }
        assert_eq!(backend.log.count("create:"), 0);
    }

    #[tokio::test]
    async fn test_creator_failure_aborts() {
        let backend = Arc::new(FakeBackend::new(five_updatable()).failing("create"));
        let err = orchestrator(&backend, config("5")).run().await.unwrap_err();

        assert!(matches!(err, RunError::PullRequest { .. }));
        assert!(err.to_string().contains("rails"));
    }
}
