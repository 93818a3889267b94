//! CLI argument parsing module for depbot
//!
//! Every option can also come from a `DEPBOT_*` environment variable or the
//! TOML job file given with `--config`. Flags and environment win over the
//! file; the file wins over built-in defaults.

use crate::config::{JobFile, RawRunConfig, RunConfig};
use crate::domain::Source;
use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Provider used when none is configured
pub const DEFAULT_PROVIDER: &str = "github";

/// Automated dependency update runner
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "depbot",
    about = "Checks one repository directory for dependency updates and opens a pull request per update"
)]
pub struct CliArgs {
    /// TOML job file with run parameters
    #[arg(short, long, env = "DEPBOT_CONFIG")]
    pub config: Option<PathBuf>,

    // Run parameters
    /// Package manager (aliases such as pipenv, yarn or gomod are accepted)
    #[arg(short, long, env = "DEPBOT_PACKAGE_MANAGER")]
    pub package_manager: Option<String>,

    /// Versioning strategy (auto, lockfile-only, widen, increase, increase-if-necessary)
    #[arg(long, env = "DEPBOT_VERSIONING_STRATEGY")]
    pub versioning_strategy: Option<String>,

    /// Directory holding the manifests, relative to the repository root
    #[arg(short, long, env = "DEPBOT_DIRECTORY")]
    pub directory: Option<String>,

    /// Target branch (default: the repository's default branch)
    #[arg(short, long, env = "DEPBOT_BRANCH")]
    pub branch: Option<String>,

    /// Open pull request limit; 0 or less means unlimited (default: 5)
    #[arg(long = "pr-limit", env = "DEPBOT_PULL_REQUEST_LIMIT", allow_hyphen_values = true)]
    pub pull_request_limit: Option<String>,

    // Repository
    /// Repository host provider (default: github)
    #[arg(long, env = "DEPBOT_PROVIDER")]
    pub provider: Option<String>,

    /// Repository host name, for self-hosted providers
    #[arg(long, env = "DEPBOT_HOSTNAME")]
    pub hostname: Option<String>,

    /// Repository host API endpoint, for self-hosted providers
    #[arg(long, env = "DEPBOT_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// Repository to update (e.g. owner/name)
    #[arg(short, long, env = "DEPBOT_REPO")]
    pub repo: Option<String>,

    // Collaborators
    /// Helper command implementing fetch/parse/check/update/create.
    /// Must be the last option: every word after it is passed to the helper
    #[arg(
        long,
        env = "DEPBOT_HELPER",
        num_args = 1..,
        value_delimiter = ' ',
        allow_hyphen_values = true
    )]
    pub helper: Vec<String>,

    /// Working directory for the helper process
    #[arg(long, env = "DEPBOT_HELPER_DIR")]
    pub helper_dir: Option<PathBuf>,

    /// JSON file holding an array of credential records
    #[arg(long, env = "DEPBOT_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    // Dependency filters
    /// Consider only these dependencies (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_delimiter = ',')]
    pub allow: Vec<String>,

    /// Never consider these dependencies (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_delimiter = ',')]
    pub ignore: Vec<String>,

    // General options
    /// Build updates but do not open pull requests
    #[arg(short = 'n', long, env = "DEPBOT_DRY_RUN")]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Print version
    #[arg(short = 'V', long = "version")]
    pub print_version: bool,
}

/// Everything needed to start a run, after merging flags and the job file
#[derive(Debug, Clone, PartialEq)]
pub struct RunInputs {
    pub raw: RawRunConfig,
    pub provider: String,
    pub hostname: Option<String>,
    pub api_endpoint: Option<String>,
    pub repo: String,
    pub helper: Vec<String>,
    pub helper_dir: Option<PathBuf>,
    pub credentials: Option<PathBuf>,
}

impl RunInputs {
    /// Repository source descriptor for a resolved configuration
    pub fn source(&self, config: &RunConfig) -> Source {
        Source {
            provider: self.provider.clone(),
            hostname: self.hostname.clone(),
            api_endpoint: self.api_endpoint.clone(),
            repo: self.repo.clone(),
            directory: config.directory.clone(),
            branch: config.branch.clone(),
        }
    }
}

impl CliArgs {
    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Load the job file named by `--config`, or an empty one
    pub fn job_file(&self) -> Result<JobFile, ConfigError> {
        match &self.config {
            Some(path) => JobFile::load(path),
            None => Ok(JobFile::default()),
        }
    }

    /// Merge flags over a job file
    pub fn merge(self, job: JobFile) -> Result<RunInputs, ConfigError> {
        let job_limit = job.pull_request_limit_text();
        let package_manager = self
            .package_manager
            .or(job.package_manager)
            .filter(|pm| !pm.trim().is_empty())
            .ok_or(ConfigError::MissingPackageManager)?;
        let repo = self
            .repo
            .or(job.source.repo)
            .filter(|r| !r.trim().is_empty())
            .ok_or(ConfigError::MissingRepository)?;
        let helper = if self.helper.is_empty() {
            job.helper.unwrap_or_default()
        } else {
            self.helper
        };
        let pull_request_limit = self.pull_request_limit.or(job_limit);

        let mut allow = job.filter.allow;
        allow.extend(self.allow);
        let mut ignore = job.filter.ignore;
        ignore.extend(self.ignore);

        Ok(RunInputs {
            raw: RawRunConfig {
                package_manager,
                versioning_strategy: self.versioning_strategy.or(job.versioning_strategy),
                directory: self.directory.or(job.directory),
                branch: self.branch.or(job.branch),
                pull_request_limit,
                dry_run: self.dry_run,
                allow,
                ignore,
            },
            provider: self
                .provider
                .or(job.source.provider)
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            hostname: self.hostname.or(job.source.hostname),
            api_endpoint: self.api_endpoint.or(job.source.api_endpoint),
            repo,
            helper,
            helper_dir: self.helper_dir,
            credentials: self.credentials.or(job.credentials.map(PathBuf::from)),
        })
    }
}
