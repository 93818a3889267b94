//! depbot - automated dependency update runner
//!
//! Checks the dependencies of one repository directory, works out how far
//! each requirement may be relaxed, and opens one pull request per update
//! until the open pull request limit is reached.

use clap::Parser;
use depbot::cli::{CliArgs, RunInputs};
use depbot::collaborator::{CollaboratorRegistry, HelperCommand};
use depbot::config::{load_credentials, RunConfig};
use depbot::domain::RunSummary;
use depbot::error::AppError;
use depbot::orchestrator::Orchestrator;
use depbot::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code when the run finished but a pull request was rejected
const EXIT_PULL_REQUEST_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle version flag
    if args.print_version {
        println!("depbot {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose, args.quiet);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flags
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let show_progress = args.show_progress();

    let job = args.job_file()?;
    let inputs = args.merge(job)?;
    let summary = execute(inputs, show_progress).await?;

    // Output results
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    if summary.has_failed_pull_requests() {
        Ok(ExitCode::from(EXIT_PULL_REQUEST_FAILED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Resolve configuration, look up collaborators and run the orchestrator
async fn execute(inputs: RunInputs, show_progress: bool) -> Result<RunSummary, AppError> {
    let config = RunConfig::resolve(inputs.raw.clone())?;

    let mut helper = HelperCommand::new(inputs.helper.clone())?;
    if let Some(dir) = &inputs.helper_dir {
        helper = helper.with_working_dir(dir);
    }
    let collaborators = CollaboratorRegistry::new(helper).lookup(&config)?;

    let credentials = match &inputs.credentials {
        Some(path) => load_credentials(path)?,
        None => Vec::new(),
    };

    let source = inputs.source(&config);
    info!(
        source = %source,
        package_manager = %config.package_manager,
        versioning_strategy = %config.versioning_strategy,
        pull_request_limit = config.pull_request_limit,
        dry_run = config.dry_run,
        credentials = credentials.len(),
        "Starting update run"
    );

    let summary = Orchestrator::new(config, source, credentials, collaborators)
        .with_progress(show_progress)
        .run()
        .await?;

    info!(
        created = summary.pull_requests_created,
        blocked = summary.blocked().count(),
        halted = summary.halted(),
        "Update run finished"
    );
    Ok(summary)
}
