//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of a run summary with totals
//! - Per-dependency outcome records

use crate::domain::{DependencyReport, RunSummary};
use crate::output::{OutputFormatter, Verbosity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Skipped dependencies are listed only in verbose mode
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full run
#[derive(Serialize)]
struct JsonOutput<'a> {
    package_manager: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_commit: Option<&'a str>,
    dry_run: bool,
    pull_request_limit: i64,
    totals: JsonTotals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<&'a DependencyReport>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    unprocessed: &'a [String],
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

/// JSON representation of run totals
#[derive(Serialize)]
struct JsonTotals {
    created: u32,
    skipped: usize,
    blocked: usize,
    halted: bool,
}

impl JsonFormatter {
    fn to_json<'a>(&self, summary: &'a RunSummary) -> JsonOutput<'a> {
        let dependencies = match self.verbosity {
            Verbosity::Quiet => Vec::new(),
            Verbosity::Normal => summary
                .reports
                .iter()
                .filter(|r| !r.outcome.is_skipped())
                .collect(),
            Verbosity::Verbose => summary.reports.iter().collect(),
        };

        JsonOutput {
            package_manager: &summary.package_manager,
            base_commit: summary.base_commit.as_deref(),
            dry_run: summary.dry_run,
            pull_request_limit: summary.pull_request_limit,
            totals: JsonTotals {
                created: summary.pull_requests_created,
                skipped: summary.skipped().count(),
                blocked: summary.blocked().count(),
                halted: summary.halted(),
            },
            dependencies,
            unprocessed: &summary.unprocessed,
            started_at: summary.started_at,
            finished_at: summary.finished_at,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = self.to_json(summary);
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
