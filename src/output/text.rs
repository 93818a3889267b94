//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per dependency with its version change and outcome
//! - Skipped dependencies in verbose mode
//! - Totals and the pull request limit halt notice

use crate::domain::{DependencyOutcome, DependencyReport, RunSummary};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn dry_run_prefix(&self, summary: &RunSummary) -> String {
        match (summary.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    /// Version column: "1.0.0 → 1.1.0", or the old version alone
    fn version_change(&self, report: &DependencyReport) -> String {
        let old = report.previous_version.as_deref().unwrap_or("-");
        match &report.new_version {
            Some(new) if self.color => {
                format!("{} {} {}", old.dimmed(), "→".dimmed(), new.bright_white().bold())
            }
            Some(new) => format!("{} -> {}", old, new),
            None => old.to_string(),
        }
    }

    fn outcome_label(&self, outcome: &DependencyOutcome) -> String {
        let label = match outcome {
            DependencyOutcome::Recorded { pull_request } => match pull_request.url() {
                Some(url) => format!("{} {}", outcome, url),
                None => outcome.to_string(),
            },
            _ => outcome.to_string(),
        };
        if !self.color {
            return label;
        }
        match outcome {
            DependencyOutcome::Recorded { .. } => label.green().to_string(),
            DependencyOutcome::Skipped { .. } => label.dimmed().to_string(),
            DependencyOutcome::Blocked { .. } => label.yellow().to_string(),
        }
    }

    fn format_report(
        &self,
        report: &DependencyReport,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", report.name, width = name_width);
        let name = if self.color && report.outcome.is_skipped() {
            name.dimmed().to_string()
        } else {
            name
        };

        let decision = report
            .decision
            .filter(|d| d.scope().is_some())
            .map(|d| format!(" [unlock: {}]", d))
            .unwrap_or_default();
        let peers = if report.peers.is_empty() {
            String::new()
        } else {
            format!(" (with {})", report.peers.join(", "))
        };

        writeln!(
            writer,
            "  {} {}{}{} {}",
            name,
            self.version_change(report),
            decision,
            peers,
            self.outcome_label(&report.outcome)
        )
    }

    fn format_totals(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let created = summary.recorded().count();
        let skipped = summary.skipped().count();
        let blocked = summary.blocked().count();

        if self.color {
            writeln!(
                writer,
                "{}{} created, {} skipped, {} blocked",
                self.dry_run_prefix(summary),
                created.to_string().green(),
                skipped.to_string().dimmed(),
                if blocked > 0 {
                    blocked.to_string().yellow().to_string()
                } else {
                    blocked.to_string()
                }
            )?;
        } else {
            writeln!(
                writer,
                "{}{} created, {} skipped, {} blocked",
                self.dry_run_prefix(summary),
                created,
                skipped,
                blocked
            )?;
        }

        if summary.halted() {
            let notice = format!(
                "Pull request limit ({}) reached; not processed: {}",
                summary.pull_request_limit,
                summary.unprocessed.join(", ")
            );
            if self.color {
                writeln!(writer, "{}", notice.yellow())?;
            } else {
                writeln!(writer, "{}", notice)?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            let shown: Vec<&DependencyReport> = summary
                .reports
                .iter()
                .filter(|r| self.verbosity == Verbosity::Verbose || !r.outcome.is_skipped())
                .collect();

            if !shown.is_empty() {
                let header = match &summary.base_commit {
                    Some(commit) => format!("{} @ {}", summary.package_manager, commit),
                    None => summary.package_manager.clone(),
                };
                if self.color {
                    writeln!(writer, "{}{}", self.dry_run_prefix(summary), header.bold())?;
                } else {
                    writeln!(writer, "{}{}", self.dry_run_prefix(summary), header)?;
                }

                let name_width = shown.iter().map(|r| r.name.len()).max().unwrap_or(0).max(20);
                for report in shown {
                    self.format_report(report, name_width, writer)?;
                }
                writeln!(writer)?;
            }
        }

        self.format_totals(summary, writer)
    }
}
