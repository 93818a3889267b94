//! Progress display for an update run
//!
//! Shows a spinner while files are fetched and parsed, then a bar over the
//! top-level dependencies using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the dependency loop
pub struct Progress {
    /// Disabled in quiet and JSON modes
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner while waiting on a collaborator
    pub fn waiting(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.replace(spinner);
    }

    /// Start the bar over `total` dependencies
    pub fn dependencies(&mut self, total: usize) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg:30} [{bar:30.cyan/blue}] {pos}/{len}")
        {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        self.replace(bar);
    }

    /// Show which dependency is being worked on
    pub fn working_on(&self, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
        }
    }

    /// Mark one dependency done
    pub fn done_one(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Remove the current spinner or bar
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn replace(&mut self, bar: ProgressBar) {
        self.clear();
        self.bar = Some(bar);
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.clear();
    }
}
