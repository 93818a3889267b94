//! Pull request throttle
//!
//! Caps how many pull requests a single run may create. The counter lives
//! only for one run and only the orchestrator touches it.

/// Counts pull requests created this run against a configured limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestThrottle {
    /// Configured limit; 0 or less means unlimited
    limit: i64,
    /// Pull requests confirmed created so far
    created: u32,
}

impl PullRequestThrottle {
    /// Create a throttle with nothing created yet
    pub fn new(limit: i64) -> Self {
        Self { limit, created: 0 }
    }

    /// Returns true if the limit does not apply
    pub fn is_unlimited(&self) -> bool {
        self.limit <= 0
    }

    /// Returns true while more pull requests may be created
    pub fn should_continue(&self) -> bool {
        self.is_unlimited() || i64::from(self.created) < self.limit
    }

    /// Count one confirmed, newly created pull request
    pub fn record_created(&mut self) {
        self.created = self.created.saturating_add(1);
    }

    /// Pull requests created so far
    pub fn created(&self) -> u32 {
        self.created
    }

    /// Configured limit
    pub fn limit(&self) -> i64 {
        self.limit
    }
}
