//! Core domain models for depbot
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency and requirement records produced by the file parser
//! - Unlock scopes and decisions
//! - Per-dependency attempt results and outcomes
//! - Repository source descriptor, credentials and files
//! - Run summary structures

mod dependency;
mod outcome;
mod source;
mod summary;
mod unlock;

pub use dependency::{Dependency, Requirement};
pub use outcome::{
    BlockReason, CreatedPullRequest, DependencyOutcome, DependencyState, SkipReason,
    UpdateAttemptResult, PULL_REQUEST_CREATED,
};
pub use source::{Credential, DependencyFile, FetchedFiles, Source};
pub use summary::{DependencyReport, RunSummary};
pub use unlock::{UnlockDecision, UnlockScope};
