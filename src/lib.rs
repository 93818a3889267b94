//! depbot - automated dependency update runner library
//!
//! This library provides the core of an update run against one repository
//! directory:
//! - Package manager and versioning strategy alias resolution
//! - Unlock strategy selection per dependency
//! - Open pull request throttling
//! - The orchestrator driving fetch, parse, check, update and create
//!
//! Fetching, parsing, version resolution, file rewriting and pull request
//! creation are collaborators behind the traits in [`collaborator`].

pub mod cli;
pub mod collaborator;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod throttle;
pub mod update;
