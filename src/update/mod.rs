//! Update decision logic for dependencies
//!
//! This module provides:
//! - Dependency selection (top-level only, allow/ignore lists)
//! - Unlock strategy selection from update checker answers

mod filter;
mod selector;

pub use filter::DependencyFilter;
pub use selector::UnlockStrategySelector;
