//! Unlock strategy selection
//!
//! Picks the least invasive requirement change that still lets a dependency
//! update: leave requirements alone, then touch only the dependency's own
//! requirement, then touch requirements shared with other dependencies.

use crate::collaborator::UpdateChecker;
use crate::domain::{DependencyState, UnlockDecision, UnlockScope, UpdateAttemptResult};
use crate::error::CollaboratorError;
use tracing::{debug, warn};

/// What the checker said about rewriting requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirements {
    /// Requirements must stay as written
    Locked,
    /// Requirements are unlocked already or may be rewritten
    Unlockable,
}

/// One entry of the priority table: when `requirements` matches and the
/// checker can update within `scope`, the decision is `scope`
#[derive(Debug, Clone, Copy)]
struct UnlockRule {
    requirements: Requirements,
    scope: UnlockScope,
}

/// Evaluated top to bottom; the first matching rule wins
const UNLOCK_RULES: [UnlockRule; 3] = [
    UnlockRule {
        requirements: Requirements::Locked,
        scope: UnlockScope::None,
    },
    UnlockRule {
        requirements: Requirements::Unlockable,
        scope: UnlockScope::Own,
    },
    UnlockRule {
        requirements: Requirements::Unlockable,
        scope: UnlockScope::All,
    },
];

/// Chooses an unlock decision for one dependency from its checker's answers
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlockStrategySelector;

impl UnlockStrategySelector {
    /// Create a selector
    pub fn new() -> Self {
        Self
    }

    /// Decide how far requirements may be relaxed
    ///
    /// Asks `requirements_unlocked_or_can_be` once, then tries `can_update`
    /// lazily in rule order.
    pub async fn decide(
        &self,
        checker: &dyn UpdateChecker,
    ) -> Result<UnlockDecision, CollaboratorError> {
        let requirements = if checker.requirements_unlocked_or_can_be().await? {
            Requirements::Unlockable
        } else {
            Requirements::Locked
        };

        for rule in UNLOCK_RULES
            .iter()
            .filter(|rule| rule.requirements == requirements)
        {
            if checker.can_update(rule.scope).await? {
                return Ok(rule.scope.into());
            }
        }

        Ok(UnlockDecision::NotPossible)
    }

    /// Check, decide and unlock one dependency
    ///
    /// An up-to-date dependency short-circuits before any other query.
    pub async fn attempt(
        &self,
        name: &str,
        checker: &dyn UpdateChecker,
    ) -> Result<UpdateAttemptResult, CollaboratorError> {
        debug!(dependency = name, state = %DependencyState::CheckingUpToDate);
        if checker.up_to_date().await? {
            return Ok(UpdateAttemptResult::NoUpdateNeeded);
        }

        debug!(dependency = name, state = %DependencyState::SelectingStrategy);
        let decision = self.decide(checker).await?;
        let Some(scope) = decision.scope() else {
            return Ok(UpdateAttemptResult::Blocked);
        };

        let updated = checker.updated_dependencies(scope).await?;
        if updated.is_empty() {
            warn!(
                dependency = name,
                decision = %decision,
                "Checker reported an update but returned no updated dependencies"
            );
            return Ok(UpdateAttemptResult::Blocked);
        }

        Ok(UpdateAttemptResult::Unlocked(decision, updated))
    }
}
