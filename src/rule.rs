//! This module defines the `Rule` trait, the capability set shared by the transition rules
//! of every machine family. Rulebooks and machines are written against this trait only,
//! while each family keeps its own closed set of rule and configuration types.

use crate::types::{State, Symbol};
use std::fmt::Debug;

/// A single transition of some machine family.
///
/// A rule is immutable once built. `applies_to` is a pure predicate, and `follow`
/// computes a fresh successor configuration without touching its argument.
pub trait Rule {
    /// The type of state identifiers the rule moves between.
    type State: State;
    /// The type of symbols the rule consumes.
    type Symbol: Symbol;
    /// The snapshot a machine of this family holds between steps.
    type Configuration: Clone + Ord + Debug;

    /// The state this rule leaves from.
    fn state(&self) -> &Self::State;

    /// The state this rule moves to.
    fn next_state(&self) -> &Self::State;

    /// The symbol consumed by this rule, or `None` for a free move.
    fn symbol(&self) -> Option<&Self::Symbol>;

    /// The family-specific part of applicability: state, stack top or tape head.
    fn matches(&self, configuration: &Self::Configuration) -> bool;

    /// Computes the configuration reached by following this rule.
    ///
    /// The caller must ensure the rule applies; the result is unspecified otherwise.
    fn follow(&self, configuration: &Self::Configuration) -> Self::Configuration;

    /// Whether both rules could fire from one configuration.
    fn overlaps(&self, other: &Self) -> bool;

    /// Returns `true` if the rule fires from `configuration` on `symbol`.
    ///
    /// A `None` symbol asks about free moves and only matches free-move rules.
    fn applies_to(&self, configuration: &Self::Configuration, symbol: Option<&Self::Symbol>) -> bool {
        self.symbol() == symbol && self.matches(configuration)
    }

    /// Returns `true` for rules that consume no input.
    fn is_free_move(&self) -> bool {
        self.symbol().is_none()
    }
}

/// Two triggers collide when they are equal or when one of them is a free move.
pub(crate) fn triggers_collide<C: PartialEq>(a: Option<&C>, b: Option<&C>) -> bool {
    a.is_none() || b.is_none() || a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_collide() {
        assert!(triggers_collide(Some(&'a'), Some(&'a')));
        assert!(triggers_collide(None, Some(&'a')));
        assert!(triggers_collide::<char>(None, None));
        assert!(!triggers_collide(Some(&'a'), Some(&'b')));
    }
}
