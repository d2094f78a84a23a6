//! This module provides the two rulebook flavours shared by all machine families.
//!
//! A [`DeterministicRuleBook`] answers "which single configuration comes next", picking the
//! first applicable rule in declaration order. A [`NondeterministicRuleBook`] works over sets
//! of configurations and collects every applicable rule. Both compute free-move closure
//! iteratively so pathological tables cannot exhaust the call stack.

use crate::rule::Rule;
use std::collections::BTreeSet;

/// An ordered table of rules where the first applicable rule wins.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicRuleBook<R> {
    rules: Vec<R>,
}

impl<R: Rule> DeterministicRuleBook<R> {
    /// Creates a rulebook from rules in declaration order.
    pub fn new(rules: Vec<R>) -> Self {
        Self { rules }
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[R] {
        &self.rules
    }

    /// Finds the first rule applying to `configuration` on `symbol`.
    pub fn rule_for(&self, configuration: &R::Configuration, symbol: Option<&R::Symbol>) -> Option<&R> {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(configuration, symbol))
    }

    /// Returns `true` if some rule applies to `configuration` on `symbol`.
    pub fn applies_to(&self, configuration: &R::Configuration, symbol: Option<&R::Symbol>) -> bool {
        self.rule_for(configuration, symbol).is_some()
    }

    /// Follows the first applicable rule, or returns `None` when no rule applies.
    pub fn next_configuration(
        &self,
        configuration: &R::Configuration,
        symbol: Option<&R::Symbol>,
    ) -> Option<R::Configuration> {
        self.rule_for(configuration, symbol)
            .map(|rule| rule.follow(configuration))
    }

    /// Follows free moves until none applies.
    ///
    /// Does not terminate if the table contains a free-move cycle.
    pub fn follow_free_moves(&self, mut configuration: R::Configuration) -> R::Configuration {
        while let Some(next) = self.next_configuration(&configuration, None) {
            configuration = next;
        }

        configuration
    }

    /// The distinct symbols consumed by the rules, free moves excluded.
    pub fn alphabet(&self) -> BTreeSet<R::Symbol> {
        alphabet_of(&self.rules)
    }
}

impl<R: Rule> FromIterator<R> for DeterministicRuleBook<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A table of rules where every applicable rule contributes a successor.
#[derive(Debug, Clone, PartialEq)]
pub struct NondeterministicRuleBook<R> {
    rules: Vec<R>,
}

impl<R: Rule> NondeterministicRuleBook<R> {
    /// Creates a rulebook from a list of rules.
    pub fn new(rules: Vec<R>) -> Self {
        Self { rules }
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[R] {
        &self.rules
    }

    /// Returns every rule applying to `configuration` on `symbol`.
    pub fn rules_for<'a>(
        &'a self,
        configuration: &'a R::Configuration,
        symbol: Option<&'a R::Symbol>,
    ) -> impl Iterator<Item = &'a R> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.applies_to(configuration, symbol))
    }

    /// Returns the successors of a single configuration on `symbol`.
    pub fn follow_rules_for(
        &self,
        configuration: &R::Configuration,
        symbol: Option<&R::Symbol>,
    ) -> Vec<R::Configuration> {
        self.rules_for(configuration, symbol)
            .map(|rule| rule.follow(configuration))
            .collect()
    }

    /// Returns the union of the successors of every configuration in `configurations`.
    pub fn next_configurations(
        &self,
        configurations: &BTreeSet<R::Configuration>,
        symbol: Option<&R::Symbol>,
    ) -> BTreeSet<R::Configuration> {
        configurations
            .iter()
            .flat_map(|configuration| self.follow_rules_for(configuration, symbol))
            .collect()
    }

    /// Saturates `configurations` with everything reachable through free moves.
    ///
    /// Terminates whenever the reachable configuration space is finite.
    pub fn follow_free_moves(
        &self,
        configurations: BTreeSet<R::Configuration>,
    ) -> BTreeSet<R::Configuration> {
        let mut closure = configurations;
        let mut worklist: Vec<R::Configuration> = closure.iter().cloned().collect();

        while let Some(configuration) = worklist.pop() {
            for next in self.follow_rules_for(&configuration, None) {
                if !closure.contains(&next) {
                    closure.insert(next.clone());
                    worklist.push(next);
                }
            }
        }

        closure
    }

    /// The distinct symbols consumed by the rules, free moves excluded.
    pub fn alphabet(&self) -> BTreeSet<R::Symbol> {
        alphabet_of(&self.rules)
    }
}

impl<R: Rule> FromIterator<R> for NondeterministicRuleBook<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn alphabet_of<R: Rule>(rules: &[R]) -> BTreeSet<R::Symbol> {
    rules
        .iter()
        .filter_map(|rule| rule.symbol().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite::FaRule;

    fn rulebook() -> NondeterministicRuleBook<FaRule<u32, char>> {
        NondeterministicRuleBook::new(vec![
            FaRule::free(1, 2),
            FaRule::free(1, 4),
            FaRule::new(2, 'a', 3),
            FaRule::new(3, 'a', 2),
            FaRule::new(4, 'a', 5),
            FaRule::new(5, 'a', 6),
            FaRule::new(6, 'a', 4),
        ])
    }

    #[test]
    fn test_free_moves_reach_fixed_point() {
        let rulebook = rulebook();

        assert_eq!(
            rulebook.next_configurations(&BTreeSet::from([1]), None),
            BTreeSet::from([2, 4])
        );
        assert_eq!(
            rulebook.follow_free_moves(BTreeSet::from([1])),
            BTreeSet::from([1, 2, 4])
        );
    }

    #[test]
    fn test_free_moves_terminate_on_cycles() {
        let rulebook: NondeterministicRuleBook<FaRule<u32, char>> = NondeterministicRuleBook::new(vec![
            FaRule::free(1, 2),
            FaRule::free(2, 3),
            FaRule::free(3, 1),
        ]);

        assert_eq!(
            rulebook.follow_free_moves(BTreeSet::from([2])),
            BTreeSet::from([1, 2, 3])
        );
    }

    #[test]
    fn test_alphabet_excludes_free_moves() {
        assert_eq!(rulebook().alphabet(), BTreeSet::from(['a']));
    }

    #[test]
    fn test_deterministic_first_match_wins() {
        let rulebook = DeterministicRuleBook::new(vec![
            FaRule::new(1, 'a', 2),
            FaRule::new(1, 'a', 3),
        ]);

        assert_eq!(rulebook.next_configuration(&1, Some(&'a')), Some(2));
        assert_eq!(rulebook.next_configuration(&1, Some(&'b')), None);
        assert!(!rulebook.applies_to(&2, Some(&'a')));
    }

    #[test]
    fn test_deterministic_free_moves_chain() {
        let rulebook: DeterministicRuleBook<FaRule<u32, char>> = vec![
            FaRule::free(1, 2),
            FaRule::free(2, 3),
            FaRule::new(3, 'a', 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(rulebook.follow_free_moves(1), 3);
        assert_eq!(rulebook.follow_free_moves(3), 3);
    }
}
