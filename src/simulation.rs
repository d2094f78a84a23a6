//! Subset construction: simulating an NFA with a DFA whose states are sets of NFA states.

use crate::finite::{DfaDesign, DfaRuleBook, FaRule, NfaDesign};
use crate::machine::{Automaton, Design};
use crate::types::{State, Symbol};
use std::collections::{BTreeSet, VecDeque};

/// Converts an NFA design into an equivalent DFA design.
///
/// Holds only a reference to the NFA; discovery state lives inside each call.
#[derive(Debug, Clone, Copy)]
pub struct NfaSimulation<'a, S, C> {
    nfa_design: &'a NfaDesign<S, C>,
}

impl<'a, S: State, C: Symbol> NfaSimulation<'a, S, C> {
    /// Wraps `nfa_design` for conversion.
    pub fn new(nfa_design: &'a NfaDesign<S, C>) -> Self {
        Self { nfa_design }
    }

    /// The DFA state reached from `states` on `character`, closed under free moves.
    pub fn next_state(&self, states: &BTreeSet<S>, character: &C) -> BTreeSet<S> {
        let mut nfa = self.nfa_design.build_machine_with(states.clone());
        nfa.read_symbol(character);
        nfa.current_states()
    }

    /// One DFA rule per alphabet symbol leaving `states`.
    pub fn rules_for(&self, states: &BTreeSet<S>) -> Vec<FaRule<BTreeSet<S>, C>> {
        self.nfa_design
            .rulebook()
            .alphabet()
            .into_iter()
            .map(|character| {
                let next_state = self.next_state(states, &character);
                FaRule::new(states.clone(), character, next_state)
            })
            .collect()
    }

    /// Explores breadth-first from `start` until no new state sets appear.
    ///
    /// Returns every discovered state set together with the rules between them.
    /// Each state set is expanded exactly once.
    pub fn discover_states_and_rules(
        &self,
        start: BTreeSet<S>,
    ) -> (BTreeSet<BTreeSet<S>>, Vec<FaRule<BTreeSet<S>, C>>) {
        let mut states = BTreeSet::from([start.clone()]);
        let mut frontier = VecDeque::from([start]);
        let mut rules = Vec::new();

        while let Some(current) = frontier.pop_front() {
            for rule in self.rules_for(&current) {
                if states.insert(rule.next_state.clone()) {
                    frontier.push_back(rule.next_state.clone());
                }
                rules.push(rule);
            }
        }

        (states, rules)
    }

    /// Builds a DFA accepting exactly the language of the wrapped NFA.
    pub fn to_dfa_design(&self) -> DfaDesign<BTreeSet<S>, C> {
        let start_state = self.nfa_design.build_machine().current_states();
        let (states, rules) = self.discover_states_and_rules(start_state.clone());
        let discovered = states.len();

        let accept_states: Vec<BTreeSet<S>> = states
            .into_iter()
            .filter(|state| !state.is_disjoint(self.nfa_design.accept_states()))
            .collect();

        tracing::debug!(
            states = discovered,
            accepting = accept_states.len(),
            rules = rules.len(),
            "subset construction complete"
        );

        DfaDesign::new(start_state, accept_states, DfaRuleBook::new(rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite::NfaRuleBook;

    fn nfa_design() -> NfaDesign<u32, char> {
        let rulebook = NfaRuleBook::new(vec![
            FaRule::new(1, 'a', 1),
            FaRule::new(1, 'a', 2),
            FaRule::free(1, 2),
            FaRule::new(2, 'b', 3),
            FaRule::new(3, 'b', 1),
            FaRule::free(3, 2),
        ]);
        NfaDesign::new(1, [3], rulebook)
    }

    fn set(states: &[u32]) -> BTreeSet<u32> {
        states.iter().copied().collect()
    }

    #[test]
    fn test_next_state() {
        let design = nfa_design();
        let simulation = NfaSimulation::new(&design);

        assert_eq!(simulation.next_state(&set(&[1, 2]), &'a'), set(&[1, 2]));
        assert_eq!(simulation.next_state(&set(&[1, 2]), &'b'), set(&[2, 3]));
        assert_eq!(simulation.next_state(&set(&[3, 2]), &'b'), set(&[1, 2, 3]));
        assert_eq!(simulation.next_state(&set(&[1, 3, 2]), &'b'), set(&[1, 2, 3]));
        assert_eq!(simulation.next_state(&set(&[1, 3, 2]), &'a'), set(&[1, 2]));
    }

    #[test]
    fn test_rules_for() {
        let design = nfa_design();
        let simulation = NfaSimulation::new(&design);

        assert_eq!(
            simulation.rules_for(&set(&[1, 2])),
            vec![
                FaRule::new(set(&[1, 2]), 'a', set(&[1, 2])),
                FaRule::new(set(&[1, 2]), 'b', set(&[2, 3])),
            ]
        );
        assert_eq!(
            simulation.rules_for(&set(&[3, 2])),
            vec![
                FaRule::new(set(&[2, 3]), 'a', set(&[])),
                FaRule::new(set(&[2, 3]), 'b', set(&[1, 2, 3])),
            ]
        );
    }

    #[test]
    fn test_discover_states_and_rules() {
        let design = nfa_design();
        let simulation = NfaSimulation::new(&design);

        let (states, rules) = simulation.discover_states_and_rules(set(&[1, 2]));

        assert_eq!(
            states,
            BTreeSet::from([set(&[]), set(&[1, 2]), set(&[2, 3]), set(&[1, 2, 3])])
        );
        assert_eq!(rules.len(), 8);
    }

    #[test]
    fn test_to_dfa_design() {
        let design = nfa_design();
        let dfa_design = NfaSimulation::new(&design).to_dfa_design();

        assert_eq!(dfa_design.start_state(), &set(&[1, 2]));
        assert_eq!(
            dfa_design.accept_states(),
            &BTreeSet::from([set(&[2, 3]), set(&[1, 2, 3])])
        );
        assert!(!dfa_design.accepts("aaa".chars()));
        assert!(dfa_design.accepts("aab".chars()));
        assert!(dfa_design.accepts("bbbabb".chars()));
    }

    #[test]
    fn test_empty_alphabet() {
        let design = NfaDesign::new(1, [2], NfaRuleBook::new(vec![FaRule::<u32, char>::free(1, 2)]));
        let dfa_design = NfaSimulation::new(&design).to_dfa_design();

        assert!(dfa_design.rulebook().rules().is_empty());
        assert!(dfa_design.accepts("".chars()));
        assert!(!dfa_design.accepts("a".chars()));
    }
}
