use std::collections::BTreeSet;

use automata::{
    lookup, Automaton, CatalogMachine, Design, DfaRuleBook, DpdaDesign, DpdaRuleBook, FaRule,
    NfaDesign, NfaRuleBook, NfaSimulation, PdaConfiguration, PdaRule, Stack,
};
use proptest::prelude::*;

fn nfa_designs() -> Vec<NfaDesign<u32, char>> {
    ["third-from-last-b", "multiple-of-two-or-three", "ab-nfa"]
        .iter()
        .map(|name| match &lookup(name).expect("catalog entry").machine {
            CatalogMachine::Nfa(design) => design.clone(),
            other => panic!("{} is not an NFA: {:?}", name, other.family()),
        })
        .collect()
}

/// Every string over `alphabet` of length at most `max_len`.
fn strings_up_to(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut layer = vec![String::new()];

    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |c| {
                    let mut next = prefix.clone();
                    next.push(*c);
                    next
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }

    all
}

fn balanced_parentheses() -> DpdaDesign<u32, char> {
    let rulebook = DpdaRuleBook::new(vec![
        PdaRule::new(1, '(', 2, '$', vec!['b', '$']),
        PdaRule::new(2, '(', 2, 'b', vec!['b', 'b']),
        PdaRule::new(2, ')', 2, 'b', vec![]),
        PdaRule::free(2, 1, '$', vec!['$']),
    ]);

    DpdaDesign::new(1, '$', [1], rulebook)
}

#[test]
fn subset_construction_preserves_language() {
    for nfa_design in nfa_designs() {
        let dfa_design = NfaSimulation::new(&nfa_design).to_dfa_design();
        let alphabet: Vec<char> = nfa_design.rulebook().alphabet().into_iter().collect();

        for input in strings_up_to(&alphabet, 6) {
            assert_eq!(
                nfa_design.accepts(input.chars()),
                dfa_design.accepts(input.chars()),
                "NFA and DFA disagree on {:?}",
                input
            );
        }
    }
}

#[test]
fn subset_construction_discovers_each_state_once() {
    for nfa_design in nfa_designs() {
        let dfa_design = NfaSimulation::new(&nfa_design).to_dfa_design();
        let rules = dfa_design.rulebook().rules();

        let triggers: BTreeSet<_> = rules
            .iter()
            .map(|rule| (rule.state.clone(), rule.character))
            .collect();
        assert_eq!(triggers.len(), rules.len(), "duplicate DFA rules");
    }
}

#[test]
fn free_move_closure_is_idempotent() {
    let rulebook = NfaRuleBook::new(vec![
        FaRule::free(1, 2),
        FaRule::free(1, 4),
        FaRule::free(4, 1),
        FaRule::new(2, 'a', 3),
        FaRule::free(3, 5),
    ]);

    for start in 1..=5u32 {
        let once = rulebook.follow_free_moves(BTreeSet::from([start]));
        let twice = rulebook.follow_free_moves(once.clone());
        assert_eq!(once, twice);
        assert!(once.contains(&start));
    }
}

proptest! {
    #[test]
    fn push_then_pop_restores_stack(
        contents in proptest::collection::vec(any::<char>(), 0..16),
        symbol in any::<char>(),
    ) {
        let stack = Stack::new(contents.clone());
        prop_assert_eq!(stack.push(symbol).pop(), stack.clone());
        let pushed = stack.push(symbol);
        prop_assert_eq!(pushed.top(), Some(&symbol));
        prop_assert_eq!(stack.iter().cloned().collect::<Vec<_>>(), contents);
    }

    #[test]
    fn deterministic_lookup_is_pure(
        state in 1u32..4,
        symbol in prop_oneof![Just('a'), Just('b'), Just('c')],
    ) {
        let rulebook = DfaRuleBook::new(vec![
            FaRule::new(1, 'a', 2),
            FaRule::new(1, 'b', 1),
            FaRule::new(2, 'a', 2),
            FaRule::new(2, 'b', 3),
            FaRule::new(3, 'a', 3),
            FaRule::new(3, 'b', 3),
        ]);

        prop_assert_eq!(
            rulebook.next_state(&state, &symbol),
            rulebook.next_state(&state, &symbol)
        );
    }

    #[test]
    fn dpda_lookup_is_pure(depth in 0usize..8, symbol in prop_oneof![Just('('), Just(')')]) {
        let design = balanced_parentheses();
        let stack = (0..depth).fold(Stack::new(['$']), |stack, _| stack.push('b'));
        let configuration = PdaConfiguration::new(2, stack);

        prop_assert_eq!(
            design.rulebook().next_configuration(&configuration, Some(&symbol)),
            design.rulebook().next_configuration(&configuration, Some(&symbol))
        );
    }

    #[test]
    fn nfa_closure_is_idempotent(
        states in proptest::collection::btree_set(1u32..=6, 0..6),
    ) {
        let rulebook = NfaRuleBook::new(vec![
            FaRule::free(1, 2),
            FaRule::free(1, 4),
            FaRule::new(2, 'a', 3),
            FaRule::new(3, 'a', 2),
            FaRule::new(4, 'a', 5),
            FaRule::new(5, 'a', 6),
            FaRule::new(6, 'a', 4),
        ]);

        let once = rulebook.follow_free_moves(states.clone());
        prop_assert!(states.is_subset(&once));
        prop_assert_eq!(rulebook.follow_free_moves(once.clone()), once);
    }

    #[test]
    fn stuck_dpda_never_recovers(
        prefix in "[()]{0,8}",
        suffix in "[()]{0,8}",
    ) {
        let design = balanced_parentheses();
        let mut dpda = design.build_machine();

        // A leading close parenthesis can never be matched.
        dpda.read_sequence(")".chars().chain(prefix.chars()));
        prop_assert!(dpda.is_stuck());

        dpda.read_sequence(suffix.chars());
        prop_assert!(dpda.is_stuck());
        prop_assert!(!dpda.is_accepting());

        let stuck = dpda.current_configuration();
        for character in suffix.chars() {
            dpda.read_symbol(&character);
            prop_assert!(dpda.is_stuck());
            prop_assert_eq!(dpda.current_configuration(), stuck.clone());
        }
        prop_assert!(!dpda.is_accepting());
    }

    #[test]
    fn balanced_parentheses_match_a_counter(input in "[()]{0,16}") {
        let mut depth: i32 = 0;
        let mut balanced = true;
        for c in input.chars() {
            depth += if c == '(' { 1 } else { -1 };
            if depth < 0 {
                balanced = false;
                break;
            }
        }
        balanced &= depth == 0;

        prop_assert_eq!(balanced_parentheses().accepts(input.chars()), balanced);
    }
}
