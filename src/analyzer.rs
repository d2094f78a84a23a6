//! This module provides functions for analyzing rule tables to detect common mistakes before
//! any machine is driven. This includes checks for conflicting rules in deterministic
//! rulebooks, free-move cycles that would keep closure from terminating, and accept states
//! that can never be reached.
//!
//! None of these checks run implicitly; machines trust their rulebooks.

use crate::finite::{DfaDesign, NfaDesign};
use crate::pushdown::{DpdaDesign, NpdaDesign};
use crate::rule::Rule;
use crate::turing::DtmDesign;
use crate::types::{AutomatonError, State, Symbol};
use std::collections::{BTreeMap, BTreeSet};

/// Represents the problems that can be found in a rule table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// A deterministic rulebook contains rules that can fire from the same configuration.
    /// Each entry describes one conflicting pair.
    NondeterministicRules(Vec<String>),
    /// Free moves form a cycle through the listed states.
    FreeMoveCycle(Vec<String>),
    /// Accept states that cannot be reached from the start state.
    UnreachableAcceptStates(Vec<String>),
}

impl From<AnalysisError> for AutomatonError {
    /// Converts an `AnalysisError` into an `AutomatonError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NondeterministicRules(pairs) => AutomatonError::ValidationError(
                format!("Deterministic rulebook has conflicting rules: {:?}", pairs),
            ),
            AnalysisError::FreeMoveCycle(states) => AutomatonError::ValidationError(format!(
                "Free moves form a cycle through states: {:?}",
                states
            )),
            AnalysisError::UnreachableAcceptStates(states) => AutomatonError::ValidationError(
                format!("Unreachable accept states: {:?}", states),
            ),
        }
    }
}

/// Analyzes a DFA design for conflicting rules and unreachable accept states.
pub fn analyze_dfa<S: State, C: Symbol>(design: &DfaDesign<S, C>) -> Result<(), AutomatonError> {
    let rules = design.rulebook().rules();

    first_error([
        check_determinism(rules),
        check_free_move_cycles(rules),
        check_reachable(design.start_state(), design.accept_states(), rules),
    ])
}

/// Analyzes an NFA design for unreachable accept states.
///
/// Free-move cycles are harmless here: closure over a finite state set always saturates.
pub fn analyze_nfa<S: State, C: Symbol>(design: &NfaDesign<S, C>) -> Result<(), AutomatonError> {
    first_error([check_reachable(
        design.start_state(),
        design.accept_states(),
        design.rulebook().rules(),
    )])
}

/// Analyzes a DPDA design for conflicting rules, free-move cycles and unreachable accept states.
///
/// The cycle check ignores stack contents, so it may flag cycles the stack would break.
pub fn analyze_dpda<S: State, C: Symbol>(design: &DpdaDesign<S, C>) -> Result<(), AutomatonError> {
    let rules = design.rulebook().rules();

    first_error([
        check_determinism(rules),
        check_free_move_cycles(rules),
        check_reachable(design.start_state(), design.accept_states(), rules),
    ])
}

/// Analyzes an NPDA design for unreachable accept states.
pub fn analyze_npda<S: State, C: Symbol>(design: &NpdaDesign<S, C>) -> Result<(), AutomatonError> {
    first_error([check_reachable(
        design.start_state(),
        design.accept_states(),
        design.rulebook().rules(),
    )])
}

/// Analyzes a DTM design for conflicting rules and unreachable accept states.
pub fn analyze_dtm<S: State, C: Symbol>(design: &DtmDesign<S, C>) -> Result<(), AutomatonError> {
    let rules = design.rulebook().rules();

    first_error([
        check_determinism(rules),
        check_reachable(design.start_state(), design.accept_states(), rules),
    ])
}

fn first_error<const N: usize>(
    checks: [Result<(), AnalysisError>; N],
) -> Result<(), AutomatonError> {
    match checks.into_iter().find_map(Result::err) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Checks that no two rules of a deterministic rulebook overlap.
///
/// With first-match semantics the later rule of an overlapping pair is either dead or
/// competes with a free move, which is almost always a mistake in the table.
fn check_determinism<R: Rule>(rules: &[R]) -> Result<(), AnalysisError>
where
    R: std::fmt::Debug,
{
    let conflicts: Vec<String> = rules
        .iter()
        .enumerate()
        .flat_map(|(i, rule)| {
            rules[i + 1..]
                .iter()
                .filter(move |other| rule.overlaps(other))
                .map(move |other| format!("{:?} / {:?}", rule, other))
        })
        .collect();

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::NondeterministicRules(conflicts))
    }
}

/// Checks that the graph of free moves between states is acyclic.
fn check_free_move_cycles<R: Rule>(rules: &[R]) -> Result<(), AnalysisError> {
    let mut edges: BTreeMap<&R::State, Vec<&R::State>> = BTreeMap::new();
    for rule in rules.iter().filter(|rule| rule.is_free_move()) {
        edges.entry(rule.state()).or_default().push(rule.next_state());
    }

    // Iterative three-colour depth-first search.
    let mut finished: BTreeSet<&R::State> = BTreeSet::new();
    for &root in edges.keys() {
        if finished.contains(root) {
            continue;
        }

        let mut path: Vec<&R::State> = vec![root];
        let mut cursors: Vec<usize> = vec![0];

        while let (Some(&node), Some(cursor)) = (path.last(), cursors.last_mut()) {
            let successors = edges.get(node).map(Vec::as_slice).unwrap_or_default();

            match successors.get(*cursor) {
                Some(&next) => {
                    *cursor += 1;
                    if let Some(position) = path.iter().position(|state| *state == next) {
                        let cycle = path[position..]
                            .iter()
                            .map(|state| format!("{:?}", state))
                            .collect();
                        return Err(AnalysisError::FreeMoveCycle(cycle));
                    }
                    if !finished.contains(next) {
                        path.push(next);
                        cursors.push(0);
                    }
                }
                None => {
                    finished.insert(node);
                    path.pop();
                    cursors.pop();
                }
            }
        }
    }

    Ok(())
}

/// Checks that every accept state is reachable from `start` through the rule graph.
fn check_reachable<R: Rule>(
    start: &R::State,
    accept_states: &BTreeSet<R::State>,
    rules: &[R],
) -> Result<(), AnalysisError> {
    let mut reachable: BTreeSet<&R::State> = BTreeSet::from([start]);
    let mut worklist = vec![start];

    while let Some(state) = worklist.pop() {
        for rule in rules.iter().filter(|rule| rule.state() == state) {
            if reachable.insert(rule.next_state()) {
                worklist.push(rule.next_state());
            }
        }
    }

    let unreachable: Vec<String> = accept_states
        .iter()
        .filter(|state| !reachable.contains(state))
        .map(|state| format!("{:?}", state))
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableAcceptStates(unreachable))
    }
}
