//! Finite automata: the `FaRule` transition, deterministic (`Dfa`) and nondeterministic (`Nfa`)
//! machines, and the designs that build them.

use crate::machine::{Automaton, Design};
use crate::rule::{triggers_collide, Rule};
use crate::rulebook::{DeterministicRuleBook, NondeterministicRuleBook};
use crate::types::{State, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A finite automaton transition `state --character--> next_state`.
///
/// A `None` character marks a free move.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaRule<S, C> {
    /// The state the rule leaves from.
    pub state: S,
    /// The input symbol consumed, or `None` for a free move.
    pub character: Option<C>,
    /// The state the rule moves to.
    pub next_state: S,
}

impl<S, C> FaRule<S, C> {
    /// Creates a rule consuming `character`.
    pub fn new(state: S, character: C, next_state: S) -> Self {
        Self {
            state,
            character: Some(character),
            next_state,
        }
    }

    /// Creates a free move.
    pub fn free(state: S, next_state: S) -> Self {
        Self {
            state,
            character: None,
            next_state,
        }
    }
}

impl<S: State, C: Symbol> Rule for FaRule<S, C> {
    type State = S;
    type Symbol = C;
    type Configuration = S;

    fn state(&self) -> &S {
        &self.state
    }

    fn next_state(&self) -> &S {
        &self.next_state
    }

    fn symbol(&self) -> Option<&C> {
        self.character.as_ref()
    }

    fn matches(&self, configuration: &S) -> bool {
        self.state == *configuration
    }

    fn follow(&self, _configuration: &S) -> S {
        self.next_state.clone()
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.state == other.state && triggers_collide(self.symbol(), other.symbol())
    }
}

impl<S: fmt::Debug, C: fmt::Debug> fmt::Display for FaRule<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.character {
            Some(character) => write!(f, "{:?} --{:?}--> {:?}", self.state, character, self.next_state),
            None => write!(f, "{:?} --ε--> {:?}", self.state, self.next_state),
        }
    }
}

pub type DfaRuleBook<S, C> = DeterministicRuleBook<FaRule<S, C>>;
pub type NfaRuleBook<S, C> = NondeterministicRuleBook<FaRule<S, C>>;

impl<S: State, C: Symbol> DeterministicRuleBook<FaRule<S, C>> {
    /// The state reached from `state` on `character`, if any rule applies.
    pub fn next_state(&self, state: &S, character: &C) -> Option<S> {
        self.next_configuration(state, Some(character))
    }
}

impl<S: State, C: Symbol> NondeterministicRuleBook<FaRule<S, C>> {
    /// The set of states reachable from any of `states` on `character`.
    ///
    /// Passing `None` follows exactly one layer of free moves.
    pub fn next_states(&self, states: &BTreeSet<S>, character: Option<&C>) -> BTreeSet<S> {
        self.next_configurations(states, character)
    }
}

/// A deterministic finite automaton.
///
/// Reading a symbol with no matching rule leaves the machine stuck for good.
/// Free moves in the rulebook are followed before every read and acceptance check.
#[derive(Debug, Clone)]
pub struct Dfa<S, C> {
    current_state: Option<S>,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DfaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> Dfa<S, C> {
    /// Creates a machine in `current_state` sharing the given accept states and rulebook.
    pub fn new(
        current_state: S,
        accept_states: Arc<BTreeSet<S>>,
        rulebook: Arc<DfaRuleBook<S, C>>,
    ) -> Self {
        Self {
            current_state: Some(current_state),
            accept_states,
            rulebook,
        }
    }

    /// Returns the current state after following any pending free moves, or `None` once
    /// stuck.
    pub fn current_state(&self) -> Option<S> {
        self.current_state
            .clone()
            .map(|state| self.rulebook.follow_free_moves(state))
    }
}

impl<S: State, C: Symbol> Automaton for Dfa<S, C> {
    type Symbol = C;

    fn read_symbol(&mut self, character: &C) {
        let Some(state) = self.current_state() else {
            return;
        };

        self.current_state = self.rulebook.next_state(&state, character);
        match &self.current_state {
            Some(next) => tracing::trace!(from = ?state, ?character, to = ?next, "dfa step"),
            None => tracing::debug!(?state, ?character, "dfa stuck: no rule applies"),
        }
    }

    fn is_accepting(&self) -> bool {
        self.current_state()
            .is_some_and(|state| self.accept_states.contains(&state))
    }

    fn is_stuck(&self) -> bool {
        self.current_state.is_none()
    }
}

/// Describes a DFA by its start state, accept states and rulebook.
#[derive(Debug, Clone)]
pub struct DfaDesign<S, C> {
    start_state: S,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DfaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> DfaDesign<S, C> {
    /// Creates a design from its start state, accept states and rulebook.
    pub fn new(
        start_state: S,
        accept_states: impl IntoIterator<Item = S>,
        rulebook: impl Into<Arc<DfaRuleBook<S, C>>>,
    ) -> Self {
        Self {
            start_state,
            accept_states: Arc::new(accept_states.into_iter().collect()),
            rulebook: rulebook.into(),
        }
    }

    pub fn start_state(&self) -> &S {
        &self.start_state
    }

    pub fn accept_states(&self) -> &BTreeSet<S> {
        &self.accept_states
    }

    pub fn rulebook(&self) -> &DfaRuleBook<S, C> {
        &self.rulebook
    }
}

impl<S: State, C: Symbol> Design for DfaDesign<S, C> {
    type Machine = Dfa<S, C>;

    fn build_machine(&self) -> Dfa<S, C> {
        Dfa::new(
            self.start_state.clone(),
            Arc::clone(&self.accept_states),
            Arc::clone(&self.rulebook),
        )
    }
}

/// A nondeterministic finite automaton with free moves.
///
/// The stored state set is closed under free moves every time it is read.
#[derive(Debug, Clone)]
pub struct Nfa<S, C> {
    current_states: BTreeSet<S>,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<NfaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> Nfa<S, C> {
    /// Creates a machine whose current states are `current_states`.
    pub fn new(
        current_states: BTreeSet<S>,
        accept_states: Arc<BTreeSet<S>>,
        rulebook: Arc<NfaRuleBook<S, C>>,
    ) -> Self {
        Self {
            current_states,
            accept_states,
            rulebook,
        }
    }

    /// Returns the current states, including everything reachable by free moves.
    pub fn current_states(&self) -> BTreeSet<S> {
        self.rulebook.follow_free_moves(self.current_states.clone())
    }
}

impl<S: State, C: Symbol> Automaton for Nfa<S, C> {
    type Symbol = C;

    fn read_symbol(&mut self, character: &C) {
        let next = self
            .rulebook
            .next_states(&self.current_states(), Some(character));
        tracing::trace!(?character, states = ?next, "nfa step");
        self.current_states = next;
    }

    fn is_accepting(&self) -> bool {
        !self.current_states().is_disjoint(&self.accept_states)
    }

    fn is_stuck(&self) -> bool {
        self.current_states.is_empty()
    }
}

/// Describes an NFA by its start state, accept states and rulebook.
#[derive(Debug, Clone)]
pub struct NfaDesign<S, C> {
    start_state: S,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<NfaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> NfaDesign<S, C> {
    /// Creates a design from its start state, accept states and rulebook.
    pub fn new(
        start_state: S,
        accept_states: impl IntoIterator<Item = S>,
        rulebook: impl Into<Arc<NfaRuleBook<S, C>>>,
    ) -> Self {
        Self {
            start_state,
            accept_states: Arc::new(accept_states.into_iter().collect()),
            rulebook: rulebook.into(),
        }
    }

    pub fn start_state(&self) -> &S {
        &self.start_state
    }

    pub fn accept_states(&self) -> &BTreeSet<S> {
        &self.accept_states
    }

    pub fn rulebook(&self) -> &NfaRuleBook<S, C> {
        &self.rulebook
    }

    /// Builds a machine whose current states are `states` instead of the start state.
    pub fn build_machine_with(&self, states: BTreeSet<S>) -> Nfa<S, C> {
        Nfa::new(
            states,
            Arc::clone(&self.accept_states),
            Arc::clone(&self.rulebook),
        )
    }
}

impl<S: State, C: Symbol> Design for NfaDesign<S, C> {
    type Machine = Nfa<S, C>;

    fn build_machine(&self) -> Nfa<S, C> {
        self.build_machine_with(BTreeSet::from([self.start_state.clone()]))
    }
}
