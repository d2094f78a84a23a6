//! Pushdown automata: the persistent `Stack`, the `PdaConfiguration` snapshot, `PdaRule`,
//! and the deterministic (`Dpda`) and nondeterministic (`Npda`) machines with their designs.

use crate::machine::{Automaton, Design};
use crate::rule::{triggers_collide, Rule};
use crate::rulebook::{DeterministicRuleBook, NondeterministicRuleBook};
use crate::types::{State, Symbol};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// An immutable pushdown store.
///
/// `push` and `pop` return new stacks and leave the receiver untouched. Serialized as
/// `{"contents": [...]}` listing the symbols top first, the same order `Stack::new` takes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stack<C> {
    // Bottom first, so the top is the last element.
    contents: Vec<C>,
}

impl<C: Clone> Stack<C> {
    /// Creates a stack from symbols listed top first.
    pub fn new(contents: impl IntoIterator<Item = C>) -> Self {
        let mut contents: Vec<C> = contents.into_iter().collect();
        contents.reverse();
        Self { contents }
    }

    /// Returns a stack with `character` on top.
    pub fn push(&self, character: C) -> Self {
        let mut contents = self.contents.clone();
        contents.push(character);
        Self { contents }
    }

    /// Returns the stack without its top symbol. Popping an empty stack yields an empty stack.
    pub fn pop(&self) -> Self {
        let mut contents = self.contents.clone();
        contents.pop();
        Self { contents }
    }

    /// Returns the top symbol, if any.
    pub fn top(&self) -> Option<&C> {
        self.contents.last()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Iterates the symbols from the top down.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.contents.iter().rev()
    }
}

impl<C: Serialize> Serialize for Stack<C> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        #[derive(Serialize)]
        struct TopFirst<'a, C> {
            contents: Vec<&'a C>,
        }

        TopFirst {
            contents: self.contents.iter().rev().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, C: Deserialize<'de>> Deserialize<'de> for Stack<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct TopFirst<C> {
            contents: Vec<C>,
        }

        let TopFirst { mut contents } = TopFirst::deserialize(deserializer)?;
        contents.reverse();
        Ok(Self { contents })
    }
}

impl<C: fmt::Display> fmt::Display for Stack<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols = self.contents.iter().rev();
        match symbols.next() {
            Some(top) => write!(f, "({})", top)?,
            None => write!(f, "()")?,
        }
        symbols.try_for_each(|symbol| write!(f, "{}", symbol))
    }
}

/// The control state of a pushdown configuration.
///
/// `Stuck` is a terminal sink that no rule ever leaves and that never collides
/// with a caller-supplied state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PdaState<S> {
    /// A caller-supplied state.
    Active(S),
    /// The sink entered when no rule applies.
    Stuck,
}

/// A pushdown machine snapshot: control state plus stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdaConfiguration<S, C> {
    /// The control state, or the stuck sink.
    pub state: PdaState<S>,
    /// The stack contents.
    pub stack: Stack<C>,
}

impl<S: State, C: Symbol> PdaConfiguration<S, C> {
    /// Creates an active configuration in `state`.
    pub fn new(state: S, stack: Stack<C>) -> Self {
        Self {
            state: PdaState::Active(state),
            stack,
        }
    }

    /// The same stack, moved to the stuck sink.
    pub fn stuck(&self) -> Self {
        Self {
            state: PdaState::Stuck,
            stack: self.stack.clone(),
        }
    }

    pub fn is_stuck(&self) -> bool {
        self.state == PdaState::Stuck
    }

    /// The caller-supplied state, or `None` when stuck.
    pub fn active_state(&self) -> Option<&S> {
        match &self.state {
            PdaState::Active(state) => Some(state),
            PdaState::Stuck => None,
        }
    }
}

impl<S: fmt::Debug, C: fmt::Display> fmt::Display for PdaConfiguration<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            PdaState::Active(state) => write!(f, "{:?} {}", state, self.stack),
            PdaState::Stuck => write!(f, "stuck {}", self.stack),
        }
    }
}

/// A pushdown transition: in `state`, reading `character` with `pop_character` on top,
/// move to `next_state`, replacing the top with `push_characters`.
///
/// The first of `push_characters` ends up on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PdaRule<S, C> {
    /// The state the rule leaves from.
    pub state: S,
    /// The input symbol consumed, or `None` for a free move.
    pub character: Option<C>,
    /// The state the rule moves to.
    pub next_state: S,
    /// The symbol that must be on top of the stack; it is popped.
    pub pop_character: C,
    /// The symbols pushed in its place, top first.
    pub push_characters: Vec<C>,
}

impl<S, C> PdaRule<S, C> {
    /// Creates a rule consuming `character`.
    pub fn new(
        state: S,
        character: C,
        next_state: S,
        pop_character: C,
        push_characters: Vec<C>,
    ) -> Self {
        Self {
            state,
            character: Some(character),
            next_state,
            pop_character,
            push_characters,
        }
    }

    /// Creates a rule that consumes no input.
    pub fn free(state: S, next_state: S, pop_character: C, push_characters: Vec<C>) -> Self {
        Self {
            state,
            character: None,
            next_state,
            pop_character,
            push_characters,
        }
    }
}

impl<S: State, C: Symbol> PdaRule<S, C> {
    fn next_stack(&self, configuration: &PdaConfiguration<S, C>) -> Stack<C> {
        self.push_characters
            .iter()
            .rev()
            .fold(configuration.stack.pop(), |stack, character| {
                stack.push(character.clone())
            })
    }
}

impl<S: State, C: Symbol> Rule for PdaRule<S, C> {
    type State = S;
    type Symbol = C;
    type Configuration = PdaConfiguration<S, C>;

    fn state(&self) -> &S {
        &self.state
    }

    fn next_state(&self) -> &S {
        &self.next_state
    }

    fn symbol(&self) -> Option<&C> {
        self.character.as_ref()
    }

    fn matches(&self, configuration: &PdaConfiguration<S, C>) -> bool {
        configuration.active_state() == Some(&self.state)
            && configuration.stack.top() == Some(&self.pop_character)
    }

    fn follow(&self, configuration: &PdaConfiguration<S, C>) -> PdaConfiguration<S, C> {
        PdaConfiguration::new(self.next_state.clone(), self.next_stack(configuration))
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.state == other.state
            && self.pop_character == other.pop_character
            && triggers_collide(self.symbol(), other.symbol())
    }
}

pub type DpdaRuleBook<S, C> = DeterministicRuleBook<PdaRule<S, C>>;
pub type NpdaRuleBook<S, C> = NondeterministicRuleBook<PdaRule<S, C>>;

/// A deterministic pushdown automaton.
#[derive(Debug, Clone)]
pub struct Dpda<S, C> {
    current_configuration: PdaConfiguration<S, C>,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DpdaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> Dpda<S, C> {
    /// Creates a machine in `current_configuration` sharing the given accept states and
    /// rulebook.
    pub fn new(
        current_configuration: PdaConfiguration<S, C>,
        accept_states: Arc<BTreeSet<S>>,
        rulebook: Arc<DpdaRuleBook<S, C>>,
    ) -> Self {
        Self {
            current_configuration,
            accept_states,
            rulebook,
        }
    }

    /// The current configuration after following any pending free moves.
    pub fn current_configuration(&self) -> PdaConfiguration<S, C> {
        self.rulebook
            .follow_free_moves(self.current_configuration.clone())
    }

    /// Replaces the current configuration.
    pub fn set_configuration(&mut self, configuration: PdaConfiguration<S, C>) {
        self.current_configuration = configuration;
    }

    fn next_configuration(&self, character: &C) -> PdaConfiguration<S, C> {
        let configuration = self.current_configuration();

        match self.rulebook.next_configuration(&configuration, Some(character)) {
            Some(next) => {
                tracing::trace!(?character, to = ?next, "dpda step");
                next
            }
            None => {
                tracing::debug!(?character, from = ?configuration, "dpda stuck: no rule applies");
                configuration.stuck()
            }
        }
    }
}

impl<S: State, C: Symbol> Automaton for Dpda<S, C> {
    type Symbol = C;

    fn read_symbol(&mut self, character: &C) {
        let next = self.next_configuration(character);
        self.set_configuration(next);
    }

    fn is_accepting(&self) -> bool {
        self.current_configuration()
            .active_state()
            .is_some_and(|state| self.accept_states.contains(state))
    }

    fn is_stuck(&self) -> bool {
        self.current_configuration.is_stuck()
    }
}

/// Describes a DPDA; machines start with only `bottom_character` on the stack.
#[derive(Debug, Clone)]
pub struct DpdaDesign<S, C> {
    start_state: S,
    bottom_character: C,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DpdaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> DpdaDesign<S, C> {
    /// Creates a design from its start state, bottom marker, accept states and rulebook.
    pub fn new(
        start_state: S,
        bottom_character: C,
        accept_states: impl IntoIterator<Item = S>,
        rulebook: impl Into<Arc<DpdaRuleBook<S, C>>>,
    ) -> Self {
        Self {
            start_state,
            bottom_character,
            accept_states: Arc::new(accept_states.into_iter().collect()),
            rulebook: rulebook.into(),
        }
    }

    pub fn start_state(&self) -> &S {
        &self.start_state
    }

    pub fn bottom_character(&self) -> &C {
        &self.bottom_character
    }

    pub fn accept_states(&self) -> &BTreeSet<S> {
        &self.accept_states
    }

    pub fn rulebook(&self) -> &DpdaRuleBook<S, C> {
        &self.rulebook
    }

    /// The configuration every machine built from this design starts in.
    pub fn start_configuration(&self) -> PdaConfiguration<S, C> {
        PdaConfiguration::new(
            self.start_state.clone(),
            Stack::new([self.bottom_character.clone()]),
        )
    }
}

impl<S: State, C: Symbol> Design for DpdaDesign<S, C> {
    type Machine = Dpda<S, C>;

    fn build_machine(&self) -> Dpda<S, C> {
        Dpda::new(
            self.start_configuration(),
            Arc::clone(&self.accept_states),
            Arc::clone(&self.rulebook),
        )
    }
}

/// A nondeterministic pushdown automaton tracking every reachable configuration.
#[derive(Debug, Clone)]
pub struct Npda<S, C> {
    current_configurations: BTreeSet<PdaConfiguration<S, C>>,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<NpdaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> Npda<S, C> {
    /// Creates a machine tracking `current_configurations`.
    pub fn new(
        current_configurations: BTreeSet<PdaConfiguration<S, C>>,
        accept_states: Arc<BTreeSet<S>>,
        rulebook: Arc<NpdaRuleBook<S, C>>,
    ) -> Self {
        Self {
            current_configurations,
            accept_states,
            rulebook,
        }
    }

    /// The current configurations, closed under free moves.
    pub fn current_configurations(&self) -> BTreeSet<PdaConfiguration<S, C>> {
        self.rulebook
            .follow_free_moves(self.current_configurations.clone())
    }
}

impl<S: State, C: Symbol> Automaton for Npda<S, C> {
    type Symbol = C;

    fn read_symbol(&mut self, character: &C) {
        let next = self
            .rulebook
            .next_configurations(&self.current_configurations(), Some(character));
        tracing::trace!(?character, configurations = next.len(), "npda step");
        self.current_configurations = next;
    }

    fn is_accepting(&self) -> bool {
        self.current_configurations()
            .iter()
            .filter_map(PdaConfiguration::active_state)
            .any(|state| self.accept_states.contains(state))
    }

    fn is_stuck(&self) -> bool {
        self.current_configurations.is_empty()
    }
}

/// Describes an NPDA; machines start with only `bottom_character` on the stack.
#[derive(Debug, Clone)]
pub struct NpdaDesign<S, C> {
    start_state: S,
    bottom_character: C,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<NpdaRuleBook<S, C>>,
}

impl<S: State, C: Symbol> NpdaDesign<S, C> {
    /// Creates a design from its start state, bottom marker, accept states and rulebook.
    pub fn new(
        start_state: S,
        bottom_character: C,
        accept_states: impl IntoIterator<Item = S>,
        rulebook: impl Into<Arc<NpdaRuleBook<S, C>>>,
    ) -> Self {
        Self {
            start_state,
            bottom_character,
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

    pub fn bottom_character(&self) -> &C {
        &self.bottom_character
    }

    pub fn rulebook(&self) -> &NpdaRuleBook<S, C> {
        &self.rulebook
    }

    /// The single configuration every machine built from this design starts in.
    pub fn start_configuration(&self) -> PdaConfiguration<S, C> {
        PdaConfiguration::new(
            self.start_state.clone(),
            Stack::new([self.bottom_character.clone()]),
        )
    }
}

impl<S: State, C: Symbol> Design for NpdaDesign<S, C> {
    type Machine = Npda<S, C>;

    fn build_machine(&self) -> Npda<S, C> {
        Npda::new(
            BTreeSet::from([self.start_configuration()]),
            Arc::clone(&self.accept_states),
            Arc::clone(&self.rulebook),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_rulebook() -> DpdaRuleBook<u32, char> {
        DpdaRuleBook::new(vec![
            PdaRule::new(1, '(', 2, '$', vec!['b', '$']),
            PdaRule::new(2, '(', 2, 'b', vec!['b', 'b']),
            PdaRule::new(2, ')', 2, 'b', vec![]),
            PdaRule::free(2, 1, '$', vec!['$']),
        ])
    }

    fn start(state: u32) -> PdaConfiguration<u32, char> {
        PdaConfiguration::new(state, Stack::new(['$']))
    }

    #[test]
    fn test_stack_operations() {
        let stack = Stack::new(['a', 'b', 'c', 'd', 'e']);

        assert_eq!(stack.top(), Some(&'a'));
        assert_eq!(stack.pop().pop().top(), Some(&'c'));
        assert_eq!(stack.push('x').push('y').top(), Some(&'y'));
        assert_eq!(stack.push('x').push('y').pop().top(), Some(&'x'));
        assert_eq!(stack.push('x').pop(), stack);
        assert_eq!(stack.len(), 5);
        assert_eq!(stack.to_string(), "(a)bcde");
    }

    #[test]
    fn test_stack_serializes_top_first() {
        let stack = Stack::new(['a', '$']);
        assert_eq!(
            serde_json::to_string(&stack).unwrap(),
            r#"{"contents":["a","$"]}"#
        );

        let stack: Stack<char> = serde_json::from_str(r#"{"contents":["a","$"]}"#).unwrap();
        assert_eq!(stack.top(), Some(&'a'));
        assert_eq!(stack, Stack::new(['a', '$']));
        assert_eq!(stack.pop().top(), Some(&'$'));
    }

    #[test]
    fn test_stack_pop_empty() {
        let stack: Stack<char> = Stack::new([]);

        assert!(stack.pop().is_empty());
        assert_eq!(stack.top(), None);
        assert_eq!(stack.to_string(), "()");
    }

    #[test]
    fn test_rule_applies_and_follows() {
        let rule = PdaRule::new(1, '(', 2, '$', vec!['b', '$']);
        let configuration = start(1);

        assert!(rule.applies_to(&configuration, Some(&'(')));
        assert!(!rule.applies_to(&configuration, Some(&')')));
        assert!(!rule.applies_to(&start(2), Some(&'(')));

        let next = rule.follow(&configuration);
        assert_eq!(next, PdaConfiguration::new(2, Stack::new(['b', '$'])));
        assert_eq!(next.to_string(), "2 (b)$");
    }

    #[test]
    fn test_stuck_never_matches() {
        let rule = PdaRule::new(1, '(', 2, '$', vec!['b', '$']);

        assert!(!rule.applies_to(&start(1).stuck(), Some(&'(')));
    }

    #[test]
    fn test_rulebook_next_configuration() {
        let rulebook = balanced_rulebook();

        let configuration = rulebook.next_configuration(&start(1), Some(&'(')).unwrap();
        let configuration = rulebook.next_configuration(&configuration, Some(&'(')).unwrap();
        let configuration = rulebook.next_configuration(&configuration, Some(&')')).unwrap();

        assert_eq!(configuration, PdaConfiguration::new(2, Stack::new(['b', '$'])));
        assert_eq!(rulebook.next_configuration(&start(1), Some(&')')), None);
    }

    #[test]
    fn test_dpda_follows_free_moves() {
        let mut dpda = Dpda::new(
            start(1),
            Arc::new(BTreeSet::from([1])),
            Arc::new(balanced_rulebook()),
        );

        assert!(dpda.is_accepting());
        dpda.read_sequence("(()".chars());
        assert!(!dpda.is_accepting());
        assert_eq!(
            dpda.current_configuration(),
            PdaConfiguration::new(2, Stack::new(['b', '$']))
        );

        let mut dpda = Dpda::new(
            start(2),
            Arc::new(BTreeSet::from([1])),
            Arc::new(balanced_rulebook()),
        );
        dpda.read_sequence("(()(".chars());
        assert!(!dpda.is_accepting());
        dpda.read_sequence("))()".chars());
        assert!(dpda.is_accepting());
        assert_eq!(dpda.current_configuration(), start(1));
    }

    #[test]
    fn test_dpda_design_accepts() {
        let design = DpdaDesign::new(1, '$', [1], balanced_rulebook());

        assert!(design.accepts("(((())))".chars()));
        assert!(design.accepts("()(())(((())))".chars()));
        assert!(!design.accepts("()(())(((()))".chars()));
        assert!(!design.accepts("()(())(((()))))".chars()));
    }

    #[test]
    fn test_dpda_stays_stuck() {
        let design = DpdaDesign::new(1, '$', [1], balanced_rulebook());
        let mut dpda = design.build_machine();

        dpda.read_sequence("())".chars());
        assert!(dpda.is_stuck());
        assert!(!dpda.is_accepting());

        dpda.read_sequence("()".chars());
        assert!(dpda.is_stuck());
        assert!(!dpda.is_accepting());

        let stuck = dpda.current_configuration();
        for character in ['(', ')', '('] {
            dpda.read_symbol(&character);
            assert!(dpda.is_stuck());
            assert_eq!(dpda.current_configuration(), stuck);
        }
        assert!(!dpda.is_accepting());
    }

    #[test]
    fn test_dpda_equal_as_and_bs() {
        let rulebook = DpdaRuleBook::new(vec![
            PdaRule::new(1, 'a', 2, '$', vec!['a', '$']),
            PdaRule::new(1, 'b', 2, '$', vec!['b', '$']),
            PdaRule::new(2, 'a', 2, 'a', vec!['a', 'a']),
            PdaRule::new(2, 'b', 2, 'b', vec!['b', 'b']),
            PdaRule::new(2, 'a', 2, 'b', vec![]),
            PdaRule::new(2, 'b', 2, 'a', vec![]),
            PdaRule::free(2, 1, '$', vec!['$']),
        ]);
        let design = DpdaDesign::new(1, '$', [1], rulebook);

        assert!(design.accepts("ababab".chars()));
        assert!(design.accepts("bbbaaaab".chars()));
        assert!(!design.accepts("baa".chars()));
    }

    #[test]
    fn test_npda_even_palindromes() {
        let rulebook = NpdaRuleBook::new(vec![
            PdaRule::new(1, 'a', 1, '$', vec!['a', '$']),
            PdaRule::new(1, 'a', 1, 'a', vec!['a', 'a']),
            PdaRule::new(1, 'a', 1, 'b', vec!['a', 'b']),
            PdaRule::new(1, 'b', 1, '$', vec!['b', '$']),
            PdaRule::new(1, 'b', 1, 'a', vec!['b', 'a']),
            PdaRule::new(1, 'b', 1, 'b', vec!['b', 'b']),
            PdaRule::free(1, 2, '$', vec!['$']),
            PdaRule::free(1, 2, 'a', vec!['a']),
            PdaRule::free(1, 2, 'b', vec!['b']),
            PdaRule::new(2, 'a', 2, 'a', vec![]),
            PdaRule::new(2, 'b', 2, 'b', vec![]),
            PdaRule::free(2, 3, '$', vec!['$']),
        ]);
        let design = NpdaDesign::new(1, '$', [3], rulebook);

        assert_eq!(design.bottom_character(), &'$');
        assert_eq!(design.start_configuration(), start(1));
        assert_eq!(
            design.build_machine().current_configurations(),
            BTreeSet::from([start(1), start(2), start(3)])
        );

        assert!(design.accepts("abba".chars()));
        assert!(design.accepts("babbaabbab".chars()));
        assert!(!design.accepts("abb".chars()));
        assert!(!design.accepts("baabaa".chars()));

        let mut npda = design.build_machine();
        npda.read_sequence("abb".chars());
        assert!(npda.current_configurations().contains(&PdaConfiguration::new(
            2,
            Stack::new(['a', '$'])
        )));
    }
}
