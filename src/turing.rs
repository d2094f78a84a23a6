//! This module defines the single-tape deterministic Turing Machine: the persistent `Tape`,
//! the `TmConfiguration` snapshot, `TmRule`, the `Dtm` machine and its `DtmDesign` factory.
//!
//! Unlike the input-driven families, a Turing Machine consumes no external symbols. Each
//! rule "reads" the symbol under the head, so a step is a deterministic rule lookup keyed on
//! that symbol.

use crate::rule::{triggers_collide, Rule};
use crate::rulebook::DeterministicRuleBook;
use crate::types::{AutomatonError, Direction, Halt, State, Step, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// An immutable, unbounded Turing Machine tape.
///
/// `left` holds the cells left of the head with the nearest cell last; `right` holds the
/// cells right of the head with the nearest cell first. Moving past either end reads a
/// blank cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tape<C> {
    left: Vec<C>,
    middle: C,
    right: Vec<C>,
    blank: C,
}

/// Where the head starts when a tape is built from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadStart {
    /// On the first input symbol.
    #[default]
    First,
    /// On the last input symbol.
    Last,
}

impl<C: Clone + PartialEq> Tape<C> {
    /// Creates a tape from the cells left of the head (nearest last), the cell under the
    /// head, and the cells right of it (nearest first).
    pub fn new(left: Vec<C>, middle: C, right: Vec<C>, blank: C) -> Self {
        Self {
            left,
            middle,
            right,
            blank,
        }
    }

    /// Lays `input` out on a tape with the head on its first or last symbol.
    ///
    /// Empty input yields a tape whose head rests on a blank cell.
    pub fn from_input(input: impl IntoIterator<Item = C>, blank: C, head: HeadStart) -> Self {
        let mut cells: Vec<C> = input.into_iter().collect();

        match head {
            HeadStart::First if !cells.is_empty() => {
                let middle = cells.remove(0);
                Self::new(Vec::new(), middle, cells, blank)
            }
            HeadStart::Last => match cells.pop() {
                Some(middle) => Self::new(cells, middle, Vec::new(), blank),
                None => Self::new(Vec::new(), blank.clone(), Vec::new(), blank),
            },
            HeadStart::First => Self::new(Vec::new(), blank.clone(), Vec::new(), blank),
        }
    }

    /// The symbol under the head.
    pub fn middle(&self) -> &C {
        &self.middle
    }

    pub fn left(&self) -> &[C] {
        &self.left
    }

    pub fn right(&self) -> &[C] {
        &self.right
    }

    pub fn blank(&self) -> &C {
        &self.blank
    }

    /// Returns a tape with `character` written under the head.
    pub fn write(&self, character: C) -> Self {
        Self::new(
            self.left.clone(),
            character,
            self.right.clone(),
            self.blank.clone(),
        )
    }

    pub fn move_head_left(&self) -> Self {
        let mut left = self.left.clone();
        let middle = left.pop().unwrap_or_else(|| self.blank.clone());
        let mut right = Vec::with_capacity(self.right.len() + 1);
        right.push(self.middle.clone());
        right.extend(self.right.iter().cloned());

        Self::new(left, middle, right, self.blank.clone())
    }

    pub fn move_head_right(&self) -> Self {
        let mut left = self.left.clone();
        left.push(self.middle.clone());
        let mut right = self.right.iter().cloned();
        let middle = right.next().unwrap_or_else(|| self.blank.clone());

        Self::new(left, middle, right.collect(), self.blank.clone())
    }

    pub fn move_head(&self, direction: Direction) -> Self {
        match direction {
            Direction::Left => self.move_head_left(),
            Direction::Right => self.move_head_right(),
        }
    }

    /// All visited cells from left to right, with blanks trimmed from both ends.
    pub fn contents(&self) -> Vec<C> {
        let cells: Vec<C> = self
            .left
            .iter()
            .chain(std::iter::once(&self.middle))
            .chain(self.right.iter())
            .cloned()
            .collect();

        let start = cells.iter().position(|c| *c != self.blank);
        let end = cells.iter().rposition(|c| *c != self.blank);
        match (start, end) {
            (Some(start), Some(end)) => cells[start..=end].to_vec(),
            _ => Vec::new(),
        }
    }
}

impl<C: fmt::Display> fmt::Display for Tape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.left.iter().try_for_each(|c| write!(f, "{}", c))?;
        write!(f, "({})", self.middle)?;
        self.right.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// A Turing Machine snapshot: control state plus tape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TmConfiguration<S, C> {
    /// The control state.
    pub state: S,
    /// The tape, with the head position.
    pub tape: Tape<C>,
}

impl<S, C> TmConfiguration<S, C> {
    pub fn new(state: S, tape: Tape<C>) -> Self {
        Self { state, tape }
    }
}

impl<S: fmt::Debug, C: fmt::Display> fmt::Display for TmConfiguration<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.state, self.tape)
    }
}

/// A Turing transition: in `state` with `character` under the head, write
/// `write_character`, move the head in `direction`, and enter `next_state`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TmRule<S, C> {
    /// The state the rule leaves from.
    pub state: S,
    /// The symbol that must be under the head.
    pub character: C,
    /// The state the rule moves to.
    pub next_state: S,
    /// The symbol written under the head.
    pub write_character: C,
    /// Where the head moves after writing.
    pub direction: Direction,
}

impl<S, C> TmRule<S, C> {
    /// Creates a rule; see the field docs for the meaning of each argument.
    pub fn new(
        state: S,
        character: C,
        next_state: S,
        write_character: C,
        direction: Direction,
    ) -> Self {
        Self {
            state,
            character,
            next_state,
            write_character,
            direction,
        }
    }
}

impl<S: State, C: Symbol> Rule for TmRule<S, C> {
    type State = S;
    type Symbol = C;
    type Configuration = TmConfiguration<S, C>;

    fn state(&self) -> &S {
        &self.state
    }

    fn next_state(&self) -> &S {
        &self.next_state
    }

    fn symbol(&self) -> Option<&C> {
        Some(&self.character)
    }

    fn matches(&self, configuration: &TmConfiguration<S, C>) -> bool {
        self.state == configuration.state && self.character == *configuration.tape.middle()
    }

    fn follow(&self, configuration: &TmConfiguration<S, C>) -> TmConfiguration<S, C> {
        let tape = configuration
            .tape
            .write(self.write_character.clone())
            .move_head(self.direction);

        TmConfiguration::new(self.next_state.clone(), tape)
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.state == other.state && triggers_collide(self.symbol(), other.symbol())
    }
}

pub type DtmRuleBook<S, C> = DeterministicRuleBook<TmRule<S, C>>;

impl<S: State, C: Symbol> DeterministicRuleBook<TmRule<S, C>> {
    /// Follows the rule matching the symbol under the head, if any.
    pub fn next_tm_configuration(
        &self,
        configuration: &TmConfiguration<S, C>,
    ) -> Option<TmConfiguration<S, C>> {
        self.next_configuration(configuration, Some(configuration.tape.middle()))
    }

    /// Returns `true` if some rule matches the symbol under the head.
    pub fn applies_to_tm(&self, configuration: &TmConfiguration<S, C>) -> bool {
        self.applies_to(configuration, Some(configuration.tape.middle()))
    }
}

/// A single-tape deterministic Turing Machine.
#[derive(Debug, Clone)]
pub struct Dtm<S, C> {
    current_configuration: TmConfiguration<S, C>,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DtmRuleBook<S, C>>,
    step_count: usize,
}

impl<S: State, C: Symbol> Dtm<S, C> {
    /// Creates a machine in `current_configuration` with a zero step count.
    pub fn new(
        current_configuration: TmConfiguration<S, C>,
        accept_states: Arc<BTreeSet<S>>,
        rulebook: Arc<DtmRuleBook<S, C>>,
    ) -> Self {
        Self {
            current_configuration,
            accept_states,
            rulebook,
            step_count: 0,
        }
    }

    pub fn current_configuration(&self) -> &TmConfiguration<S, C> {
        &self.current_configuration
    }

    /// Replaces the current configuration.
    pub fn set_configuration(&mut self, configuration: TmConfiguration<S, C>) {
        self.current_configuration = configuration;
    }

    pub fn tape(&self) -> &Tape<C> {
        &self.current_configuration.tape
    }

    /// Returns the number of steps executed so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_accepting(&self) -> bool {
        self.accept_states
            .contains(&self.current_configuration.state)
    }

    /// Returns `true` when the machine is not accepting and no rule applies.
    pub fn is_stuck(&self) -> bool {
        !self.is_accepting() && !self.rulebook.applies_to_tm(&self.current_configuration)
    }

    /// Executes one transition.
    ///
    /// Returns `Step::Halt` without changing the configuration when no rule applies.
    pub fn step(&mut self) -> Step {
        match self
            .rulebook
            .next_tm_configuration(&self.current_configuration)
        {
            Some(next) => {
                tracing::trace!(step = self.step_count, to = ?next, "dtm step");
                self.set_configuration(next);
                self.step_count += 1;
                Step::Continue
            }
            None => Step::Halt(self.halt()),
        }
    }

    /// Steps until the machine accepts or gets stuck.
    ///
    /// Does not return for machines that loop forever; see [`Dtm::run_for`].
    pub fn run(&mut self) -> Halt {
        while !self.is_accepting() && !self.is_stuck() {
            self.step();
        }

        self.halt()
    }

    /// Like [`Dtm::run`], but gives up after `max_steps` steps.
    pub fn run_for(&mut self, max_steps: usize) -> Result<Halt, AutomatonError> {
        for _ in 0..max_steps {
            if self.is_accepting() || self.is_stuck() {
                return Ok(self.halt());
            }
            self.step();
        }

        if self.is_accepting() || self.is_stuck() {
            Ok(self.halt())
        } else {
            tracing::debug!(max_steps, "dtm step limit exceeded");
            Err(AutomatonError::StepLimitExceeded(max_steps))
        }
    }

    fn halt(&self) -> Halt {
        if self.is_accepting() {
            Halt::Accepted
        } else {
            Halt::Stuck
        }
    }
}

/// Describes a DTM by its start state, accept states and rulebook.
///
/// The tape is supplied per machine.
#[derive(Debug, Clone)]
pub struct DtmDesign<S, C> {
    start_state: S,
    accept_states: Arc<BTreeSet<S>>,
    rulebook: Arc<DtmRuleBook<S, C>>,
}

impl<S: State, C: Symbol> DtmDesign<S, C> {
    /// Creates a design from its start state, accept states and rulebook.
    pub fn new(
        start_state: S,
        accept_states: impl IntoIterator<Item = S>,
        rulebook: impl Into<Arc<DtmRuleBook<S, C>>>,
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

    pub fn rulebook(&self) -> &DtmRuleBook<S, C> {
        &self.rulebook
    }

    /// Builds a machine in the start state over `tape`.
    pub fn build_machine(&self, tape: Tape<C>) -> Dtm<S, C> {
        Dtm::new(
            TmConfiguration::new(self.start_state.clone(), tape),
            Arc::clone(&self.accept_states),
            Arc::clone(&self.rulebook),
        )
    }

    /// Runs a fresh machine over `tape` for at most `max_steps` steps.
    pub fn accepts(&self, tape: Tape<C>, max_steps: usize) -> Result<bool, AutomatonError> {
        let halt = self.build_machine(tape).run_for(max_steps)?;
        Ok(halt == Halt::Accepted)
    }
}
