//! This module defines the data structures and types shared by every machine family,
//! including head directions, execution outcomes, engine-wide constants and error types.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// The default blank symbol used on a Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The maximum number of steps a bounded Turing run executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Marker for values usable as machine states.
///
/// States must be cloneable and totally ordered so that sets of states can themselves
/// serve as states (see [`crate::simulation::NfaSimulation`]).
pub trait State: Clone + Ord + Debug {}

impl<T: Clone + Ord + Debug> State for T {}

/// Marker for values usable as input, stack or tape symbols.
pub trait Symbol: Clone + Ord + Debug {}

impl<T: Clone + Ord + Debug> Symbol for T {}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

/// Represents the outcome of a single Turing Machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A rule applied and the machine moved to a new configuration.
    Continue,
    /// No rule applies to the current configuration.
    Halt(Halt),
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The machine is in an accept state.
    Accepted,
    /// The machine is not accepting and has no legal move.
    Stuck,
}

/// Represents the errors surfaced by the engine's outer entry points.
///
/// Stepping a machine never fails; these errors come from bounded runs,
/// catalog lookups and rule-table analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A bounded run did not reach an accepting or stuck configuration in time.
    #[error("Machine did not halt within {0} steps")]
    StepLimitExceeded(usize),
    /// No catalog machine is registered under the given name.
    #[error("Unknown machine: {0}")]
    UnknownMachine(String),
    /// The requested operation is not available for this machine family.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// Indicates a problem found while validating a rule table.
    #[error("Rule table validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_and_outcomes_serialize_as_names() {
        let outcomes = [(Direction::Left, Halt::Accepted), (Direction::Right, Halt::Stuck)];

        let json = serde_json::to_string(&outcomes).unwrap();
        assert_eq!(json, r#"[["Left","Accepted"],["Right","Stuck"]]"#);

        let parsed: Vec<(Direction, Halt)> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcomes);
        assert!(serde_json::from_str::<Direction>("\"Up\"").is_err());
    }

    #[test]
    fn test_error_display() {
        let error = AutomatonError::StepLimitExceeded(25);

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("did not halt"));
        assert!(error_msg.contains("25"));

        let error = AutomatonError::UnknownMachine("nope".to_string());
        assert_eq!(error.to_string(), "Unknown machine: nope");
    }
}
