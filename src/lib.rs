//! This crate provides rule-based engines for finite automata (DFA/NFA), pushdown automata
//! (DPDA/NPDA) and single-tape deterministic Turing Machines, together with subset
//! construction for turning an NFA into an equivalent DFA, an opt-in rule table analyzer,
//! and a catalog of reference machines.

pub mod analyzer;
pub mod catalog;
pub mod finite;
pub mod machine;
pub mod pushdown;
pub mod rule;
pub mod rulebook;
pub mod simulation;
pub mod turing;
pub mod types;

/// Re-exports the analysis functions and `AnalysisError` from the analyzer module.
pub use analyzer::{analyze_dfa, analyze_dpda, analyze_dtm, analyze_nfa, analyze_npda, AnalysisError};
/// Re-exports the catalog lookup helpers.
pub use catalog::{lookup, CatalogEntry, CatalogMachine, CATALOG};
/// Re-exports the finite automaton types.
pub use finite::{Dfa, DfaDesign, DfaRuleBook, FaRule, Nfa, NfaDesign, NfaRuleBook};
/// Re-exports the `Automaton` and `Design` traits.
pub use machine::{Automaton, Design};
/// Re-exports the pushdown automaton types.
pub use pushdown::{
    Dpda, DpdaDesign, DpdaRuleBook, Npda, NpdaDesign, NpdaRuleBook, PdaConfiguration, PdaRule,
    PdaState, Stack,
};
/// Re-exports the `Rule` trait.
pub use rule::Rule;
/// Re-exports the generic rulebooks.
pub use rulebook::{DeterministicRuleBook, NondeterministicRuleBook};
/// Re-exports the subset construction driver.
pub use simulation::NfaSimulation;
/// Re-exports the Turing Machine types.
pub use turing::{Dtm, DtmDesign, DtmRuleBook, HeadStart, Tape, TmConfiguration, TmRule};
/// Re-exports the shared types and constants.
pub use types::{
    AutomatonError, Direction, Halt, Step, DEFAULT_BLANK_SYMBOL, MAX_EXECUTION_STEPS,
};
