//! This module defines the `Automaton` and `Design` traits: the stepping loop shared by every
//! input-driven machine, and the factories that produce fresh machines from an immutable
//! description.

use std::borrow::Borrow;

/// A live machine consuming input one symbol at a time.
///
/// Implementors own their current configuration slot exclusively; the rulebook they
/// consult is shared and read-only.
pub trait Automaton {
    /// The type of input symbols.
    type Symbol;

    /// Replaces the current configuration with its successor on `symbol`.
    fn read_symbol(&mut self, symbol: &Self::Symbol);

    /// Returns `true` if the current configuration is accepting.
    fn is_accepting(&self) -> bool;

    /// Returns `true` once the machine can never make another move.
    fn is_stuck(&self) -> bool;

    /// Reads `symbols` in order, skipping whatever remains once the machine is stuck.
    fn read_sequence<I>(&mut self, symbols: I)
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Symbol>,
    {
        for symbol in symbols {
            if self.is_stuck() {
                break;
            }
            self.read_symbol(symbol.borrow());
        }
    }
}

/// An immutable machine description that can build any number of fresh machines.
pub trait Design {
    /// The machine type produced by this design.
    type Machine: Automaton;

    /// Builds a machine in the design's start configuration.
    fn build_machine(&self) -> Self::Machine;

    /// Returns `true` if a fresh machine accepts after reading the whole of `symbols`.
    fn accepts<I>(&self, symbols: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<<Self::Machine as Automaton>::Symbol>,
    {
        let mut machine = self.build_machine();
        machine.read_sequence(symbols);
        machine.is_accepting()
    }
}
