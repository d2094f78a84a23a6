//! A catalog of reference machines, built once and shared read-only.
//!
//! Every entry can be run against a string through [`CatalogEntry::accepts`], whatever its
//! machine family.

use crate::finite::{DfaDesign, DfaRuleBook, FaRule, NfaDesign, NfaRuleBook};
use crate::machine::Design;
use crate::pushdown::{DpdaDesign, DpdaRuleBook, NpdaDesign, NpdaRuleBook, PdaRule};
use crate::simulation::NfaSimulation;
use crate::turing::{DtmDesign, DtmRuleBook, HeadStart, Tape, TmRule};
use crate::types::{AutomatonError, Direction, DEFAULT_BLANK_SYMBOL, MAX_EXECUTION_STEPS};
use std::collections::BTreeSet;

/// Tokens recognised by the simple-language parser.
///
/// `i` if, `e` else, `w` while, `d` do-nothing, `n` number, `b` boolean, `v` variable;
/// the remaining tokens stand for themselves.
pub const TOKENS: [char; 16] = [
    'i', 'e', 'w', 'd', '(', ')', '{', '}', ';', '=', '+', '*', '<', 'n', 'b', 'v',
];

/// A machine of any family, held by value.
#[derive(Debug, Clone)]
pub enum CatalogMachine {
    Dfa(DfaDesign<u32, char>),
    /// A DFA produced by subset construction, with sets of NFA states as its states.
    SimulatedDfa(DfaDesign<BTreeSet<u32>, char>),
    Nfa(NfaDesign<u32, char>),
    Dpda(DpdaDesign<u32, char>),
    Npda(NpdaDesign<u32, char>),
    Dtm(DtmDesign<u32, char>, HeadStart),
}

impl CatalogMachine {
    /// A short label for the machine family.
    pub fn family(&self) -> &'static str {
        match self {
            CatalogMachine::Dfa(_) | CatalogMachine::SimulatedDfa(_) => "dfa",
            CatalogMachine::Nfa(_) => "nfa",
            CatalogMachine::Dpda(_) => "dpda",
            CatalogMachine::Npda(_) => "npda",
            CatalogMachine::Dtm(..) => "dtm",
        }
    }
}

/// A named reference machine.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// The name used by [`lookup`] and the CLI.
    pub name: &'static str,
    /// A one-line description of the accepted language.
    pub description: &'static str,
    /// The machine design.
    pub machine: CatalogMachine,
}

impl CatalogEntry {
    /// Runs the machine over the characters of `input`.
    ///
    /// Turing Machines receive `input` on their tape and run for at most
    /// [`MAX_EXECUTION_STEPS`] steps.
    pub fn accepts(&self, input: &str) -> Result<bool, AutomatonError> {
        let accepted = match &self.machine {
            CatalogMachine::Dfa(design) => design.accepts(input.chars()),
            CatalogMachine::SimulatedDfa(design) => design.accepts(input.chars()),
            CatalogMachine::Nfa(design) => design.accepts(input.chars()),
            CatalogMachine::Dpda(design) => design.accepts(input.chars()),
            CatalogMachine::Npda(design) => design.accepts(input.chars()),
            CatalogMachine::Dtm(design, head) => {
                let tape = Tape::from_input(input.chars(), DEFAULT_BLANK_SYMBOL, *head);
                return design.accepts(tape, MAX_EXECUTION_STEPS);
            }
        };

        Ok(accepted)
    }

    /// Converts an NFA entry into a DFA by subset construction.
    pub fn determinize(&self) -> Result<DfaDesign<BTreeSet<u32>, char>, AutomatonError> {
        match &self.machine {
            CatalogMachine::Nfa(design) => Ok(NfaSimulation::new(design).to_dfa_design()),
            other => Err(AutomatonError::Unsupported(format!(
                "{} is a {}, only NFAs can be determinized",
                self.name,
                other.family()
            ))),
        }
    }
}

lazy_static::lazy_static! {
    /// All reference machines, in presentation order.
    pub static ref CATALOG: Vec<CatalogEntry> = build_catalog();
}

/// Finds a catalog entry by name.
pub fn lookup(name: &str) -> Result<&'static CatalogEntry, AutomatonError> {
    CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| AutomatonError::UnknownMachine(name.to_string()))
}

/// Returns the names of all catalog entries.
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.name).collect()
}

fn build_catalog() -> Vec<CatalogEntry> {
    let ab_nfa = ab_nfa();
    let ab_dfa = NfaSimulation::new(&ab_nfa).to_dfa_design();

    vec![
        CatalogEntry {
            name: "contains-ab",
            description: "Strings over {a, b} containing the substring ab",
            machine: CatalogMachine::Dfa(contains_ab()),
        },
        CatalogEntry {
            name: "third-from-last-b",
            description: "Strings over {a, b} whose third character from the end is b",
            machine: CatalogMachine::Nfa(third_from_last_b()),
        },
        CatalogEntry {
            name: "multiple-of-two-or-three",
            description: "Runs of a whose length is a multiple of two or three",
            machine: CatalogMachine::Nfa(multiple_of_two_or_three()),
        },
        CatalogEntry {
            name: "ab-nfa",
            description: "NFA with free moves over {a, b}, accepting in state 3",
            machine: CatalogMachine::Nfa(ab_nfa),
        },
        CatalogEntry {
            name: "ab-dfa",
            description: "Subset construction of ab-nfa",
            machine: CatalogMachine::SimulatedDfa(ab_dfa),
        },
        CatalogEntry {
            name: "balanced-parentheses",
            description: "Balanced strings of ( and )",
            machine: CatalogMachine::Dpda(balanced_parentheses()),
        },
        CatalogEntry {
            name: "equal-as-and-bs",
            description: "Strings with as many a as b",
            machine: CatalogMachine::Dpda(equal_as_and_bs()),
        },
        CatalogEntry {
            name: "marked-palindrome",
            description: "Palindromes over {a, b} with an m marking the middle",
            machine: CatalogMachine::Dpda(marked_palindrome()),
        },
        CatalogEntry {
            name: "even-palindrome",
            description: "Even-length palindromes over {a, b}",
            machine: CatalogMachine::Npda(even_palindrome()),
        },
        CatalogEntry {
            name: "simple-parser",
            description: "Token strings of the while/assign language, e.g. w(v<n){v=v*n}",
            machine: CatalogMachine::Npda(simple_parser()),
        },
        CatalogEntry {
            name: "binary-increment",
            description: "Adds one to a binary number, head starting on the last digit",
            machine: CatalogMachine::Dtm(binary_increment(), HeadStart::Last),
        },
        CatalogEntry {
            name: "equal-abc",
            description: "Strings of the form a^n b^n c^n",
            machine: CatalogMachine::Dtm(equal_abc(), HeadStart::First),
        },
    ]
}

fn contains_ab() -> DfaDesign<u32, char> {
    let rulebook = DfaRuleBook::new(vec![
        FaRule::new(1, 'a', 2),
        FaRule::new(1, 'b', 1),
        FaRule::new(2, 'a', 2),
        FaRule::new(2, 'b', 3),
        FaRule::new(3, 'a', 3),
        FaRule::new(3, 'b', 3),
    ]);

    DfaDesign::new(1, [3], rulebook)
}

fn third_from_last_b() -> NfaDesign<u32, char> {
    let rulebook = NfaRuleBook::new(vec![
        FaRule::new(1, 'a', 1),
        FaRule::new(2, 'a', 3),
        FaRule::new(3, 'a', 4),
        FaRule::new(1, 'b', 1),
        FaRule::new(1, 'b', 2),
        FaRule::new(2, 'b', 3),
        FaRule::new(3, 'b', 4),
    ]);

    NfaDesign::new(1, [4], rulebook)
}

fn multiple_of_two_or_three() -> NfaDesign<u32, char> {
    let rulebook = NfaRuleBook::new(vec![
        FaRule::free(1, 2),
        FaRule::free(1, 4),
        FaRule::new(2, 'a', 3),
        FaRule::new(3, 'a', 2),
        FaRule::new(4, 'a', 5),
        FaRule::new(5, 'a', 6),
        FaRule::new(6, 'a', 4),
    ]);

    NfaDesign::new(1, [2, 4], rulebook)
}

fn ab_nfa() -> NfaDesign<u32, char> {
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

fn balanced_parentheses() -> DpdaDesign<u32, char> {
    let rulebook = DpdaRuleBook::new(vec![
        PdaRule::new(1, '(', 2, '$', vec!['b', '$']),
        PdaRule::new(2, '(', 2, 'b', vec!['b', 'b']),
        PdaRule::new(2, ')', 2, 'b', vec![]),
        PdaRule::free(2, 1, '$', vec!['$']),
    ]);

    DpdaDesign::new(1, '$', [1], rulebook)
}

fn equal_as_and_bs() -> DpdaDesign<u32, char> {
    let rulebook = DpdaRuleBook::new(vec![
        PdaRule::new(1, 'a', 2, '$', vec!['a', '$']),
        PdaRule::new(1, 'b', 2, '$', vec!['b', '$']),
        PdaRule::new(2, 'a', 2, 'a', vec!['a', 'a']),
        PdaRule::new(2, 'b', 2, 'b', vec!['b', 'b']),
        PdaRule::new(2, 'a', 2, 'b', vec![]),
        PdaRule::new(2, 'b', 2, 'a', vec![]),
        PdaRule::free(2, 1, '$', vec!['$']),
    ]);

    DpdaDesign::new(1, '$', [1], rulebook)
}

/// Pushes symbols until the marker, then pops them back off in reverse.
fn marked_palindrome() -> DpdaDesign<u32, char> {
    let rulebook = DpdaRuleBook::new(vec![
        PdaRule::new(1, 'a', 1, '$', vec!['a', '$']),
        PdaRule::new(1, 'a', 1, 'a', vec!['a', 'a']),
        PdaRule::new(1, 'a', 1, 'b', vec!['a', 'b']),
        PdaRule::new(1, 'b', 1, '$', vec!['b', '$']),
        PdaRule::new(1, 'b', 1, 'a', vec!['b', 'a']),
        PdaRule::new(1, 'b', 1, 'b', vec!['b', 'b']),
        PdaRule::new(1, 'm', 2, '$', vec!['$']),
        PdaRule::new(1, 'm', 2, 'a', vec!['a']),
        PdaRule::new(1, 'm', 2, 'b', vec!['b']),
        PdaRule::new(2, 'a', 2, 'a', vec![]),
        PdaRule::new(2, 'b', 2, 'b', vec![]),
        PdaRule::free(2, 3, '$', vec!['$']),
    ]);

    DpdaDesign::new(1, '$', [3], rulebook)
}

/// Like the marked palindrome, but guesses the middle with free moves.
fn even_palindrome() -> NpdaDesign<u32, char> {
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

    NpdaDesign::new(1, '$', [3], rulebook)
}

/// A top-down parser: nonterminals on the stack expand by free moves, terminals on the
/// stack are matched against input tokens.
fn simple_parser() -> NpdaDesign<u32, char> {
    let start_rule = PdaRule::free(1, 2, '$', vec!['S', '$']);
    let stop_rule = PdaRule::free(2, 3, '$', vec!['$']);

    let symbol_rules = vec![
        // <statement> ::= <while> | <assign>
        PdaRule::free(2, 2, 'S', vec!['W']),
        PdaRule::free(2, 2, 'S', vec!['A']),
        // <while> ::= 'w' '(' <expression> ')' '{' <statement> '}'
        PdaRule::free(2, 2, 'W', vec!['w', '(', 'E', ')', '{', 'S', '}']),
        // <assign> ::= 'v' '=' <expression>
        PdaRule::free(2, 2, 'A', vec!['v', '=', 'E']),
        // <expression> ::= <less-than>
        PdaRule::free(2, 2, 'E', vec!['L']),
        // <less-than> ::= <multiply> '<' <less-than> | <multiply>
        PdaRule::free(2, 2, 'L', vec!['M', '<', 'L']),
        PdaRule::free(2, 2, 'L', vec!['M']),
        // <multiply> ::= <term> '*' <multiply> | <term>
        PdaRule::free(2, 2, 'M', vec!['T', '*', 'M']),
        PdaRule::free(2, 2, 'M', vec!['T']),
        // <term> ::= 'n' | 'v'
        PdaRule::free(2, 2, 'T', vec!['n']),
        PdaRule::free(2, 2, 'T', vec!['v']),
    ];

    let token_rules = TOKENS
        .iter()
        .map(|&token| PdaRule::new(2, token, 2, token, vec![]));

    let rulebook: NpdaRuleBook<u32, char> = [start_rule, stop_rule]
        .into_iter()
        .chain(symbol_rules)
        .chain(token_rules)
        .collect();

    NpdaDesign::new(1, '$', [3], rulebook)
}

fn binary_increment() -> DtmDesign<u32, char> {
    let rulebook = DtmRuleBook::new(vec![
        TmRule::new(1, '0', 2, '1', Direction::Right),
        TmRule::new(1, '1', 1, '0', Direction::Left),
        TmRule::new(1, '_', 2, '1', Direction::Right),
        TmRule::new(2, '0', 2, '0', Direction::Right),
        TmRule::new(2, '1', 2, '1', Direction::Right),
        TmRule::new(2, '_', 3, '_', Direction::Left),
    ]);

    DtmDesign::new(1, [3], rulebook)
}

/// Repeatedly crosses out one a, one b and one c, accepting when only crosses remain.
fn equal_abc() -> DtmDesign<u32, char> {
    let rulebook = DtmRuleBook::new(vec![
        // state 1: scan right looking for a
        TmRule::new(1, 'X', 1, 'X', Direction::Right),
        TmRule::new(1, 'a', 2, 'X', Direction::Right),
        TmRule::new(1, '_', 6, '_', Direction::Left),
        // state 2: scan right looking for b
        TmRule::new(2, 'a', 2, 'a', Direction::Right),
        TmRule::new(2, 'X', 2, 'X', Direction::Right),
        TmRule::new(2, 'b', 3, 'X', Direction::Right),
        // state 3: scan right looking for c
        TmRule::new(3, 'b', 3, 'b', Direction::Right),
        TmRule::new(3, 'X', 3, 'X', Direction::Right),
        TmRule::new(3, 'c', 4, 'X', Direction::Right),
        // state 4: scan right looking for end of string
        TmRule::new(4, 'c', 4, 'c', Direction::Right),
        TmRule::new(4, '_', 5, '_', Direction::Left),
        // state 5: scan left looking for beginning of string
        TmRule::new(5, 'a', 5, 'a', Direction::Left),
        TmRule::new(5, 'b', 5, 'b', Direction::Left),
        TmRule::new(5, 'c', 5, 'c', Direction::Left),
        TmRule::new(5, 'X', 5, 'X', Direction::Left),
        TmRule::new(5, '_', 1, '_', Direction::Right),
    ]);

    DtmDesign::new(1, [6], rulebook)
}
