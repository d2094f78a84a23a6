use automata::catalog::names;
use automata::{
    lookup, CatalogEntry, CatalogMachine, Halt, Step, Tape, DEFAULT_BLANK_SYMBOL,
    MAX_EXECUTION_STEPS,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "automata-cli")]
#[command(about = "Run the reference finite, pushdown and Turing machines")]
#[command(version, arg_required_else_help = true)]
struct Cli {
    /// Log each transition (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog machines
    List,

    /// Run a catalog machine against an input string
    Run {
        /// Catalog machine name
        #[arg(short, long)]
        machine: String,

        /// Input string; each character is one symbol
        #[arg(short, long, default_value = "")]
        input: String,

        /// Print each Turing Machine configuration
        #[arg(short = 'd', long)]
        trace: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a catalog NFA into a DFA
    Determinize {
        /// Catalog machine name
        #[arg(short, long)]
        machine: String,

        /// Print the DFA as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RunReport<'a> {
    machine: &'a str,
    family: &'a str,
    input: &'a str,
    accepted: bool,
}

#[derive(Serialize)]
struct DfaReport<'a> {
    machine: &'a str,
    start_state: &'a BTreeSet<u32>,
    accept_states: &'a BTreeSet<BTreeSet<u32>>,
    rules: &'a [automata::FaRule<BTreeSet<u32>, char>],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List => {
            for name in names() {
                let entry = lookup(name)?;
                println!(
                    "{:<26} {:<5} {}",
                    entry.name,
                    entry.machine.family(),
                    entry.description
                );
            }
        }
        Commands::Run {
            machine,
            input,
            trace,
            json,
        } => {
            let entry = lookup(&machine)?;
            let accepted = if trace {
                trace_run(entry, &input)?
            } else {
                entry.accepts(&input)?
            };

            if json {
                let report = RunReport {
                    machine: entry.name,
                    family: entry.machine.family(),
                    input: &input,
                    accepted,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", if accepted { "accepted" } else { "rejected" });
            }
        }
        Commands::Determinize { machine, json } => {
            let entry = lookup(&machine)?;
            let design = entry.determinize()?;
            let rules = design.rulebook().rules();

            if json {
                let report = DfaReport {
                    machine: entry.name,
                    start_state: design.start_state(),
                    accept_states: design.accept_states(),
                    rules,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("start: {:?}", design.start_state());
                println!("accept: {:?}", design.accept_states());
                for rule in rules {
                    println!("{}", rule);
                }
            }
        }
    }

    Ok(())
}

/// Runs `entry`, printing every Turing Machine configuration along the way.
///
/// Other families have no tape to show and fall back to a plain run.
fn trace_run(entry: &CatalogEntry, input: &str) -> Result<bool, automata::AutomatonError> {
    let CatalogMachine::Dtm(design, head) = &entry.machine else {
        tracing::warn!(family = entry.machine.family(), "--trace only applies to Turing Machines");
        return entry.accepts(input);
    };

    let mut dtm = design.build_machine(Tape::from_input(input.chars(), DEFAULT_BLANK_SYMBOL, *head));
    println!("Step: 0, {}", dtm.current_configuration());

    while !dtm.is_accepting() {
        if dtm.step_count() >= MAX_EXECUTION_STEPS {
            return Err(automata::AutomatonError::StepLimitExceeded(MAX_EXECUTION_STEPS));
        }

        match dtm.step() {
            Step::Continue => {
                println!("Step: {}, {}", dtm.step_count(), dtm.current_configuration());
            }
            Step::Halt(halt) => {
                println!("\nMachine halted: {:?}", halt);
                return Ok(halt == Halt::Accepted);
            }
        }
    }

    println!("\nMachine halted: {:?}", Halt::Accepted);
    Ok(true)
}
