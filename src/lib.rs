//! Gate-level netlist evaluation and ripple-carry adder repair
//!
//! This library reads boolean netlists made of literal wires and two-input AND/OR/XOR gates,
//! evaluates them, and repairs adder circuits whose gate outputs have been swapped.
//!
//! # Main Workflows
//!
//! 1. **Evaluation** ([`evaluate`]): assign the literal inputs and read back the output bus
//!    as an integer.
//! 2. **Repair** ([`repair`]): check every sum bit of an adder against the canonical
//!    ripple-carry shape and swap gate outputs until it matches, reporting the swapped wires.
//! 3. **Generation** ([`generate`]): write canonical adder netlists, optionally with seeded
//!    swaps, for testing the other two.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gatefix::{adder, read_file};
//! use std::path::Path;
//!
//! let mut circuit = read_file(Path::new("adder.net"))?;
//! println!("z = {}", circuit.read_bus(adder::SUM)?);
//!
//! let report = adder::repair(&mut circuit)?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`circuit`]**: the gate network itself, stored as a node arena, with evaluation,
//!   rendering, swaps, bus access and graph export
//! - **[`netlist`]**: parsing and serialisation of the netlist text format
//! - **[`adder`]**: canonical adder generation, structural predicates and the repair search
//! - **[`evaluate`]**, **[`repair`]**, **[`generate`]**: command-line entry points

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::{error::Error, fmt, fs, path::Path};

pub mod adder;
pub mod circuit;
pub mod evaluate;
pub mod generate;
pub mod netlist;
pub mod repair;

// Re-export the main functions for easy access
pub use circuit::{Circuit, Symbol};
pub use evaluate::{EvaluateArgs, evaluate_main};
pub use generate::{GenerateArgs, generate_main};
pub use repair::{RepairArgs, repair_main};

/// Application-level errors of the command-line tools.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// The requested bus has no declared signal.
    EmptyBus(char),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EmptyBus(prefix) => write!(f, "No signal of bus {} is declared.", prefix),
        }
    }
}

impl Error for AppError {}

/// Reads and parses a netlist from a file.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use gatefix::read_file;
/// use std::path::Path;
///
/// let circuit = read_file(Path::new("adder.net"))?;
/// # Ok(())
/// # }
/// ```
pub fn read_file(file_name: &Path) -> Result<Circuit> {
    let file = fs::read_to_string(file_name)?;
    Ok(netlist::parse(&file)?)
}

/// Command-line interface of the gatefix tool.
#[derive(Debug, Parser)]
#[clap(
    name = "gatefix",
    about = "Gate-level netlist evaluation and adder repair tools"
)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: CLIArguments,
}

/// Commands of the gatefix tool.
#[derive(Debug, Subcommand)]
pub enum CLIArguments {
    /// Evaluate a netlist and print the value of its output bus.
    Evaluate(EvaluateArgs),
    /// Repair an adder netlist and print the sorted, comma-separated swapped wires.
    Repair(RepairArgs),
    /// Write a canonical ripple-carry adder netlist.
    Generate(GenerateArgs),
}
