//! Evaluation of netlists.
//!
//! # Main Operations
//!
//! - **[`evaluate_main`]**: reads a netlist, evaluates either selected signals or a whole
//!   output bus, and optionally writes the circuit as a Graphviz DOT file.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gatefix::evaluate::{EvaluateArgs, evaluate_main};
//!
//! let args = EvaluateArgs {
//!     input: "adder.net".into(),
//!     bus: 'z',
//!     signal: vec![],
//!     expressions: false,
//!     dot: Some("adder.dot".into()),
//!     report: None,
//! };
//!
//! evaluate_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{fs, io::Write, path::PathBuf};

use anyhow::*;
use clap::Parser;
use tracing::info;

use crate::{AppError, circuit::Circuit, read_file};

/// Command-line arguments for the evaluate command.
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Netlist input file
    pub input: PathBuf,

    /// Output bus read as an integer
    #[clap(short, long, default_value_t = 'z')]
    pub bus: char,

    /// Evaluate these signals instead of the output bus
    #[clap(short, long)]
    pub signal: Vec<String>,

    /// Print the expression driving each evaluated signal
    #[clap(short, long)]
    pub expressions: bool,

    /// DOT file displaying the circuit
    #[clap(long)]
    pub dot: Option<PathBuf>,

    /// Report file for the results (default: stdout)
    #[clap(short, long)]
    pub report: Option<PathBuf>,
}

/// Evaluate a netlist.
///
/// With no `signal` given, prints the value of bus `bus` as a decimal integer. Otherwise
/// prints one `name = value` line per signal, preceded by its expression when
/// `expressions` is set.
pub fn evaluate_main(args: EvaluateArgs) -> Result<()> {
    let EvaluateArgs {
        input,
        bus,
        signal,
        expressions,
        dot,
        report,
    } = args;

    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    let circuit = read_file(&input)?;
    info!(input = %input.display(), signals = circuit.len(), "netlist loaded");

    if let Some(filename) = dot {
        fs::write(filename, circuit.to_dot())?;
    }

    if signal.is_empty() {
        writeln!(writer, "{}", evaluate_bus(&circuit, bus)?)?;
    } else {
        for name in signal {
            let value = u8::from(circuit.evaluate(&name)?);
            if expressions {
                writeln!(writer, "{} = {} = {}", name, circuit.render(&name)?, value)?;
            } else {
                writeln!(writer, "{} = {}", name, value)?;
            }
        }
    }

    Ok(())
}

/// Value of bus `prefix`, failing if the bus has no members.
pub fn evaluate_bus(circuit: &Circuit, prefix: char) -> Result<u64> {
    if circuit.bus_signals(prefix).is_empty() {
        bail!(AppError::EmptyBus(prefix));
    }

    Ok(circuit.read_bus(prefix)?)
}
