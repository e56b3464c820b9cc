//! Repair of adder netlists.
//!
//! # Main Operations
//!
//! - **[`repair_main`]**: reads an adder netlist, runs [`crate::adder::repair_with`] on it and
//!   prints the swapped wires, sorted and comma-separated.
//!
//! # Outputs
//!
//! - **stdout**: the answer line, e.g. `g02,z02`
//! - **Report** (optional): a table listing every swap with the bit and shape that caused it
//! - **Netlist** (optional): the repaired circuit in netlist format
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gatefix::repair::{RepairArgs, repair_main};
//!
//! let args = RepairArgs {
//!     input: "adder.net".into(),
//!     report: Some("repair.rpt".into()),
//!     output: Some("fixed.net".into()),
//!     max_swaps_per_bit: 4,
//! };
//!
//! repair_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::*;
use clap::Parser;
use prettytable::*;
use tracing::info;

use crate::{
    adder::{RepairOptions, RepairReport, repair_with, search::DEFAULT_MAX_SWAPS_PER_BIT},
    netlist::serialisation::serialise_netlist,
    read_file,
};

/// Command-line arguments for the repair command.
#[derive(Parser, Debug)]
pub struct RepairArgs {
    /// Adder netlist input file
    pub input: PathBuf,

    /// Report file listing every swap
    #[clap(short, long)]
    pub report: Option<PathBuf>,

    /// Netlist output file for the repaired circuit
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Swaps allowed on a single sum bit before it is declared irreparable
    #[clap(long, default_value_t = DEFAULT_MAX_SWAPS_PER_BIT)]
    pub max_swaps_per_bit: usize,
}

/// Repair an adder netlist.
pub fn repair_main(args: RepairArgs) -> Result<()> {
    let RepairArgs {
        input,
        report,
        output,
        max_swaps_per_bit,
    } = args;

    let mut circuit = read_file(&input)?;
    info!(input = %input.display(), signals = circuit.len(), "netlist loaded");

    let result = repair_with(&mut circuit, RepairOptions { max_swaps_per_bit })
        .with_context(|| format!("Failed to repair {}", input.display()))?;

    println!("{}", result);

    if let Some(filename) = report {
        let mut out_file = BufWriter::new(fs::File::create(filename)?);
        swap_table(&result).print(&mut out_file)?;
        out_file.flush()?;
    }

    if let Some(filename) = output {
        fs::write(filename, serialise_netlist(&circuit))?;
    }

    Ok(())
}

fn swap_table(result: &RepairReport) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Bit", "Expected", "Mismatched", "Substitute"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for swap in result.swaps.iter() {
        table.add_row(row![
            swap.bit,
            swap.shape,
            swap.mismatched,
            swap.substitute
        ]);
    }

    table
}
