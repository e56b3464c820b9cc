//! Generation of adder netlists.
//!
//! # Main Operations
//!
//! - **[`generate_main`]**: writes the canonical ripple-carry adder for a given width, with
//!   optional input values and seeded output swaps.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gatefix::generate::{GenerateArgs, SwapPair, generate_main};
//!
//! let args = GenerateArgs {
//!     width: 8,
//!     augend: 200,
//!     addend: 17,
//!     swaps: vec![SwapPair("z03".into(), "g03".into())],
//!     output: "adder.net".into(),
//! };
//!
//! generate_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{fs, path::PathBuf};

use anyhow::*;
use clap::Parser;
use tracing::info;

use crate::{
    adder::{ADDEND, AUGEND, ripple_carry},
    netlist::serialisation::serialise_netlist,
};

/// Two signals whose gate outputs are exchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPair(pub String, pub String);

fn parse_swap(s: &str) -> std::result::Result<SwapPair, String> {
    match s.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => {
            std::result::Result::Ok(SwapPair(a.to_string(), b.to_string()))
        }
        _ => Err(format!("expected two signal names separated by ':', got '{}'", s)),
    }
}

/// Command-line arguments for the generate command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Number of bits of each operand
    #[clap(short, long)]
    pub width: usize,

    /// Value assigned to the x inputs
    #[clap(short = 'x', long, default_value_t = 0)]
    pub augend: u64,

    /// Value assigned to the y inputs
    #[clap(short = 'y', long, default_value_t = 0)]
    pub addend: u64,

    /// Swap the gate outputs of two signals, written as `a:b` (repeatable)
    #[clap(long = "swap", value_parser = parse_swap)]
    pub swaps: Vec<SwapPair>,

    /// Netlist output file
    #[clap(short, long)]
    pub output: PathBuf,
}

/// Write a canonical adder netlist.
pub fn generate_main(args: GenerateArgs) -> Result<()> {
    let GenerateArgs {
        width,
        augend,
        addend,
        swaps,
        output,
    } = args;

    ensure!(width > 0, "Adder width must be at least one bit");

    let mut circuit = ripple_carry(width)?;
    circuit.write_bus(AUGEND, augend)?;
    circuit.write_bus(ADDEND, addend)?;

    for SwapPair(a, b) in swaps.iter() {
        circuit.swap_signals(a, b)?;
        info!(first = %a, second = %b, "seeded swap");
    }

    fs::write(&output, serialise_netlist(&circuit))?;
    info!(width, output = %output.display(), "adder written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::parse;
    use tempfile::TempDir;

    #[test]
    fn test_parse_swap() {
        assert_eq!(
            parse_swap("z01:h02"),
            std::result::Result::Ok(SwapPair("z01".into(), "h02".into()))
        );
        assert!(parse_swap("z01").is_err());
        assert!(parse_swap(":h02").is_err());
    }

    #[test]
    fn test_generate_main() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let output = dir.path().join("adder.net");

        generate_main(GenerateArgs {
            width: 4,
            augend: 9,
            addend: 12,
            swaps: vec![SwapPair("z01".into(), "z02".into())],
            output: output.clone(),
        })
        .unwrap();

        let circuit = parse(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(circuit.read_bus(AUGEND).unwrap(), 9);
        assert_eq!(circuit.read_bus(ADDEND).unwrap(), 12);
        // 9 + 12 = 0b10101, with bits 1 and 2 exchanged.
        assert_eq!(circuit.read_bus('z').unwrap(), 0b10011);
    }
}
