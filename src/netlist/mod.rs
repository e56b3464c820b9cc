//! Netlist text format.
//!
//! A netlist declares literal input wires and two-input gates, one per line:
//!
//! ```text
//! x00: 1
//! y00: 0
//!
//! x00 AND y00 -> z00
//! x00 XOR y00 -> w
//! ```
//!
//! Declarations may appear in any order; gates may name operands declared further down.

mod ast;
pub mod serialisation;

lalrpop_util::lalrpop_mod! {parser, "/netlist/parser.rs"}

use crate::{
    Symbol,
    circuit::{Circuit, CircuitError, GateOp},
};
use ast::Entry;
use std::{collections::HashSet, error::Error, fmt};

/// A literal wire declaration (`name: 0|1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDecl {
    pub name: Symbol,
    pub value: bool,
}

/// A gate declaration (`left OP right -> output`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecl {
    pub output: Symbol,
    pub left: Symbol,
    pub right: Symbol,
    pub op: GateOp,
}

/// Declarations of a netlist in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    pub wires: Vec<WireDecl>,
    pub gates: Vec<GateDecl>,
}

type LarlPopError<'a> = lalrpop_util::ParseError<usize, parser::Token<'a>, &'static str>;

/// Error Response of [`parse`]
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    SyntaxError(String),
    InvalidValue { name: Symbol, value: Symbol },
    InvalidOperator { output: Symbol, op: Symbol },
    MultipleDefinitions(Symbol),
    UndefinedElement(Symbol),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SyntaxError(err) => write!(f, "{}", err),
            ParseError::InvalidValue { name, value } => {
                write!(f, "Invalid value {} for wire {}, expected 0 or 1", value, name)
            }
            ParseError::InvalidOperator { output, op } => {
                write!(f, "Invalid operator {} driving {}", op, output)
            }
            ParseError::MultipleDefinitions(name) => write!(f, "Multiple Definitions of {}", name),
            ParseError::UndefinedElement(name) => write!(f, "Undefined Element: {}", name),
        }
    }
}

impl Error for ParseError {}

impl From<LarlPopError<'_>> for ParseError {
    fn from(err: LarlPopError) -> Self {
        ParseError::SyntaxError(format!("{}", err))
    }
}

/// Parse a netlist into its declaration lists.
pub fn parse_declarations(input: &str) -> Result<Netlist, ParseError> {
    let entries = parser::NetlistParser::new().parse(input)?;

    let mut netlist = Netlist::default();
    for entry in entries.into_iter() {
        match entry {
            Entry::Wire { name, value } => {
                let value = match value.as_ref() {
                    "0" => false,
                    "1" => true,
                    _ => return Err(ParseError::InvalidValue { name, value }),
                };
                netlist.wires.push(WireDecl { name, value });
            }
            Entry::Gate {
                left,
                op,
                right,
                output,
            } => {
                let op = op.parse::<GateOp>().map_err(|_| ParseError::InvalidOperator {
                    output: output.clone(),
                    op,
                })?;
                netlist.gates.push(GateDecl {
                    output,
                    left,
                    right,
                    op,
                });
            }
        }
    }

    Ok(netlist)
}

impl Netlist {
    /// Builds the circuit, rejecting duplicate and undeclared signals.
    pub fn build(&self) -> Result<Circuit, ParseError> {
        let mut declared = HashSet::new();
        let outputs = self
            .wires
            .iter()
            .map(|w| &w.name)
            .chain(self.gates.iter().map(|g| &g.output));
        for name in outputs {
            if !declared.insert(name.clone()) {
                return Err(ParseError::MultipleDefinitions(name.clone()));
            }
        }

        let mut circuit = Circuit::new();
        for WireDecl { name, value } in self.wires.iter() {
            circuit
                .add_literal(name.clone(), *value)
                .map_err(|e| conflict(e, name))?;
        }
        for GateDecl {
            output,
            left,
            right,
            op,
        } in self.gates.iter()
        {
            for operand in [left, right] {
                if !declared.contains(operand) {
                    return Err(ParseError::UndefinedElement(operand.clone()));
                }
            }
            circuit
                .add_rule(output.clone(), left.clone(), right.clone(), *op)
                .map_err(|e| conflict(e, output))?;
        }

        Ok(circuit)
    }
}

// Duplicates are rejected before the circuit is built, so a kind conflict means the same.
fn conflict(_: CircuitError, name: &Symbol) -> ParseError {
    ParseError::MultipleDefinitions(name.clone())
}

/// Parse a netlist into a [`Circuit`].
pub fn parse(input: &str) -> Result<Circuit, ParseError> {
    parse_declarations(input)?.build()
}
