//! Serialisation of circuits to the netlist format.

use crate::circuit::{Circuit, Node};
use itertools::Itertools;
use std::fmt::{self, Write};

/// Serialise a circuit into the provided writer.
///
/// See [`serialise_netlist`] for format details.
pub fn serialise_netlist_to<W: Write>(circuit: &Circuit, writer: &mut W) -> fmt::Result {
    let literals = circuit
        .ids()
        .filter_map(|id| match circuit.node(id) {
            Some(Node::Literal(value)) => Some((circuit.name(id), *value)),
            _ => None,
        })
        .sorted_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

    for (name, value) in literals {
        writeln!(writer, "{}: {}", name, u8::from(value))?;
    }

    writeln!(writer)?;

    for id in circuit.ids() {
        if let Some(Node::Gate { op, left, right }) = circuit.node(id) {
            writeln!(
                writer,
                "{} {} {} -> {}",
                circuit.name(*left),
                op,
                circuit.name(*right),
                circuit.name(id)
            )?;
        }
    }

    Ok(())
}

/// Serialise a circuit to the netlist format.
///
/// Literals come first, sorted by name, followed by a blank line and the gates in the
/// order they were declared. Signals that are referenced but never declared are left out,
/// so the output of a circuit built by [`crate::netlist::parse`] parses back to an
/// equivalent circuit.
pub fn serialise_netlist(circuit: &Circuit) -> String {
    let mut out = String::new();
    // Infallible for String
    let _ = serialise_netlist_to(circuit, &mut out);
    out
}
