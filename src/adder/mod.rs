//! Ripple-carry adders.
//!
//! An adder over two `N`-bit operands reads its augend from bus `x`, its addend from bus `y`
//! and drives the `N + 1` bits of bus `z`. Bit `i` of the canonical circuit is
//!
//! ```text
//! z[0]     = x[0] XOR y[0]
//! c[0]     = x[0] AND y[0]
//! z[i]     = (x[i] XOR y[i]) XOR c[i-1]
//! c[i]     = (x[i] AND y[i]) OR ((x[i] XOR y[i]) AND c[i-1])
//! z[N]     = c[N-1]
//! ```
//!
//! [`pattern`] recognises this shape in an arbitrary [`Circuit`] and [`search`] repairs
//! circuits that deviate from it by swapped gate outputs.

pub mod pattern;
pub mod search;

pub use pattern::{Mismatch, Shape, Template};
pub use search::{RepairError, RepairOptions, RepairReport, Swap, repair, repair_with};

use crate::circuit::{Circuit, CircuitError, GateOp, bus::bus_signal};
use crate::Symbol;

/// Bus carrying the first operand.
pub const AUGEND: char = 'x';
/// Bus carrying the second operand.
pub const ADDEND: char = 'y';
/// Bus carrying the result.
pub const SUM: char = 'z';

fn internal(kind: char, bit: usize) -> Symbol {
    format!("{}{:02}", kind, bit).into()
}

/// Builds the canonical ripple-carry adder for `width`-bit operands, with all inputs zero.
///
/// Internal wires are named `hNN` (`x XOR y`), `gNN` (`x AND y`), `pNN` (propagated carry)
/// and `cNN` (carry out of bit `NN`). The final carry drives the top sum bit directly, and
/// bit 0's carry is `g00` itself.
pub fn ripple_carry(width: usize) -> Result<Circuit, CircuitError> {
    let mut circuit = Circuit::new();
    if width == 0 {
        return Ok(circuit);
    }

    for bit in 0..width {
        circuit.add_literal(bus_signal(AUGEND, bit), false)?;
        circuit.add_literal(bus_signal(ADDEND, bit), false)?;
    }

    let carry_name = |bit: usize| {
        if bit + 1 == width {
            bus_signal(SUM, width)
        } else if bit == 0 {
            internal('g', 0)
        } else {
            internal('c', bit)
        }
    };

    let (x, y) = (bus_signal(AUGEND, 0), bus_signal(ADDEND, 0));
    circuit.add_rule(bus_signal(SUM, 0), x.clone(), y.clone(), GateOp::Xor)?;
    circuit.add_rule(carry_name(0), x, y, GateOp::And)?;

    for bit in 1..width {
        let (x, y) = (bus_signal(AUGEND, bit), bus_signal(ADDEND, bit));
        let half = internal('h', bit);
        let generate = internal('g', bit);
        let propagate = internal('p', bit);
        let carry_in = carry_name(bit - 1);

        circuit.add_rule(half.clone(), x.clone(), y.clone(), GateOp::Xor)?;
        circuit.add_rule(generate.clone(), x, y, GateOp::And)?;
        circuit.add_rule(bus_signal(SUM, bit), half.clone(), carry_in.clone(), GateOp::Xor)?;
        circuit.add_rule(propagate.clone(), half, carry_in, GateOp::And)?;
        circuit.add_rule(carry_name(bit), generate, propagate, GateOp::Or)?;
    }

    Ok(circuit)
}
