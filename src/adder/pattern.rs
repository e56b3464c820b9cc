//! Structural recognition of the canonical adder.
//!
//! The predicates here never fail: a mismatch is a normal answer. They only look at the
//! shape of the circuit (operators and which input wires feed which gate), never at the
//! values currently assigned to the inputs. Gate operands are compared as unordered pairs.

use super::{ADDEND, AUGEND};
use crate::circuit::{Circuit, GateOp, Node, NodeId, bus::bus_signal};
use std::fmt;

/// A subcircuit shape expected at some position of the adder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `x[bit] op y[bit]`.
    Pair { op: GateOp, bit: usize },
    /// Sum output of `bit`.
    Sum(usize),
    /// Carry into `bit`: the outer OR, or `x[0] AND y[0]` for bit 1.
    CarryTop(usize),
    /// The inner AND of the carry into `bit`.
    CarryBottom(usize),
}

impl Shape {
    /// Operator and operand shapes of a composite shape.
    fn parts(self) -> Option<(GateOp, Shape, Shape)> {
        match self {
            Shape::Sum(bit) if bit > 0 => Some((
                GateOp::Xor,
                Shape::Pair {
                    op: GateOp::Xor,
                    bit,
                },
                Shape::CarryTop(bit),
            )),
            Shape::CarryTop(bit) if bit > 1 => Some((
                GateOp::Or,
                Shape::Pair {
                    op: GateOp::And,
                    bit: bit - 1,
                },
                Shape::CarryBottom(bit),
            )),
            Shape::CarryBottom(bit) if bit > 1 => Some((
                GateOp::And,
                Shape::Pair {
                    op: GateOp::Xor,
                    bit: bit - 1,
                },
                Shape::CarryTop(bit - 1),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Pair { op, bit } => write!(
                f,
                "{} {} {}",
                bus_signal(AUGEND, *bit),
                op,
                bus_signal(ADDEND, *bit)
            ),
            Shape::Sum(bit) => write!(f, "sum bit {}", bit),
            Shape::CarryTop(bit) => write!(f, "carry into bit {}", bit),
            Shape::CarryBottom(bit) => write!(f, "propagated carry into bit {}", bit),
        }
    }
}

/// A node that does not have the shape expected at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub node: NodeId,
    pub shape: Shape,
}

/// Input and output wires of an adder, resolved once against a circuit.
///
/// Swaps never move names, so the ids stay valid for the lifetime of the circuit.
#[derive(Debug, Clone)]
pub struct Template {
    augend: Vec<Option<NodeId>>,
    addend: Vec<Option<NodeId>>,
    width: usize,
}

impl Template {
    pub fn new(circuit: &Circuit) -> Self {
        let width = circuit.bus_width(super::SUM);
        let resolve = |prefix: char| -> Vec<Option<NodeId>> {
            (0..width)
                .map(|bit| circuit.id(&bus_signal(prefix, bit)))
                .collect()
        };

        Self {
            augend: resolve(AUGEND),
            addend: resolve(ADDEND),
            width,
        }
    }

    /// Width of the sum bus. Bits `0..width - 1` are checked, the carry out is not.
    pub fn width(&self) -> usize {
        self.width
    }

    fn input(&self, circuit: &Circuit, bus: &[Option<NodeId>], bit: usize) -> Option<NodeId> {
        bus.get(bit)
            .copied()
            .flatten()
            .filter(|id| matches!(circuit.node(*id), Some(Node::Literal(_))))
    }

    /// True iff `node` is `x[bit] op y[bit]`.
    pub fn is_x_op_y(&self, circuit: &Circuit, node: NodeId, op: GateOp, bit: usize) -> bool {
        let (Some(x), Some(y)) = (
            self.input(circuit, &self.augend, bit),
            self.input(circuit, &self.addend, bit),
        ) else {
            return false;
        };

        match gate(circuit, node, op) {
            Some((left, right)) => (left == x && right == y) || (left == y && right == x),
            None => false,
        }
    }

    /// True iff `node` computes sum bit `bit` in the canonical shape.
    pub fn validate_z(&self, circuit: &Circuit, bit: usize, node: NodeId) -> bool {
        if bit == 0 {
            return self.is_x_op_y(circuit, node, GateOp::Xor, 0);
        }

        either_order(circuit, node, GateOp::Xor, |a, b| {
            self.is_x_op_y(circuit, a, GateOp::Xor, bit) && self.validate_carry_top(circuit, bit, b)
        })
    }

    /// True iff `node` is the carry into `bit`.
    pub fn validate_carry_top(&self, circuit: &Circuit, bit: usize, node: NodeId) -> bool {
        match bit {
            0 => false,
            1 => self.is_x_op_y(circuit, node, GateOp::And, 0),
            _ => either_order(circuit, node, GateOp::Or, |a, b| {
                self.is_x_op_y(circuit, a, GateOp::And, bit - 1)
                    && self.validate_carry_bottom(circuit, bit, b)
            }),
        }
    }

    /// True iff `node` is `(x[bit-1] XOR y[bit-1]) AND carry into bit-1`.
    pub fn validate_carry_bottom(&self, circuit: &Circuit, bit: usize, node: NodeId) -> bool {
        if bit < 2 {
            return false;
        }

        either_order(circuit, node, GateOp::And, |a, b| {
            self.is_x_op_y(circuit, a, GateOp::Xor, bit - 1)
                && self.validate_carry_top(circuit, bit - 1, b)
        })
    }

    pub fn matches(&self, circuit: &Circuit, shape: Shape, node: NodeId) -> bool {
        match shape {
            Shape::Pair { op, bit } => self.is_x_op_y(circuit, node, op, bit),
            Shape::Sum(bit) => self.validate_z(circuit, bit, node),
            Shape::CarryTop(bit) => self.validate_carry_top(circuit, bit, node),
            Shape::CarryBottom(bit) => self.validate_carry_bottom(circuit, bit, node),
        }
    }

    /// Mismatched positions from `node` down to the deepest one that can be pinned down.
    ///
    /// Empty when `node` has `shape`. Otherwise the first entry is `node` itself, and each
    /// following entry is the operand of the previous one that is wrong while its sibling
    /// already has the expected shape.
    pub fn mismatches(&self, circuit: &Circuit, shape: Shape, node: NodeId) -> Vec<Mismatch> {
        let mut chain = Vec::new();
        let mut current = Some(Mismatch { node, shape });

        while let Some(mismatch) = current.take() {
            if self.matches(circuit, mismatch.shape, mismatch.node) {
                break;
            }
            chain.push(mismatch);
            current = self.blame(circuit, mismatch);
        }

        chain
    }

    /// Every operand of `mismatch` paired with every shape it may be missing.
    ///
    /// Used when [`Template::mismatches`] stops at a gate whose operands are both wrong, so
    /// no single operand can be blamed. Empty unless the gate has the expected operator.
    pub fn suspects(&self, circuit: &Circuit, mismatch: Mismatch) -> Vec<Mismatch> {
        let Some((op, first, second)) = mismatch.shape.parts() else {
            return Vec::new();
        };
        let Some((a, b)) = gate(circuit, mismatch.node, op) else {
            return Vec::new();
        };

        [a, b]
            .into_iter()
            .flat_map(|node| [first, second].map(|shape| Mismatch { node, shape }))
            .collect()
    }

    fn blame(&self, circuit: &Circuit, mismatch: Mismatch) -> Option<Mismatch> {
        let (op, first, second) = mismatch.shape.parts()?;
        let (a, b) = gate(circuit, mismatch.node, op)?;

        [(first, second), (second, first)]
            .into_iter()
            .flat_map(|(found, wanted)| [(found, a, b, wanted), (found, b, a, wanted)])
            .find(|(found, good, _, _)| self.matches(circuit, *found, *good))
            .map(|(_, _, bad, wanted)| Mismatch {
                node: bad,
                shape: wanted,
            })
    }
}

fn gate(circuit: &Circuit, node: NodeId, op: GateOp) -> Option<(NodeId, NodeId)> {
    match circuit.node(node) {
        Some(Node::Gate {
            op: found,
            left,
            right,
        }) if *found == op => Some((*left, *right)),
        _ => None,
    }
}

fn either_order(
    circuit: &Circuit,
    node: NodeId,
    op: GateOp,
    check: impl Fn(NodeId, NodeId) -> bool,
) -> bool {
    match gate(circuit, node, op) {
        Some((left, right)) => check(left, right) || check(right, left),
        None => false,
    }
}
