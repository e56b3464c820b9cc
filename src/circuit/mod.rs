//! Boolean gate networks stored as a node arena.
//!
//! A [`Circuit`] owns every signal of a netlist. Each signal name maps to a slot in a dense
//! arena, and every gate refers to its operands by [`NodeId`] (the slot index), never by
//! name. This gives two properties the rest of the crate relies on:
//!
//! - **Lazy resolution**: a gate may name operands that have not been declared yet. The
//!   operand gets an empty slot which is filled when the declaration shows up.
//! - **Positional swaps**: [`Circuit::swap`] exchanges the *contents* of two slots while the
//!   names stay where they are. Every gate that referred to slot `a` now observes what used
//!   to live in slot `b`, which is exactly what swapping two output wires in a netlist does.
//!
//! # Example
//!
//! ```
//! use gatefix::circuit::{Circuit, GateOp};
//!
//! let mut circuit = Circuit::new();
//! circuit.add_rule("z00", "x00", "y00", GateOp::And).unwrap();
//! circuit.add_literal("x00", true).unwrap();
//! circuit.add_literal("y00", true).unwrap();
//!
//! assert!(circuit.evaluate("z00").unwrap());
//! assert_eq!(circuit.render("z00").unwrap(), "(x00 AND y00)");
//! ```

pub mod bus;
pub mod graph;

use std::{collections::HashMap, error::Error, fmt, str::FromStr};
use string_cache::DefaultAtom;

pub type Symbol = DefaultAtom;

/// Position of a node in the circuit arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Two-input gate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateOp {
    And,
    Or,
    Xor,
}

impl GateOp {
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            GateOp::And => left & right,
            GateOp::Or => left | right,
            GateOp::Xor => left ^ right,
        }
    }

    /// Netlist mnemonic of the operator.
    pub fn mnemonic(self) -> &'static str {
        match self {
            GateOp::And => "AND",
            GateOp::Or => "OR",
            GateOp::Xor => "XOR",
        }
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl FromStr for GateOp {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(GateOp::And),
            "OR" => Ok(GateOp::Or),
            "XOR" => Ok(GateOp::Xor),
            _ => Err(CircuitError::InvalidOperator(s.to_string())),
        }
    }
}

/// Content of a declared signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Literal(bool),
    Gate {
        op: GateOp,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    fn kind(&self) -> &'static str {
        match self {
            Node::Literal(_) => "literal",
            Node::Gate { .. } => "gate",
        }
    }
}

/// Errors raised while building or querying a [`Circuit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// The signal is unknown, or was only ever used as an operand.
    NotFound(Symbol),
    /// Evaluation reached the signal again while it was still being evaluated.
    CyclicGraph(Symbol),
    /// The signal was declared as a literal and a gate.
    KindConflict {
        name: Symbol,
        declared: &'static str,
    },
    /// Unknown gate mnemonic.
    InvalidOperator(String),
    /// A bus member index does not fit in the integer used to read the bus.
    BusTooWide { prefix: char, index: usize },
    /// A value has set bits above the widest member of the bus.
    BusOverflow { prefix: char, value: u64 },
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::NotFound(name) => write!(f, "Signal not found: {}", name),
            CircuitError::CyclicGraph(name) => write!(f, "Signal {} depends on itself", name),
            CircuitError::KindConflict { name, declared } => {
                write!(f, "Signal {} is already declared as a {}", name, declared)
            }
            CircuitError::InvalidOperator(op) => write!(f, "Invalid gate operator: {}", op),
            CircuitError::BusTooWide { prefix, index } => {
                write!(f, "Bus {} has member {} beyond 64 bits", prefix, index)
            }
            CircuitError::BusOverflow { prefix, value } => {
                write!(f, "Value {} does not fit on bus {}", value, prefix)
            }
        }
    }
}

impl Error for CircuitError {}

/// A named boolean gate network.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    names: Vec<Symbol>,
    nodes: Vec<Option<Node>>,
    lut: HashMap<Symbol, NodeId>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots in the arena, including operands not yet declared.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All slot ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.lut.get(&Symbol::from(name)).copied()
    }

    /// Like [`Circuit::id`], failing with [`CircuitError::NotFound`].
    pub fn lookup(&self, name: &str) -> Result<NodeId, CircuitError> {
        self.id(name)
            .ok_or_else(|| CircuitError::NotFound(Symbol::from(name)))
    }

    pub fn name(&self, id: NodeId) -> &Symbol {
        &self.names[id.0]
    }

    /// Content of a slot, `None` while the signal is only referenced.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes[id.0].as_ref()
    }

    fn intern(&mut self, name: Symbol) -> NodeId {
        if let Some(id) = self.lut.get(&name) {
            return *id;
        }

        let id = NodeId(self.nodes.len());
        self.names.push(name.clone());
        self.nodes.push(None);
        self.lut.insert(name, id);
        id
    }

    fn declare(&mut self, name: Symbol, node: Node) -> Result<NodeId, CircuitError> {
        let id = self.intern(name);
        match &self.nodes[id.0] {
            Some(existing) if existing.kind() != node.kind() => {
                return Err(CircuitError::KindConflict {
                    name: self.names[id.0].clone(),
                    declared: existing.kind(),
                });
            }
            _ => {}
        }
        self.nodes[id.0] = Some(node);
        Ok(id)
    }

    /// Declares `name` as a literal, or updates its value if it already is one.
    pub fn add_literal(&mut self, name: impl Into<Symbol>, value: bool) -> Result<NodeId, CircuitError> {
        self.declare(name.into(), Node::Literal(value))
    }

    /// Declares `name` as the gate `left op right`. Operands may be declared later.
    pub fn add_rule(
        &mut self,
        name: impl Into<Symbol>,
        left: impl Into<Symbol>,
        right: impl Into<Symbol>,
        op: GateOp,
    ) -> Result<NodeId, CircuitError> {
        let left = self.intern(left.into());
        let right = self.intern(right.into());
        self.declare(name.into(), Node::Gate { op, left, right })
    }

    /// Evaluates the signal `name`.
    pub fn evaluate(&self, name: &str) -> Result<bool, CircuitError> {
        self.evaluate_id(self.lookup(name)?)
    }

    pub fn evaluate_id(&self, id: NodeId) -> Result<bool, CircuitError> {
        let mut on_path = vec![false; self.nodes.len()];
        self.evaluate_inner(id, &mut on_path)
    }

    fn evaluate_inner(&self, id: NodeId, on_path: &mut [bool]) -> Result<bool, CircuitError> {
        match self.nodes[id.0] {
            None => Err(CircuitError::NotFound(self.names[id.0].clone())),
            Some(Node::Literal(value)) => Ok(value),
            Some(Node::Gate { op, left, right }) => {
                if on_path[id.0] {
                    return Err(CircuitError::CyclicGraph(self.names[id.0].clone()));
                }
                on_path[id.0] = true;
                let left = self.evaluate_inner(left, on_path)?;
                let right = self.evaluate_inner(right, on_path)?;
                on_path[id.0] = false;
                Ok(op.apply(left, right))
            }
        }
    }

    /// Fully parenthesised infix form of the subtree rooted at `name`.
    pub fn render(&self, name: &str) -> Result<String, CircuitError> {
        self.render_id(self.lookup(name)?)
    }

    pub fn render_id(&self, id: NodeId) -> Result<String, CircuitError> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut out = String::new();
        self.render_inner(id, &mut on_path, &mut out)?;
        Ok(out)
    }

    fn render_inner(
        &self,
        id: NodeId,
        on_path: &mut [bool],
        out: &mut String,
    ) -> Result<(), CircuitError> {
        match self.nodes[id.0] {
            None => Err(CircuitError::NotFound(self.names[id.0].clone())),
            Some(Node::Literal(_)) => {
                out.push_str(&self.names[id.0]);
                Ok(())
            }
            Some(Node::Gate { op, left, right }) => {
                if on_path[id.0] {
                    return Err(CircuitError::CyclicGraph(self.names[id.0].clone()));
                }
                on_path[id.0] = true;
                out.push('(');
                self.render_inner(left, on_path, out)?;
                out.push(' ');
                out.push_str(op.mnemonic());
                out.push(' ');
                self.render_inner(right, on_path, out)?;
                out.push(')');
                on_path[id.0] = false;
                Ok(())
            }
        }
    }

    /// Exchanges the contents of two slots. Names stay attached to their slots.
    pub fn swap(&mut self, a: NodeId, b: NodeId) {
        self.nodes.swap(a.0, b.0);
    }

    /// [`Circuit::swap`] by signal name.
    pub fn swap_signals(&mut self, a: &str, b: &str) -> Result<(), CircuitError> {
        let a = self.lookup(a)?;
        let b = self.lookup(b)?;
        self.swap(a, b);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_gate(x: bool, y: bool) -> Circuit {
        let mut circuit = Circuit::new();
        circuit.add_literal("x00", x).unwrap();
        circuit.add_literal("y00", y).unwrap();
        circuit.add_rule("z00", "x00", "y00", GateOp::And).unwrap();
        circuit
    }

    #[test]
    fn evaluate_and_gate() {
        assert!(and_gate(true, true).evaluate("z00").unwrap());
        assert!(!and_gate(true, false).evaluate("z00").unwrap());
    }

    #[test]
    fn gate_operators() {
        for (l, r) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(GateOp::And.apply(l, r), l && r);
            assert_eq!(GateOp::Or.apply(l, r), l || r);
            assert_eq!(GateOp::Xor.apply(l, r), l != r);
        }
    }

    #[test]
    fn parse_operator() {
        assert_eq!("XOR".parse::<GateOp>(), Ok(GateOp::Xor));
        assert_eq!(
            "NAND".parse::<GateOp>(),
            Err(CircuitError::InvalidOperator("NAND".to_string()))
        );
    }

    #[test]
    fn operands_resolve_lazily() {
        let mut circuit = Circuit::new();
        circuit.add_rule("out", "a", "b", GateOp::Or).unwrap();
        assert_eq!(
            circuit.evaluate("out"),
            Err(CircuitError::NotFound("a".into()))
        );

        circuit.add_literal("a", false).unwrap();
        circuit.add_literal("b", true).unwrap();
        assert!(circuit.evaluate("out").unwrap());
    }

    #[test]
    fn unknown_signal() {
        let circuit = and_gate(true, true);
        assert_eq!(
            circuit.evaluate("w00"),
            Err(CircuitError::NotFound("w00".into()))
        );
    }

    #[test]
    fn literal_update_is_idempotent() {
        let mut circuit = and_gate(true, true);
        let first = circuit.add_literal("x00", false).unwrap();
        let second = circuit.add_literal("x00", false).unwrap();
        assert_eq!(first, second);
        assert!(!circuit.evaluate("z00").unwrap());
    }

    #[test]
    fn kind_conflict() {
        let mut circuit = and_gate(true, true);
        assert!(matches!(
            circuit.add_literal("z00", true),
            Err(CircuitError::KindConflict { declared: "gate", .. })
        ));
        assert!(matches!(
            circuit.add_rule("x00", "y00", "z00", GateOp::Xor),
            Err(CircuitError::KindConflict { declared: "literal", .. })
        ));
    }

    #[test]
    fn cycle_is_reported() {
        let mut circuit = Circuit::new();
        circuit.add_literal("a", true).unwrap();
        circuit.add_rule("b", "a", "c", GateOp::And).unwrap();
        circuit.add_rule("c", "a", "b", GateOp::Or).unwrap();

        assert!(matches!(
            circuit.evaluate("b"),
            Err(CircuitError::CyclicGraph(_))
        ));
        assert!(matches!(
            circuit.render("c"),
            Err(CircuitError::CyclicGraph(_))
        ));
    }

    #[test]
    fn shared_operand_is_not_a_cycle() {
        let mut circuit = Circuit::new();
        circuit.add_literal("a", true).unwrap();
        circuit.add_rule("b", "a", "a", GateOp::Xor).unwrap();
        circuit.add_rule("c", "b", "b", GateOp::Or).unwrap();
        assert!(!circuit.evaluate("c").unwrap());
        assert_eq!(circuit.render("c").unwrap(), "((a XOR a) OR (a XOR a))");
    }

    #[test]
    fn swap_moves_content_not_names() {
        let mut circuit = Circuit::new();
        circuit.add_literal("a", true).unwrap();
        circuit.add_literal("b", false).unwrap();
        circuit.add_rule("p", "a", "b", GateOp::And).unwrap();
        circuit.add_rule("q", "a", "b", GateOp::Or).unwrap();
        circuit.add_rule("out", "p", "q", GateOp::Xor).unwrap();

        circuit.swap_signals("p", "q").unwrap();
        assert!(circuit.evaluate("p").unwrap());
        assert!(!circuit.evaluate("q").unwrap());
        assert_eq!(circuit.render("out").unwrap(), "((a OR b) XOR (a AND b))");
        assert_eq!(circuit.name(circuit.lookup("p").unwrap()).as_ref(), "p");
    }

    #[test]
    fn double_swap_restores() {
        let mut circuit = and_gate(true, false);
        circuit.add_rule("w", "x00", "y00", GateOp::Or).unwrap();
        let before = circuit.render("z00").unwrap();

        circuit.swap_signals("z00", "w").unwrap();
        assert!(circuit.evaluate("z00").unwrap());
        circuit.swap_signals("w", "z00").unwrap();

        assert_eq!(circuit.render("z00").unwrap(), before);
        assert!(!circuit.evaluate("z00").unwrap());
    }
}
