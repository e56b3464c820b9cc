//! Conversion of a [`Circuit`] into a `petgraph` graph.
//!
//! Each arena slot becomes a node with the same index and each gate operand becomes an edge
//! from the operand to the gate, so a topological order of the graph is an evaluation order.

use super::{Circuit, CircuitError, Node};
use crate::Symbol;
use petgraph::{algo, dot, graph::NodeIndex, stable_graph::StableGraph};
use std::fmt;

/// Node weight of a [`WireGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub name: Symbol,
    pub node: Option<Node>,
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            None => write!(f, "{} (undeclared)", self.name),
            Some(Node::Literal(value)) => write!(f, "{} = {}", self.name, u8::from(value)),
            Some(Node::Gate { op, .. }) => write!(f, "{} {}", op, self.name),
        }
    }
}

/// Edge weight of a [`WireGraph`]: which input of the gate the edge feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => write!(f, "left"),
            Operand::Right => write!(f, "right"),
        }
    }
}

pub type WireGraph = StableGraph<Wire, Operand>;

impl Circuit {
    pub fn to_graph(&self) -> WireGraph {
        let mut graph = WireGraph::with_capacity(self.len(), 2 * self.len());

        for id in self.ids() {
            let index = graph.add_node(Wire {
                name: self.name(id).clone(),
                node: self.node(id).copied(),
            });
            debug_assert_eq!(index.index(), id.index());
        }

        for id in self.ids() {
            if let Some(Node::Gate { left, right, .. }) = self.node(id) {
                let gate = NodeIndex::new(id.index());
                graph.add_edge(NodeIndex::new(left.index()), gate, Operand::Left);
                graph.add_edge(NodeIndex::new(right.index()), gate, Operand::Right);
            }
        }

        graph
    }

    /// Fails with [`CircuitError::CyclicGraph`] naming a signal on a cycle.
    pub fn check_acyclic(&self) -> Result<(), CircuitError> {
        let graph = self.to_graph();
        algo::toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| CircuitError::CyclicGraph(graph[cycle.node_id()].name.clone()))
    }

    /// Graphviz rendering of the circuit.
    pub fn to_dot(&self) -> String {
        let graph = self.to_graph();
        format!("{}", dot::Dot::new(&graph))
    }
}
