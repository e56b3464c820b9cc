//! Repair of adders whose gate outputs have been swapped.
//!
//! The search walks the sum bits from the least significant one. When a bit does not have the
//! canonical shape, [`Template::mismatches`] narrows the defect down to a chain of positions,
//! and every node of the circuit is tried as a substitute for the deepest position first.
//! When both operands of the deepest gate are wrong, each operand is tried against each of
//! the shapes it may be missing before moving up the chain. Literal inputs are never moved.
//!
//! Each candidate swap is a transaction: it is applied, checked, and reverted unless
//!
//! 1. the position now has the expected shape,
//! 2. every lower sum bit still validates, and
//! 3. the circuit is still acyclic.
//!
//! If a bit cannot be fixed, every swap accepted so far is reverted before the error is
//! returned, leaving the circuit exactly as it was handed in.

use super::{SUM, pattern::{Mismatch, Shape, Template}};
use crate::{
    Symbol,
    circuit::{Circuit, CircuitError, NodeId, bus::bus_signal},
};
use itertools::Itertools;
use std::{error::Error, fmt};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_SWAPS_PER_BIT: usize = 4;

/// Tuning of the repair search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairOptions {
    /// Number of swaps a single sum bit may need before it is declared irreparable.
    pub max_swaps_per_bit: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            max_swaps_per_bit: DEFAULT_MAX_SWAPS_PER_BIT,
        }
    }
}

/// A swap performed by the repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    /// Sum bit being validated when the swap was made.
    pub bit: usize,
    /// Shape that was missing at `mismatched`.
    pub shape: Shape,
    /// Signal whose content did not have `shape`.
    pub mismatched: Symbol,
    /// Signal whose content was moved in.
    pub substitute: Symbol,
}

/// Outcome of a successful repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Swaps in the order they were applied.
    pub swaps: Vec<Swap>,
    /// Number of sum bits validated.
    pub bits: usize,
}

impl RepairReport {
    /// Every swapped signal, sorted and without duplicates.
    pub fn signals(&self) -> Vec<Symbol> {
        self.swaps
            .iter()
            .flat_map(|swap| [swap.mismatched.clone(), swap.substitute.clone()])
            .sorted_by(|a, b| a.as_ref().cmp(b.as_ref()))
            .dedup()
            .collect()
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signals().iter().join(","))
    }
}

/// Errors of [`repair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairError {
    Circuit(CircuitError),
    /// No swap restores `shape` at `signal` while validating sum bit `bit`.
    Irreparable {
        bit: usize,
        signal: Symbol,
        shape: Shape,
    },
}

impl fmt::Display for RepairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairError::Circuit(err) => write!(f, "{}", err),
            RepairError::Irreparable { bit, signal, shape } => write!(
                f,
                "Sum bit {} cannot be repaired: no swap gives {} the shape of {}",
                bit, signal, shape
            ),
        }
    }
}

impl Error for RepairError {}

impl From<CircuitError> for RepairError {
    fn from(err: CircuitError) -> Self {
        RepairError::Circuit(err)
    }
}

/// Repairs `circuit` in place with the default [`RepairOptions`].
///
/// # Example
///
/// ```
/// use gatefix::adder::{repair, ripple_carry};
///
/// let mut circuit = ripple_carry(4).unwrap();
/// circuit.swap_signals("z02", "g02").unwrap();
///
/// let report = repair(&mut circuit).unwrap();
/// assert_eq!(report.to_string(), "g02,z02");
/// ```
pub fn repair(circuit: &mut Circuit) -> Result<RepairReport, RepairError> {
    repair_with(circuit, RepairOptions::default())
}

/// Repairs `circuit` in place.
///
/// On error the circuit is left unchanged.
pub fn repair_with(
    circuit: &mut Circuit,
    options: RepairOptions,
) -> Result<RepairReport, RepairError> {
    circuit.check_acyclic()?;

    let template = Template::new(circuit);
    let mut search = Search {
        circuit,
        template,
        options,
        outputs: Vec::new(),
        applied: Vec::new(),
        swaps: Vec::new(),
    };

    match search.run() {
        Ok(bits) => {
            info!(bits, swaps = search.swaps.len(), "adder repaired");
            Ok(RepairReport {
                swaps: search.swaps,
                bits,
            })
        }
        Err(err) => {
            search.rollback();
            Err(err)
        }
    }
}

struct Search<'c> {
    circuit: &'c mut Circuit,
    template: Template,
    options: RepairOptions,
    /// Sum outputs of the bits validated so far.
    outputs: Vec<NodeId>,
    applied: Vec<(NodeId, NodeId)>,
    swaps: Vec<Swap>,
}

impl Search<'_> {
    fn run(&mut self) -> Result<usize, RepairError> {
        let bits = self.template.width().saturating_sub(1);

        for bit in 0..bits {
            let output = self.circuit.lookup(&bus_signal(SUM, bit))?;
            let mut accepted = 0;

            loop {
                let chain = self
                    .template
                    .mismatches(self.circuit, Shape::Sum(bit), output);
                let Some(deepest) = chain.last().copied() else {
                    debug!(bit, "sum bit matches");
                    break;
                };

                if accepted == self.options.max_swaps_per_bit || !self.repair_step(bit, &chain) {
                    let signal = self.circuit.name(deepest.node).clone();
                    warn!(bit, signal = %signal, shape = %deepest.shape, "no swap repairs sum bit");
                    return Err(RepairError::Irreparable {
                        bit,
                        signal,
                        shape: deepest.shape,
                    });
                }
                accepted += 1;
            }

            self.outputs.push(output);
        }

        Ok(bits)
    }

    /// Applies the first acceptable swap, trying the deepest mismatch first, then its
    /// operands, then the rest of the chain upwards.
    fn repair_step(&mut self, bit: usize, chain: &[Mismatch]) -> bool {
        let Some((deepest, rest)) = chain.split_last() else {
            return false;
        };
        let positions: Vec<Mismatch> = std::iter::once(*deepest)
            .chain(self.template.suspects(self.circuit, *deepest))
            .chain(rest.iter().rev().copied())
            .collect();

        for mismatch in positions.iter() {
            // Only gate outputs are ever swapped.
            if self
                .circuit
                .node(mismatch.node)
                .is_some_and(|node| node.is_literal())
            {
                continue;
            }

            let candidates: Vec<NodeId> = self
                .circuit
                .ids()
                .filter(|id| *id != mismatch.node)
                .filter(|id| self.template.matches(self.circuit, mismatch.shape, *id))
                .collect();

            for candidate in candidates {
                self.circuit.swap(mismatch.node, candidate);

                if self.accepts(*mismatch) {
                    self.record(bit, *mismatch, candidate);
                    return true;
                }

                debug!(
                    bit,
                    mismatched = %self.circuit.name(mismatch.node),
                    candidate = %self.circuit.name(candidate),
                    "swap rejected"
                );
                self.circuit.swap(mismatch.node, candidate);
            }
        }

        false
    }

    fn accepts(&self, mismatch: Mismatch) -> bool {
        self.template
            .matches(self.circuit, mismatch.shape, mismatch.node)
            && self
                .outputs
                .iter()
                .enumerate()
                .all(|(bit, output)| self.template.validate_z(self.circuit, bit, *output))
            && self.circuit.check_acyclic().is_ok()
    }

    fn record(&mut self, bit: usize, mismatch: Mismatch, candidate: NodeId) {
        let swap = Swap {
            bit,
            shape: mismatch.shape,
            mismatched: self.circuit.name(mismatch.node).clone(),
            substitute: self.circuit.name(candidate).clone(),
        };
        info!(
            bit,
            mismatched = %swap.mismatched,
            substitute = %swap.substitute,
            shape = %swap.shape,
            "swapped outputs"
        );
        self.applied.push((mismatch.node, candidate));
        self.swaps.push(swap);
    }

    fn rollback(&mut self) {
        while let Some((a, b)) = self.applied.pop() {
            self.circuit.swap(a, b);
        }
        self.swaps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adder::{ADDEND, AUGEND, ripple_carry};
    use crate::circuit::GateOp;
    use crate::netlist::serialisation::serialise_netlist;
    use itertools::Itertools;

    fn names(report: &RepairReport) -> Vec<String> {
        report.signals().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn canonical_adder_needs_no_swaps() {
        let mut circuit = ripple_carry(6).unwrap();
        let report = repair(&mut circuit).unwrap();
        assert!(report.swaps.is_empty());
        assert_eq!(report.bits, 6);
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn output_swapped_with_carry_input() {
        let mut circuit = ripple_carry(4).unwrap();
        circuit.swap_signals("z02", "g02").unwrap();

        let report = repair(&mut circuit).unwrap();
        assert_eq!(names(&report), vec!["g02", "z02"]);
        assert_eq!(report.swaps.len(), 1);
        assert_eq!(report.swaps[0].bit, 2);
        assert_eq!(report.swaps[0].shape, Shape::Sum(2));
        assert_eq!(
            serialise_netlist(&circuit),
            serialise_netlist(&ripple_carry(4).unwrap())
        );
    }

    #[test]
    fn half_sum_swapped_with_generate() {
        let mut circuit = ripple_carry(5).unwrap();
        circuit.swap_signals("h03", "g03").unwrap();

        let report = repair(&mut circuit).unwrap();
        assert_eq!(names(&report), vec!["g03", "h03"]);
        assert_eq!(
            report.swaps[0].shape,
            Shape::Pair {
                op: GateOp::Xor,
                bit: 3
            }
        );
    }

    #[test]
    fn four_defects() {
        let mut circuit = ripple_carry(8).unwrap();
        circuit.swap_signals("z01", "h02").unwrap();
        circuit.swap_signals("h03", "g03").unwrap();
        circuit.swap_signals("z05", "c05").unwrap();
        circuit.swap_signals("g06", "g05").unwrap();

        let report = repair(&mut circuit).unwrap();
        assert_eq!(
            names(&report),
            vec!["c05", "g03", "g05", "g06", "h02", "h03", "z01", "z05"]
        );
        assert_eq!(report.swaps.len(), 4);

        for (x, y) in [(0, 0), (1, 255), (170, 85), (200, 123), (255, 255)] {
            circuit.write_bus(AUGEND, x).unwrap();
            circuit.write_bus(ADDEND, y).unwrap();
            assert_eq!(circuit.read_bus(SUM).unwrap(), x + y);
        }
    }

    #[test]
    fn irreparable_bit_leaves_circuit_untouched() {
        let mut circuit = ripple_carry(4).unwrap();
        circuit.swap_signals("z01", "h02").unwrap();
        // No gate anywhere computes x03 XOR y03 once this one is gone.
        circuit.add_rule("h03", "x03", "y03", GateOp::Or).unwrap();
        let before = serialise_netlist(&circuit);

        let err = repair(&mut circuit).unwrap_err();
        assert_eq!(
            err,
            RepairError::Irreparable {
                bit: 3,
                signal: "h03".into(),
                shape: Shape::Pair {
                    op: GateOp::Xor,
                    bit: 3
                },
            }
        );
        assert_eq!(serialise_netlist(&circuit), before);
    }

    #[test]
    fn swap_bound_is_honoured() {
        let mut circuit = ripple_carry(4).unwrap();
        circuit.swap_signals("z02", "g02").unwrap();

        let err = repair_with(
            &mut circuit,
            RepairOptions {
                max_swaps_per_bit: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RepairError::Irreparable { bit: 2, .. }));
    }

    #[test]
    fn missing_output() {
        let mut circuit = Circuit::new();
        circuit.add_literal("x00", true).unwrap();
        circuit.add_literal("y00", true).unwrap();
        circuit.add_rule("z01", "x00", "y00", GateOp::And).unwrap();
        assert_eq!(
            repair(&mut circuit).unwrap_err(),
            RepairError::Circuit(CircuitError::NotFound("z00".into()))
        );
    }

    #[test]
    fn cyclic_circuit_is_rejected() {
        let mut circuit = ripple_carry(3).unwrap();
        circuit.swap_signals("h01", "z01").unwrap();
        assert!(matches!(
            repair(&mut circuit),
            Err(RepairError::Circuit(CircuitError::CyclicGraph(_)))
        ));
    }

    #[test]
    fn both_sum_operands_swapped() {
        let mut circuit = ripple_carry(5).unwrap();
        // z03 becomes (x02 AND y02) XOR ((x03 XOR y03) OR p02): no operand is right.
        circuit.swap_signals("h03", "g02").unwrap();

        let report = repair(&mut circuit).unwrap();
        assert_eq!(names(&report), vec!["g02", "h03"]);
        assert_eq!(report.swaps.len(), 1);
        assert_eq!(
            serialise_netlist(&circuit),
            serialise_netlist(&ripple_carry(5).unwrap())
        );
    }

    #[test]
    fn every_single_swap_is_reversed() {
        let reference = ripple_carry(6).unwrap();
        let gates: Vec<NodeId> = reference
            .ids()
            .filter(|id| reference.node(*id).is_some_and(|node| !node.is_literal()))
            .collect();
        let mut seeded = 0;

        for (a, b) in gates.iter().copied().tuple_combinations() {
            let mut circuit = reference.clone();
            circuit.swap(a, b);
            if circuit.check_acyclic().is_err() {
                continue;
            }

            // Swaps such as the two inputs of a carry OR leave every sum bit intact.
            let template = Template::new(&circuit);
            let intact = (0..template.width() - 1).all(|bit| {
                let output = circuit.lookup(&bus_signal(SUM, bit)).unwrap();
                template.validate_z(&circuit, bit, output)
            });
            if intact {
                continue;
            }
            seeded += 1;

            let (first, second) = (reference.name(a), reference.name(b));
            let report = repair(&mut circuit)
                .unwrap_or_else(|err| panic!("{} <-> {}: {}", first, second, err));
            let mut expected = vec![first.to_string(), second.to_string()];
            expected.sort();
            assert_eq!(names(&report), expected, "{} <-> {}", first, second);
        }

        assert_eq!(seeded, 181);
    }

    #[test]
    fn literal_input_is_never_swapped() {
        let mut circuit = ripple_carry(4).unwrap();
        // An input wire where the carry into bit 1 belongs.
        circuit.add_rule("z01", "h01", "x02", GateOp::Xor).unwrap();
        let before = serialise_netlist(&circuit);

        let err = repair(&mut circuit).unwrap_err();
        assert_eq!(
            err,
            RepairError::Irreparable {
                bit: 1,
                signal: "x02".into(),
                shape: Shape::CarryTop(1),
            }
        );
        assert_eq!(serialise_netlist(&circuit), before);
    }
}
