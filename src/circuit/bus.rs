//! Multi-bit buses encoded in signal names.
//!
//! Bit `i` of bus `x` is the signal `x` followed by the decimal index, zero-padded to two
//! digits (`x00`, `x01`, ..., `x44`). Reading and writing a bus treats it as an unsigned
//! integer with bit `i` worth `2^i`.

use super::{Circuit, CircuitError, NodeId};
use crate::Symbol;
use lazy_static::*;
use regex::Regex;

/// Name of bit `index` of bus `prefix`.
pub fn bus_signal(prefix: char, index: usize) -> Symbol {
    format!("{}{:02}", prefix, index).into()
}

/// Splits a bus member name into its prefix and bit index.
pub fn parse_bus_signal(name: &str) -> Option<(char, usize)> {
    lazy_static! {
        static ref BUS_RE: Regex = Regex::new(r"^([A-Za-z])([0-9]+)$").unwrap();
    }

    let c = BUS_RE.captures(name)?;
    let prefix = c[1].chars().next()?;
    let index = c[2].parse().ok()?;
    Some((prefix, index))
}

impl Circuit {
    /// Declared members of bus `prefix`, sorted by bit index.
    pub fn bus_signals(&self, prefix: char) -> Vec<(usize, NodeId)> {
        let mut members: Vec<(usize, NodeId)> = self
            .ids()
            .filter(|id| self.node(*id).is_some())
            .filter_map(|id| match parse_bus_signal(self.name(id)) {
                Some((p, index)) if p == prefix => Some((index, id)),
                _ => None,
            })
            .collect();
        members.sort_unstable();
        members
    }

    /// Number of bits needed to address every declared member of the bus.
    pub fn bus_width(&self, prefix: char) -> usize {
        self.bus_signals(prefix)
            .last()
            .map_or(0, |(index, _)| index + 1)
    }

    /// Evaluates every member of bus `prefix` into an integer.
    pub fn read_bus(&self, prefix: char) -> Result<u64, CircuitError> {
        self.bus_signals(prefix)
            .into_iter()
            .try_fold(0u64, |acc, (index, id)| {
                if index >= 64 {
                    return Err(CircuitError::BusTooWide { prefix, index });
                }
                Ok(acc | (u64::from(self.evaluate_id(id)?) << index))
            })
    }

    /// Assigns `value` to the literal members of bus `prefix`.
    ///
    /// Members that are gates are left untouched.
    pub fn write_bus(&mut self, prefix: char, value: u64) -> Result<(), CircuitError> {
        let width = self.bus_width(prefix);
        if width < 64 && value >> width != 0 {
            return Err(CircuitError::BusOverflow { prefix, value });
        }

        for (index, id) in self.bus_signals(prefix) {
            if index >= 64 {
                return Err(CircuitError::BusTooWide { prefix, index });
            }
            if let Some(node) = self.nodes[id.index()].as_mut() {
                if node.is_literal() {
                    *node = super::Node::Literal((value >> index) & 1 == 1);
                }
            }
        }

        Ok(())
    }
}
