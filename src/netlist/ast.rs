use crate::Symbol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Wire {
        name: Symbol,
        value: Symbol,
    },
    Gate {
        left: Symbol,
        op: Symbol,
        right: Symbol,
        output: Symbol,
    },
}
