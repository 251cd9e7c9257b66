//! Combinational gates: AND, OR, NAND, NOR with configurable inputs,
//! plus fixed-shape XOR and NOT.

use crate::network::Signal;

/// Logic function of a configurable-arity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOp {
    And,
    Or,
    Nand,
    Nor,
}

impl GateOp {
    /// Evaluate over input levels. Edge markers count as their level.
    pub fn evaluate(self, inputs: impl IntoIterator<Item = Signal>) -> Signal {
        let mut inputs = inputs.into_iter().map(Signal::is_high);
        let high = match self {
            GateOp::And => inputs.all(|x| x),
            GateOp::Or => inputs.any(|x| x),
            GateOp::Nand => !inputs.all(|x| x),
            GateOp::Nor => !inputs.any(|x| x),
        };
        Signal::from_level(high)
    }
}

/// A gate with `arity` numbered inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub op: GateOp,
    pub arity: u8,
}

impl Gate {
    pub fn new(op: GateOp, arity: u8) -> Self {
        Self { op, arity }
    }
}

/// Two-input exclusive or: HIGH iff the inputs differ.
pub fn xor(a: Signal, b: Signal) -> Signal {
    Signal::from_level(a.is_high() != b.is_high())
}

/// Single-input inverter.
pub fn not(a: Signal) -> Signal {
    Signal::from_level(!a.is_high())
}
