//! Device models for the logic network.
//!
//! This module provides every supported device kind:
//! - Sources: Switch, Clock, Signal generator
//! - Combinational: AND, OR, NAND, NOR, XOR, NOT
//! - Sequential: D-type flip-flop
//!
//! Each kind fixes its pin shape. Combinational kinds expose a pure
//! [`Device::evaluate`]; stateful kinds advance or commit their state at
//! the points of the cycle the engine dictates.

mod dtype;
mod gates;
mod sources;

pub use dtype::DType;
pub use gates::{Gate, GateOp};
pub use sources::{Clock, Siggen, Switch};

use std::fmt;

use crate::error::NetworkError;
use crate::names::Name;
use crate::network::{InputPin, OutputPin, OutputRef, Signal};
use crate::MAX_GATE_INPUTS;

/// Device kinds as written in a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Switch,
    Clock,
    Siggen,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Not,
    Dtype,
}

impl DeviceType {
    /// Parse a device type from its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SWITCH" => Some(Self::Switch),
            "CLOCK" => Some(Self::Clock),
            "SIGGEN" => Some(Self::Siggen),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NAND" => Some(Self::Nand),
            "NOR" => Some(Self::Nor),
            "XOR" => Some(Self::Xor),
            "NOT" => Some(Self::Not),
            "DTYPE" => Some(Self::Dtype),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Switch => "SWITCH",
            Self::Clock => "CLOCK",
            Self::Siggen => "SIGGEN",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::Not => "NOT",
            Self::Dtype => "DTYPE",
        }
    }

    /// Whether the kind has no inputs.
    pub fn is_source(self) -> bool {
        matches!(self, Self::Switch | Self::Clock | Self::Siggen)
    }

    /// Whether the output is a pure function of the current inputs.
    pub fn is_combinational(self) -> bool {
        !self.is_source() && self != Self::Dtype
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Kind-specific configuration and state of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Switch(Switch),
    Clock(Clock),
    Siggen(Siggen),
    Gate(Gate),
    Xor,
    Not,
    DType(DType),
}

impl DeviceKind {
    /// Build a device kind from its declared type and optional qualifier
    /// text (the digits following the type keyword).
    pub fn from_declaration(
        device_type: DeviceType,
        qualifier: Option<&str>,
    ) -> Result<Self, NetworkError> {
        match device_type {
            DeviceType::And | DeviceType::Or | DeviceType::Nand | DeviceType::Nor => {
                let text = qualifier.ok_or(NetworkError::MissingQualifier {
                    expected: "a number of inputs",
                })?;
                let arity = parse_count(text);
                if arity == 0 || arity > MAX_GATE_INPUTS as u64 {
                    return Err(NetworkError::InvalidArity {
                        arity,
                        max: MAX_GATE_INPUTS,
                    });
                }
                let op = match device_type {
                    DeviceType::And => GateOp::And,
                    DeviceType::Or => GateOp::Or,
                    DeviceType::Nand => GateOp::Nand,
                    _ => GateOp::Nor,
                };
                Ok(DeviceKind::Gate(Gate::new(op, arity as u8)))
            }
            DeviceType::Switch => {
                let text = qualifier.ok_or(NetworkError::MissingQualifier {
                    expected: "a switch state (0 or 1)",
                })?;
                match text {
                    "0" => Ok(DeviceKind::Switch(Switch::new(false))),
                    "1" => Ok(DeviceKind::Switch(Switch::new(true))),
                    _ => Err(NetworkError::InvalidBit),
                }
            }
            DeviceType::Clock => {
                let text = qualifier.ok_or(NetworkError::MissingQualifier {
                    expected: "a clock half-period",
                })?;
                let half_period = parse_count(text);
                if half_period == 0 {
                    return Err(NetworkError::ZeroHalfPeriod);
                }
                Ok(DeviceKind::Clock(Clock::new(
                    half_period.min(u32::MAX as u64) as u32,
                )))
            }
            DeviceType::Siggen => {
                let text = qualifier.ok_or(NetworkError::MissingQualifier {
                    expected: "a waveform of bits",
                })?;
                Siggen::from_bits(text)
                    .map(DeviceKind::Siggen)
                    .ok_or(NetworkError::InvalidWaveform)
            }
            DeviceType::Xor | DeviceType::Not | DeviceType::Dtype => {
                if qualifier.is_some() {
                    return Err(NetworkError::UnexpectedQualifier {
                        kind: device_type.keyword(),
                    });
                }
                Ok(match device_type {
                    DeviceType::Xor => DeviceKind::Xor,
                    DeviceType::Not => DeviceKind::Not,
                    _ => DeviceKind::DType(DType::new()),
                })
            }
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceKind::Switch(_) => DeviceType::Switch,
            DeviceKind::Clock(_) => DeviceType::Clock,
            DeviceKind::Siggen(_) => DeviceType::Siggen,
            DeviceKind::Gate(gate) => match gate.op {
                GateOp::And => DeviceType::And,
                GateOp::Or => DeviceType::Or,
                GateOp::Nand => DeviceType::Nand,
                GateOp::Nor => DeviceType::Nor,
            },
            DeviceKind::Xor => DeviceType::Xor,
            DeviceKind::Not => DeviceType::Not,
            DeviceKind::DType(_) => DeviceType::Dtype,
        }
    }

    fn input_pins(&self) -> Vec<InputPin> {
        match self {
            DeviceKind::Switch(_) | DeviceKind::Clock(_) | DeviceKind::Siggen(_) => Vec::new(),
            DeviceKind::Gate(gate) => (1..=gate.arity).map(InputPin::I).collect(),
            DeviceKind::Xor => vec![InputPin::I(1), InputPin::I(2)],
            DeviceKind::Not => vec![InputPin::I(1)],
            DeviceKind::DType(_) => vec![
                InputPin::Data,
                InputPin::Clk,
                InputPin::Set,
                InputPin::Clear,
            ],
        }
    }

    fn output_pins(&self) -> Vec<OutputPin> {
        match self {
            DeviceKind::DType(_) => vec![OutputPin::Q, OutputPin::QBar],
            _ => vec![OutputPin::Out],
        }
    }
}

/// Saturating decimal parse of a digit run; the scanner guarantees digits.
fn parse_count(text: &str) -> u64 {
    text.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10)
            .saturating_add(u64::from(b.wrapping_sub(b'0')))
    })
}

/// A device instance: its name, kind, input bindings and output values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: Name,
    pub kind: DeviceKind,
    inputs: Vec<(InputPin, Option<OutputRef>)>,
    outputs: Vec<(OutputPin, Signal)>,
}

impl Device {
    /// Create a device with all inputs unbound and outputs at their
    /// cold-start values.
    pub fn new(name: Name, kind: DeviceKind) -> Self {
        let inputs = kind.input_pins().into_iter().map(|pin| (pin, None)).collect();
        let outputs = kind
            .output_pins()
            .into_iter()
            .map(|pin| (pin, Signal::Low))
            .collect();
        let mut device = Self {
            name,
            kind,
            inputs,
            outputs,
        };
        device.cold_start();
        device
    }

    pub fn device_type(&self) -> DeviceType {
        self.kind.device_type()
    }

    pub fn input_pins(&self) -> impl Iterator<Item = InputPin> + '_ {
        self.inputs.iter().map(|(pin, _)| *pin)
    }

    pub fn output_pins(&self) -> impl Iterator<Item = OutputPin> + '_ {
        self.outputs.iter().map(|(pin, _)| *pin)
    }

    pub fn has_input(&self, pin: InputPin) -> bool {
        self.inputs.iter().any(|(p, _)| *p == pin)
    }

    pub fn has_output(&self, pin: OutputPin) -> bool {
        self.outputs.iter().any(|(p, _)| *p == pin)
    }

    /// The only input pin, if the device has exactly one.
    pub fn sole_input(&self) -> Option<InputPin> {
        match self.inputs.as_slice() {
            [(pin, _)] => Some(*pin),
            _ => None,
        }
    }

    /// The only output pin, if the device has exactly one.
    pub fn sole_output(&self) -> Option<OutputPin> {
        match self.outputs.as_slice() {
            [(pin, _)] => Some(*pin),
            _ => None,
        }
    }

    /// Output pin driving `pin`, if bound.
    pub fn driver(&self, pin: InputPin) -> Option<OutputRef> {
        self.inputs
            .iter()
            .find(|(p, _)| *p == pin)
            .and_then(|(_, driver)| *driver)
    }

    /// Input pins with no driver.
    pub fn unbound_inputs(&self) -> impl Iterator<Item = InputPin> + '_ {
        self.inputs
            .iter()
            .filter(|(_, driver)| driver.is_none())
            .map(|(pin, _)| *pin)
    }

    pub(crate) fn bind(&mut self, pin: InputPin, source: OutputRef) -> Result<(), NetworkError> {
        let slot = self
            .inputs
            .iter_mut()
            .find(|(p, _)| *p == pin)
            .ok_or(NetworkError::PortAbsent)?;
        if slot.1.is_some() {
            return Err(NetworkError::InputConnected);
        }
        slot.1 = Some(source);
        Ok(())
    }

    /// Current value of an output pin.
    pub fn output(&self, pin: OutputPin) -> Option<Signal> {
        self.outputs
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, signal)| *signal)
    }

    /// Set an output pin, returning whether its value changed.
    pub(crate) fn set_output(&mut self, pin: OutputPin, signal: Signal) -> bool {
        match self.outputs.iter_mut().find(|(p, _)| *p == pin) {
            Some(slot) if slot.1 != signal => {
                slot.1 = signal;
                true
            }
            _ => false,
        }
    }

    /// Move an output to `high`, marking the edge if it changed.
    fn drive(&mut self, pin: OutputPin, high: bool) {
        let previous = self.output(pin).unwrap_or_default();
        self.set_output(pin, Signal::transition(previous, high));
    }

    /// Output of a combinational device for the given input reader, or
    /// `None` for kinds whose outputs are not combinational.
    pub fn evaluate(&self, read: impl Fn(InputPin) -> Signal) -> Option<Signal> {
        match &self.kind {
            DeviceKind::Gate(gate) => Some(gate.op.evaluate(self.input_pins().map(&read))),
            DeviceKind::Xor => Some(gates::xor(read(InputPin::I(1)), read(InputPin::I(2)))),
            DeviceKind::Not => Some(gates::not(read(InputPin::I(1)))),
            _ => None,
        }
    }

    /// Start-of-cycle update: sources produce this cycle's level and
    /// flip-flops publish the bit committed in the previous cycle.
    pub(crate) fn advance(&mut self) {
        match &mut self.kind {
            DeviceKind::Switch(switch) => {
                let high = switch.state;
                self.drive(OutputPin::Out, high);
            }
            DeviceKind::Clock(clock) => {
                let high = clock.tick();
                self.drive(OutputPin::Out, high);
            }
            DeviceKind::Siggen(gen) => {
                let high = gen.tick();
                self.drive(OutputPin::Out, high);
            }
            DeviceKind::DType(dtype) => {
                let stored = dtype.stored();
                self.drive(OutputPin::Q, stored);
                self.drive(OutputPin::QBar, !stored);
            }
            DeviceKind::Gate(_) | DeviceKind::Xor | DeviceKind::Not => {}
        }
    }

    /// Commit a flip-flop against stable input levels. No-op for other kinds.
    pub(crate) fn latch(&mut self, data: bool, clk: bool, set: bool, clear: bool) {
        if let DeviceKind::DType(dtype) = &mut self.kind {
            dtype.latch(data, clk, set, clear);
        }
    }

    /// Return state and outputs to their power-on values.
    pub fn cold_start(&mut self) {
        match &mut self.kind {
            DeviceKind::Clock(clock) => clock.reset(),
            DeviceKind::Siggen(gen) => gen.reset(),
            DeviceKind::DType(dtype) => dtype.reset(),
            _ => {}
        }
        let switch_state = match &self.kind {
            DeviceKind::Switch(switch) => switch.state,
            _ => false,
        };
        for (pin, signal) in &mut self.outputs {
            *signal = match pin {
                OutputPin::QBar => Signal::High,
                OutputPin::Q => Signal::Low,
                OutputPin::Out => Signal::from_level(switch_state),
            };
        }
    }
}
