//! Core types for network representation.

use std::fmt;

/// A unique identifier for a device in the network.
/// Devices are numbered in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Value carried by a wire during one cycle.
///
/// `Rising` and `Falling` mark a transition that happened this cycle; every
/// level-sensitive consumer treats them as `High` and `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    #[default]
    Low,
    High,
    Rising,
    Falling,
}

impl Signal {
    /// Steady signal for a boolean level.
    pub fn from_level(high: bool) -> Self {
        if high {
            Signal::High
        } else {
            Signal::Low
        }
    }

    /// Signal reached by moving from `previous` to `high`, marking the edge
    /// if the level changed.
    pub fn transition(previous: Signal, high: bool) -> Self {
        match (previous.is_high(), high) {
            (false, true) => Signal::Rising,
            (true, false) => Signal::Falling,
            (_, level) => Signal::from_level(level),
        }
    }

    /// Level seen by non-edge-sensitive consumers.
    pub fn is_high(self) -> bool {
        matches!(self, Signal::High | Signal::Rising)
    }

    /// Collapse transitional markers to their steady level.
    pub fn level(self) -> Self {
        Signal::from_level(self.is_high())
    }

    /// Whether this signal marks a transition.
    pub fn is_edge(self) -> bool {
        matches!(self, Signal::Rising | Signal::Falling)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Signal::Low => "LOW",
            Signal::High => "HIGH",
            Signal::Rising => "RISING",
            Signal::Falling => "FALLING",
        };
        f.write_str(text)
    }
}

/// An input terminal of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputPin {
    /// Numbered gate input `I1`..`I16`
    I(u8),
    Data,
    Clk,
    Set,
    Clear,
}

impl fmt::Display for InputPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPin::I(n) => write!(f, "I{}", n),
            InputPin::Data => f.write_str("DATA"),
            InputPin::Clk => f.write_str("CLK"),
            InputPin::Set => f.write_str("SET"),
            InputPin::Clear => f.write_str("CLEAR"),
        }
    }
}

/// An output terminal of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputPin {
    /// The unnamed output of a single-output device
    Out,
    Q,
    QBar,
}

impl OutputPin {
    /// Name written after the `.` in a signal name, if any.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            OutputPin::Out => None,
            OutputPin::Q => Some("Q"),
            OutputPin::QBar => Some("QBAR"),
        }
    }
}

/// A pin name as written in a definition, classified by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    Input(InputPin),
    Output(OutputPin),
}

impl Pin {
    /// Classify the text after a `.` in a pin reference.
    ///
    /// Gate inputs accept `I1` through `I255` here; whether a device
    /// actually has the pin is decided by the device.
    pub fn from_name(text: &str) -> Option<Self> {
        match text {
            "DATA" => Some(Pin::Input(InputPin::Data)),
            "CLK" => Some(Pin::Input(InputPin::Clk)),
            "SET" => Some(Pin::Input(InputPin::Set)),
            "CLEAR" => Some(Pin::Input(InputPin::Clear)),
            "Q" => Some(Pin::Output(OutputPin::Q)),
            "QBAR" => Some(Pin::Output(OutputPin::QBar)),
            _ => {
                let digits = text.strip_prefix('I')?;
                if digits.starts_with('0') {
                    return None;
                }
                match digits.parse::<u8>() {
                    Ok(n) if n > 0 => Some(Pin::Input(InputPin::I(n))),
                    _ => None,
                }
            }
        }
    }
}

/// A specific output pin of a specific device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub device: DeviceId,
    pub pin: OutputPin,
}

impl OutputRef {
    pub fn new(device: DeviceId, pin: OutputPin) -> Self {
        Self { device, pin }
    }
}

/// A wire from one output pin into one input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: OutputRef,
    pub device: DeviceId,
    pub pin: InputPin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_marks_edges() {
        assert_eq!(Signal::transition(Signal::Low, true), Signal::Rising);
        assert_eq!(Signal::transition(Signal::Falling, true), Signal::Rising);
        assert_eq!(Signal::transition(Signal::High, false), Signal::Falling);
        assert_eq!(Signal::transition(Signal::Rising, true), Signal::High);
        assert_eq!(Signal::transition(Signal::Low, false), Signal::Low);
    }

    #[test]
    fn test_edges_collapse_to_levels() {
        assert!(Signal::Rising.is_high());
        assert!(!Signal::Falling.is_high());
        assert_eq!(Signal::Rising.level(), Signal::High);
        assert_eq!(Signal::Falling.level(), Signal::Low);
    }

    #[test]
    fn test_pin_names() {
        assert_eq!(Pin::from_name("I3"), Some(Pin::Input(InputPin::I(3))));
        assert_eq!(Pin::from_name("QBAR"), Some(Pin::Output(OutputPin::QBar)));
        assert_eq!(Pin::from_name("CLK"), Some(Pin::Input(InputPin::Clk)));
        assert_eq!(Pin::from_name("I0"), None);
        assert_eq!(Pin::from_name("I01"), None);
        assert_eq!(Pin::from_name("PLATYPUS"), None);
        assert_eq!(Pin::from_name("I"), None);
    }
}
