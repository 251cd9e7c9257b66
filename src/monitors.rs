//! Monitor recorder: per-signal traces sampled once per completed cycle.

use log::debug;

use crate::error::MonitorError;
use crate::names::{Name, Names};
use crate::network::{Network, OutputPin, Pin, Signal};
use crate::MAX_MONITORS;

/// A monitored output: device name plus output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorPoint {
    pub device: Name,
    pub pin: OutputPin,
}

impl MonitorPoint {
    pub fn new(device: Name, pin: OutputPin) -> Self {
        Self { device, pin }
    }

    /// Signal name as written in a definition, e.g. `N1` or `D1.QBAR`.
    pub fn signal_name(&self, names: &Names) -> String {
        let device = names.display(self.device);
        match self.pin.suffix() {
            Some(suffix) => format!("{}.{}", device, suffix),
            None => device,
        }
    }

    /// Resolve a signal name against an existing network without interning
    /// anything new.
    pub fn from_signal_name(text: &str, names: &Names, network: &Network) -> Option<Self> {
        let (device_text, pin_text) = match text.split_once('.') {
            Some((device, pin)) => (device, Some(pin)),
            None => (text, None),
        };
        let device = names.query(device_text)?;
        let id = network.device_id(device)?;
        let pin = match pin_text {
            Some(pin_text) => Some(Pin::from_name(pin_text)?),
            None => None,
        };
        let pin = network.resolve_output(id, pin).ok()?;
        Some(Self::new(device, pin))
    }
}

/// Samples of one monitor point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    start_cycle: u64,
    samples: Vec<Signal>,
}

impl Trace {
    /// Number of cycles that had completed before the first sample.
    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    pub fn samples(&self) -> &[Signal] {
        &self.samples
    }
}

/// Ordered set of monitor points and their traces.
#[derive(Debug, Clone, Default)]
pub struct Monitors {
    entries: Vec<(MonitorPoint, Trace)>,
    last_sampled: Option<u64>,
}

impl Monitors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point. Recording starts with the next completed cycle.
    pub fn add(&mut self, point: MonitorPoint, network: &Network) -> Result<(), MonitorError> {
        let id = network.device_id(point.device).ok_or(MonitorError::DeviceAbsent)?;
        if !network.device(id).has_output(point.pin) {
            return Err(MonitorError::NotOutput);
        }
        if self.contains(point) {
            return Err(MonitorError::MonitorPresent);
        }
        if self.entries.len() >= MAX_MONITORS {
            return Err(MonitorError::Capacity { max: MAX_MONITORS });
        }
        let trace = Trace {
            start_cycle: network.cycle(),
            samples: Vec::new(),
        };
        self.entries.push((point, trace));
        Ok(())
    }

    /// Unregister a point, discarding its trace.
    pub fn remove(&mut self, point: MonitorPoint) -> Result<(), MonitorError> {
        let index = self
            .entries
            .iter()
            .position(|(p, _)| *p == point)
            .ok_or(MonitorError::NotMonitored)?;
        self.entries.remove(index);
        Ok(())
    }

    pub fn contains(&self, point: MonitorPoint) -> bool {
        self.entries.iter().any(|(p, _)| *p == point)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Points in the order they were added.
    pub fn points(&self) -> impl Iterator<Item = MonitorPoint> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    /// Points with their traces, in the order they were added.
    pub fn traces(&self) -> impl Iterator<Item = (MonitorPoint, &Trace)> + '_ {
        self.entries.iter().map(|(p, t)| (*p, t))
    }

    pub fn trace(&self, point: MonitorPoint) -> Option<&Trace> {
        self.entries
            .iter()
            .find(|(p, _)| *p == point)
            .map(|(_, t)| t)
    }

    /// Samples recorded so far for `point`.
    pub fn trace_of(&self, point: MonitorPoint) -> Option<&[Signal]> {
        self.trace(point).map(Trace::samples)
    }

    /// Append the current level of every point.
    ///
    /// Samples at most once per completed network cycle; repeated calls
    /// within the same cycle, or before any cycle, record nothing.
    pub fn sample_all(&mut self, network: &Network) {
        let cycle = network.cycle();
        if cycle == 0 || self.last_sampled == Some(cycle) {
            return;
        }
        for (point, trace) in &mut self.entries {
            let signal = network
                .device_id(point.device)
                .and_then(|id| network.output_signal(id, point.pin))
                .unwrap_or_default();
            trace.samples.push(signal.level());
        }
        self.last_sampled = Some(cycle);
        debug!("sampled {} monitor(s) at cycle {}", self.entries.len(), cycle);
    }

    /// Clear every trace, keeping the points.
    pub fn reset(&mut self) {
        for (_, trace) in &mut self.entries {
            *trace = Trace::default();
        }
        self.last_sampled = None;
    }

    /// Names of monitored output signals and of every other output signal
    /// in the network.
    pub fn signal_names(&self, network: &Network, names: &Names) -> (Vec<String>, Vec<String>) {
        let monitored = self.points().map(|p| p.signal_name(names)).collect();
        let unmonitored = network
            .devices()
            .iter()
            .flat_map(|device| {
                device
                    .output_pins()
                    .map(|pin| MonitorPoint::new(device.name, pin))
                    .collect::<Vec<_>>()
            })
            .filter(|point| !self.contains(*point))
            .map(|point| point.signal_name(names))
            .collect();
        (monitored, unmonitored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DType, DeviceKind, DeviceType};

    fn network() -> (Names, Network) {
        let mut names = Names::new();
        let mut network = Network::new();
        network
            .add_device(
                names.lookup("S1"),
                DeviceKind::from_declaration(DeviceType::Switch, Some("1")).unwrap(),
            )
            .unwrap();
        network
            .add_device(names.lookup("D1"), DeviceKind::DType(DType::new()))
            .unwrap();
        (names, network)
    }

    fn point(names: &Names, device: &str, pin: OutputPin) -> MonitorPoint {
        MonitorPoint::new(names.query(device).unwrap(), pin)
    }

    #[test]
    fn test_add_rejections() {
        let (mut names, network) = network();
        let mut monitors = Monitors::new();
        let s1 = point(&names, "S1", OutputPin::Out);

        assert!(monitors.add(s1, &network).is_ok());
        assert_eq!(monitors.add(s1, &network), Err(MonitorError::MonitorPresent));
        assert_eq!(
            monitors.add(point(&names, "S1", OutputPin::Q), &network),
            Err(MonitorError::NotOutput)
        );
        let ghost = MonitorPoint::new(names.lookup("GHOST"), OutputPin::Out);
        assert_eq!(monitors.add(ghost, &network), Err(MonitorError::DeviceAbsent));
        assert_eq!(monitors.remove(ghost), Err(MonitorError::NotMonitored));
        assert!(monitors.remove(s1).is_ok());
        assert!(monitors.is_empty());
    }

    #[test]
    fn test_capacity() {
        let mut names = Names::new();
        let mut network = Network::new();
        let mut monitors = Monitors::new();
        for i in 0..=MAX_MONITORS {
            let name = names.lookup(&format!("S{}", i));
            network
                .add_device(name, DeviceKind::from_declaration(DeviceType::Switch, Some("0")).unwrap())
                .unwrap();
            let result = monitors.add(MonitorPoint::new(name, OutputPin::Out), &network);
            if i < MAX_MONITORS {
                assert!(result.is_ok());
            } else {
                assert_eq!(result, Err(MonitorError::Capacity { max: MAX_MONITORS }));
            }
        }
    }

    #[test]
    fn test_sampling_is_cycle_gated() {
        let (names, mut network) = network();
        let mut monitors = Monitors::new();
        let s1 = point(&names, "S1", OutputPin::Out);
        monitors.add(s1, &network).unwrap();

        monitors.sample_all(&network);
        assert_eq!(monitors.trace_of(s1).unwrap().len(), 0);

        network.advance_sequential();
        network.finish_cycle();
        monitors.sample_all(&network);
        monitors.sample_all(&network);
        assert_eq!(monitors.trace_of(s1), Some(&[Signal::High][..]));

        monitors.reset();
        assert_eq!(monitors.trace_of(s1).unwrap().len(), 0);
    }

    #[test]
    fn test_signal_names() {
        let (names, network) = network();
        let mut monitors = Monitors::new();
        monitors
            .add(point(&names, "D1", OutputPin::QBar), &network)
            .unwrap();
        let (monitored, unmonitored) = monitors.signal_names(&network, &names);
        assert_eq!(monitored, vec!["D1.QBAR"]);
        assert_eq!(unmonitored, vec!["S1", "D1.Q"]);
    }

    #[test]
    fn test_from_signal_name() {
        let (names, network) = network();
        assert_eq!(
            MonitorPoint::from_signal_name("D1.Q", &names, &network),
            Some(point(&names, "D1", OutputPin::Q))
        );
        assert_eq!(
            MonitorPoint::from_signal_name("S1", &names, &network),
            Some(point(&names, "S1", OutputPin::Out))
        );
        assert_eq!(MonitorPoint::from_signal_name("D1", &names, &network), None);
        assert_eq!(MonitorPoint::from_signal_name("D1.CLK", &names, &network), None);
        assert_eq!(MonitorPoint::from_signal_name("X9", &names, &network), None);
    }
}
