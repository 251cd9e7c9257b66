//! Network graph structure.

use std::collections::HashMap;

use super::types::{Connection, DeviceId, InputPin, OutputPin, OutputRef, Pin, Signal};
use crate::devices::{Device, DeviceKind, DeviceType};
use crate::error::NetworkError;
use crate::names::Name;

/// A complete logic network: devices, their connections, and the number of
/// cycles executed since the last cold start.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// All devices, in declaration order
    devices: Vec<Device>,

    /// Mapping from device names to device IDs
    device_map: HashMap<Name, DeviceId>,

    /// Every wire, in declaration order
    connections: Vec<Connection>,

    /// Completed cycles
    cycle: u64,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device. Fails without touching the network if the name is taken.
    pub fn add_device(&mut self, name: Name, kind: DeviceKind) -> Result<DeviceId, NetworkError> {
        if self.device_map.contains_key(&name) {
            return Err(NetworkError::DevicePresent);
        }
        let id = DeviceId(self.devices.len());
        self.devices.push(Device::new(name, kind));
        self.device_map.insert(name, id);
        Ok(id)
    }

    /// Find a device ID by name.
    pub fn device_id(&self, name: Name) -> Option<DeviceId> {
        self.device_map.get(&name).copied()
    }

    pub fn device(&self, id: DeviceId) -> &Device {
        &self.devices[id.0]
    }

    pub fn device_by_name(&self, name: Name) -> Option<&Device> {
        self.device_id(name).map(|id| self.device(id))
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> {
        (0..self.devices.len()).map(DeviceId)
    }

    /// IDs of all devices of one type.
    pub fn find_devices(&self, device_type: DeviceType) -> Vec<DeviceId> {
        self.device_ids()
            .filter(|id| self.device(*id).device_type() == device_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of input pins driven by any output of `id`.
    pub fn fanout(&self, id: DeviceId) -> usize {
        self.connections
            .iter()
            .filter(|c| c.source.device == id)
            .count()
    }

    /// Resolve a source pin reference (`pin` is `None` when the reference
    /// had no `.pin` part).
    pub fn resolve_output(&self, id: DeviceId, pin: Option<Pin>) -> Result<OutputPin, NetworkError> {
        let device = self.device(id);
        match pin {
            None => device.sole_output().ok_or(NetworkError::PinRequired),
            Some(Pin::Output(pin)) if device.has_output(pin) => Ok(pin),
            Some(Pin::Input(pin)) if device.has_input(pin) => Err(NetworkError::InputToInput),
            Some(_) => Err(NetworkError::PortAbsent),
        }
    }

    /// Resolve a destination pin reference.
    pub fn resolve_input(&self, id: DeviceId, pin: Option<Pin>) -> Result<InputPin, NetworkError> {
        let device = self.device(id);
        if device.input_pins().next().is_none() {
            return Err(NetworkError::NoInputs);
        }
        match pin {
            None => device.sole_input().ok_or(NetworkError::PinRequired),
            Some(Pin::Input(pin)) if device.has_input(pin) => Ok(pin),
            Some(Pin::Output(pin)) if device.has_output(pin) => Err(NetworkError::OutputToOutput),
            Some(_) => Err(NetworkError::PortAbsent),
        }
    }

    /// Wire `source` into `pin` of device `id`.
    ///
    /// Fails without touching the network if either end is invalid or the
    /// input already has a driver.
    pub fn make_connection(
        &mut self,
        source: OutputRef,
        id: DeviceId,
        pin: InputPin,
    ) -> Result<(), NetworkError> {
        if source.device.0 >= self.devices.len() || id.0 >= self.devices.len() {
            return Err(NetworkError::DeviceAbsent);
        }
        if !self.device(source.device).has_output(source.pin) {
            return Err(NetworkError::PortAbsent);
        }
        self.devices[id.0].bind(pin, source)?;
        self.connections.push(Connection {
            source,
            device: id,
            pin,
        });
        Ok(())
    }

    /// Current value of an output pin.
    pub fn output_signal(&self, id: DeviceId, pin: OutputPin) -> Option<Signal> {
        self.devices.get(id.0)?.output(pin)
    }

    /// Value currently presented to an input pin by its driver.
    ///
    /// An unbound input reads LOW; validated networks have none.
    pub fn input_signal(&self, id: DeviceId, pin: InputPin) -> Signal {
        self.device(id)
            .driver(pin)
            .and_then(|driver| self.output_signal(driver.device, driver.pin))
            .unwrap_or_default()
    }

    /// Set the stored state of a switch; takes effect from the next cycle.
    pub fn set_switch(&mut self, id: DeviceId, state: bool) -> Result<(), NetworkError> {
        match &mut self.devices[id.0].kind {
            DeviceKind::Switch(switch) => {
                switch.set(state);
                Ok(())
            }
            _ => Err(NetworkError::NotASwitch),
        }
    }

    /// Completed cycles since the last cold start.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Return every device to its power-on state and the cycle count to zero.
    pub fn cold_start(&mut self) {
        for device in &mut self.devices {
            device.cold_start();
        }
        self.cycle = 0;
    }

    /// Copy of all device state, for rolling back a failed cycle.
    pub(crate) fn snapshot(&self) -> Vec<Device> {
        self.devices.clone()
    }

    pub(crate) fn restore(&mut self, devices: Vec<Device>) {
        debug_assert_eq!(devices.len(), self.devices.len());
        self.devices = devices;
    }

    /// Start-of-cycle step for sources and flip-flops.
    pub(crate) fn advance_sequential(&mut self) {
        for device in &mut self.devices {
            device.advance();
        }
    }

    /// Recompute one combinational device from its current inputs,
    /// returning whether its output changed.
    pub(crate) fn update_combinational(&mut self, id: DeviceId) -> bool {
        let next = self.device(id).evaluate(|pin| self.input_signal(id, pin));
        match next {
            Some(next) => self.devices[id.0].set_output(OutputPin::Out, next),
            None => false,
        }
    }

    /// Commit every flip-flop against this cycle's stable inputs.
    pub(crate) fn commit_latches(&mut self) {
        for id in self.find_devices(DeviceType::Dtype) {
            let data = self.input_signal(id, InputPin::Data).is_high();
            let clk = self.input_signal(id, InputPin::Clk).is_high();
            let set = self.input_signal(id, InputPin::Set).is_high();
            let clear = self.input_signal(id, InputPin::Clear).is_high();
            self.devices[id.0].latch(data, clk, set, clear);
        }
    }

    pub(crate) fn finish_cycle(&mut self) {
        self.cycle += 1;
    }
}
