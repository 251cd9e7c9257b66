//! Network validation.

use super::{DeviceId, InputPin, Network};

/// Every input pin that has no driver, in declaration order.
pub fn unbound_inputs(network: &Network) -> Vec<(DeviceId, InputPin)> {
    network
        .device_ids()
        .flat_map(|id| {
            network
                .device(id)
                .unbound_inputs()
                .map(move |pin| (id, pin))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Validate a network for simulation.
///
/// Checks:
/// - The network has at least one device
/// - Every input pin is bound to exactly one driver
pub fn check_network(network: &Network) -> bool {
    !network.is_empty() && unbound_inputs(network).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DType, DeviceKind};
    use crate::names::Names;
    use crate::network::{OutputPin, OutputRef};

    #[test]
    fn test_empty_network_is_invalid() {
        assert!(!check_network(&Network::new()));
    }

    #[test]
    fn test_reports_each_unbound_pin() {
        let mut names = Names::new();
        let mut network = Network::new();
        let clock = DeviceKind::from_declaration(crate::devices::DeviceType::Clock, Some("2")).unwrap();
        let c1 = network.add_device(names.lookup("C1"), clock).unwrap();
        let d1 = network
            .add_device(names.lookup("D1"), DeviceKind::DType(DType::new()))
            .unwrap();
        network
            .make_connection(OutputRef::new(c1, OutputPin::Out), d1, InputPin::Clk)
            .unwrap();

        assert_eq!(
            unbound_inputs(&network),
            vec![(d1, InputPin::Data), (d1, InputPin::Set), (d1, InputPin::Clear)]
        );
        assert!(!check_network(&network));
    }
}
