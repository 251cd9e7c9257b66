//! Fixpoint propagation over combinational devices.

use std::collections::VecDeque;

use log::trace;

use crate::network::{DeviceId, Network};

/// Order combinational devices so that each comes after the combinational
/// devices driving it.
///
/// Devices on a feedback loop, or fed by one, cannot be ordered this way and
/// follow the rest in declaration order.
pub fn evaluation_order(network: &Network) -> Vec<DeviceId> {
    let is_combinational = |id: DeviceId| network.device(id).device_type().is_combinational();
    let combinational: Vec<DeviceId> = network.device_ids().filter(|id| is_combinational(*id)).collect();

    let mut pending = vec![0usize; network.len()];
    let mut dependents: Vec<Vec<DeviceId>> = vec![Vec::new(); network.len()];
    for &id in &combinational {
        let device = network.device(id);
        for driver in device.input_pins().filter_map(|pin| device.driver(pin)) {
            if is_combinational(driver.device) {
                pending[id.0] += 1;
                dependents[driver.device.0].push(id);
            }
        }
    }

    let mut ready: VecDeque<DeviceId> = combinational
        .iter()
        .copied()
        .filter(|id| pending[id.0] == 0)
        .collect();
    let mut order = Vec::with_capacity(combinational.len());
    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &next in &dependents[id.0] {
            pending[next.0] -= 1;
            if pending[next.0] == 0 {
                ready.push_back(next);
            }
        }
    }

    let looped = combinational.len() - order.len();
    if looped > 0 {
        trace!("{} device(s) on or behind feedback loops", looped);
    }
    order.extend(combinational.iter().copied().filter(|id| pending[id.0] > 0));
    order
}

/// Re-evaluate `combinational` devices in the given order, updating outputs
/// in place, until a whole pass changes nothing.
///
/// Returns the number of passes taken, including the final quiet one, or
/// `None` if `max_passes` passes all changed some output.
pub fn settle(network: &mut Network, combinational: &[DeviceId], max_passes: usize) -> Option<usize> {
    for pass in 1..=max_passes {
        let mut changed = false;
        for &id in combinational {
            changed |= network.update_combinational(id);
        }
        if !changed {
            trace!("settled after {} pass(es)", pass);
            return Some(pass);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceKind, DeviceType};
    use crate::names::Names;
    use crate::network::{InputPin, OutputPin, OutputRef, Signal};

    fn chain(length: usize) -> (Network, Vec<DeviceId>) {
        let mut names = Names::new();
        let mut network = Network::new();
        let switch = DeviceKind::from_declaration(DeviceType::Switch, Some("0")).unwrap();
        let mut previous = network.add_device(names.lookup("S"), switch).unwrap();
        let mut nots = Vec::new();
        for i in 0..length {
            let id = network
                .add_device(names.lookup(&format!("N{}", i)), DeviceKind::Not)
                .unwrap();
            network
                .make_connection(OutputRef::new(previous, OutputPin::Out), id, InputPin::I(1))
                .unwrap();
            nots.push(id);
            previous = id;
        }
        (network, nots)
    }

    #[test]
    fn test_forward_chain_settles_in_two_passes() {
        let (mut network, nots) = chain(4);
        assert_eq!(settle(&mut network, &nots, 20), Some(2));
        let levels: Vec<Signal> = nots
            .iter()
            .map(|id| network.output_signal(*id, OutputPin::Out).unwrap())
            .collect();
        assert_eq!(levels, vec![Signal::High, Signal::Low, Signal::High, Signal::Low]);
    }

    #[test]
    fn test_reverse_order_needs_more_passes() {
        let (mut network, mut nots) = chain(3);
        nots.reverse();
        // Each pass fixes one more stage from the switch end
        assert_eq!(settle(&mut network, &nots, 20), Some(4));
        assert_eq!(network.output_signal(nots[0], OutputPin::Out), Some(Signal::High));
    }

    #[test]
    fn test_evaluation_order_follows_wiring() {
        let mut names = Names::new();
        let mut network = Network::new();
        // Declared back to front: N3, N2, N1, then the switch feeding N1
        let nots: Vec<DeviceId> = (1..=3)
            .rev()
            .map(|i| {
                network
                    .add_device(names.lookup(&format!("N{}", i)), DeviceKind::Not)
                    .unwrap()
            })
            .collect();
        let switch = DeviceKind::from_declaration(DeviceType::Switch, Some("0")).unwrap();
        let s = network.add_device(names.lookup("S"), switch).unwrap();
        let (n3, n2, n1) = (nots[0], nots[1], nots[2]);
        for (source, destination) in [(s, n1), (n1, n2), (n2, n3)] {
            network
                .make_connection(OutputRef::new(source, OutputPin::Out), destination, InputPin::I(1))
                .unwrap();
        }

        let order = evaluation_order(&network);
        assert_eq!(order, vec![n1, n2, n3]);
        assert_eq!(settle(&mut network, &order, 20), Some(2));
        assert_eq!(network.output_signal(n3, OutputPin::Out), Some(Signal::High));
    }

    #[test]
    fn test_evaluation_order_puts_loops_last() {
        let mut names = Names::new();
        let mut network = Network::new();
        let loop_gate = network.add_device(names.lookup("N1"), DeviceKind::Not).unwrap();
        let fed = network.add_device(names.lookup("N2"), DeviceKind::Not).unwrap();
        let switch = DeviceKind::from_declaration(DeviceType::Switch, Some("1")).unwrap();
        let s = network.add_device(names.lookup("S"), switch).unwrap();
        let free = network.add_device(names.lookup("N3"), DeviceKind::Not).unwrap();
        network
            .make_connection(OutputRef::new(loop_gate, OutputPin::Out), loop_gate, InputPin::I(1))
            .unwrap();
        network
            .make_connection(OutputRef::new(loop_gate, OutputPin::Out), fed, InputPin::I(1))
            .unwrap();
        network
            .make_connection(OutputRef::new(s, OutputPin::Out), free, InputPin::I(1))
            .unwrap();

        assert_eq!(evaluation_order(&network), vec![free, loop_gate, fed]);
    }

    #[test]
    fn test_inverting_loop_never_settles() {
        let mut names = Names::new();
        let mut network = Network::new();
        let n1 = network.add_device(names.lookup("N1"), DeviceKind::Not).unwrap();
        network
            .make_connection(OutputRef::new(n1, OutputPin::Out), n1, InputPin::I(1))
            .unwrap();
        assert_eq!(settle(&mut network, &[n1], 20), None);
    }

    #[test]
    fn test_zero_passes_never_settles() {
        let (mut network, nots) = chain(1);
        assert_eq!(settle(&mut network, &nots, 0), None);
    }
}
