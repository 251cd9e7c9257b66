//! Main simulator interface.

use log::{debug, warn};

use super::{evaluation_order, settle, DEFAULT_MAX_PASSES};
use crate::error::{LogsimError, Result};
use crate::monitors::{MonitorPoint, Monitors, Trace};
use crate::names::Names;
use crate::network::{DeviceId, Network, Pin};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Maximum propagation passes per cycle.
    pub max_passes: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum propagation passes per cycle.
    ///
    /// Feedback loops that keep changing for this many passes fail to
    /// settle.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Check the configuration can run at all.
    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(LogsimError::InvalidSimulationParam {
                message: "max passes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// The logic simulator: one network, its monitors and the symbol table
/// used to address both by name.
#[derive(Debug)]
pub struct Simulator {
    names: Names,
    network: Network,
    monitors: Monitors,
    config: SimulatorConfig,
    /// Combinational devices, drivers before the devices they feed
    combinational: Vec<DeviceId>,
}

impl Simulator {
    /// Create a new simulator with default configuration.
    pub fn new(names: Names, network: Network, monitors: Monitors) -> Self {
        Self::with_config(names, network, monitors, SimulatorConfig::default())
    }

    /// Create a new simulator with custom configuration.
    pub fn with_config(
        names: Names,
        network: Network,
        monitors: Monitors,
        config: SimulatorConfig,
    ) -> Self {
        let combinational = evaluation_order(&network);
        Self {
            names,
            network,
            monitors,
            config,
            combinational,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    /// Cycles completed since the last cold start.
    pub fn cycle_count(&self) -> u64 {
        self.network.cycle()
    }

    /// Execute one cycle.
    ///
    /// On a convergence failure every device is restored to its state
    /// before the cycle, the cycle count is unchanged and no sample is
    /// recorded.
    pub fn execute_cycle(&mut self) -> Result<()> {
        let snapshot = self.network.snapshot();
        self.network.advance_sequential();

        match settle(&mut self.network, &self.combinational, self.config.max_passes) {
            Some(passes) => {
                debug!("cycle {} settled in {} pass(es)", self.network.cycle() + 1, passes);
            }
            None => {
                self.network.restore(snapshot);
                let cycle = self.network.cycle() + 1;
                warn!(
                    "cycle {} did not settle within {} passes; state rolled back",
                    cycle, self.config.max_passes
                );
                return Err(LogsimError::convergence_failure(cycle, self.config.max_passes));
            }
        }

        self.network.commit_latches();
        self.network.finish_cycle();
        self.monitors.sample_all(&self.network);
        Ok(())
    }

    /// Cold-start the network, clear every trace and execute `cycles`
    /// cycles.
    pub fn run(&mut self, cycles: u64) -> Result<()> {
        self.network.cold_start();
        self.monitors.reset();
        debug!("cold start; running {} cycle(s)", cycles);
        self.continue_run(cycles)
    }

    /// Execute `cycles` more cycles, keeping state and traces.
    ///
    /// Stops at the first cycle that fails to settle.
    pub fn continue_run(&mut self, cycles: u64) -> Result<()> {
        for _ in 0..cycles {
            self.execute_cycle()?;
        }
        Ok(())
    }

    /// Set a switch by name. Takes effect from the next cycle.
    pub fn set_switch(&mut self, name: &str, state: bool) -> Result<()> {
        let id = self
            .names
            .query(name)
            .and_then(|device| self.network.device_id(device))
            .ok_or_else(|| LogsimError::unknown_signal(name))?;
        self.network
            .set_switch(id, state)
            .map_err(|source| LogsimError::Network {
                signal: name.to_string(),
                source,
            })?;
        debug!("switch {} set to {}", name, u8::from(state));
        Ok(())
    }

    /// Start monitoring a signal such as `N1` or `D1.QBAR`.
    ///
    /// Its trace starts at the current cycle.
    pub fn add_monitor(&mut self, signal: &str) -> Result<()> {
        let point = self.resolve_signal(signal)?;
        self.monitors
            .add(point, &self.network)
            .map_err(|source| LogsimError::Monitor {
                signal: signal.to_string(),
                source,
            })
    }

    /// Stop monitoring a signal, discarding its trace.
    pub fn remove_monitor(&mut self, signal: &str) -> Result<()> {
        let point = self.resolve_signal(signal)?;
        self.monitors
            .remove(point)
            .map_err(|source| LogsimError::Monitor {
                signal: signal.to_string(),
                source,
            })
    }

    /// Names of monitored signals and of every other output signal.
    pub fn signal_names(&self) -> (Vec<String>, Vec<String>) {
        self.monitors.signal_names(&self.network, &self.names)
    }

    /// Recorded trace of a monitored signal.
    pub fn trace(&self, signal: &str) -> Option<&Trace> {
        let point = MonitorPoint::from_signal_name(signal, &self.names, &self.network)?;
        self.monitors.trace(point)
    }

    fn resolve_signal(&self, signal: &str) -> Result<MonitorPoint> {
        let (device_text, pin_text) = match signal.split_once('.') {
            Some((device, pin)) => (device, Some(pin)),
            None => (signal, None),
        };
        let device = self
            .names
            .query(device_text)
            .ok_or_else(|| LogsimError::unknown_signal(signal))?;
        let id = self
            .network
            .device_id(device)
            .ok_or_else(|| LogsimError::unknown_signal(signal))?;
        let pin = match pin_text {
            Some(text) => Some(Pin::from_name(text).ok_or_else(|| LogsimError::unknown_signal(signal))?),
            None => None,
        };
        let pin = self
            .network
            .resolve_output(id, pin)
            .map_err(|source| LogsimError::Network {
                signal: signal.to_string(),
                source,
            })?;
        Ok(MonitorPoint::new(device, pin))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::dsl::parse;
    use crate::error::{MonitorError, NetworkError};
    use crate::network::Signal;

    const H: Signal = Signal::High;
    const L: Signal = Signal::Low;

    fn simulator(source: &str) -> Simulator {
        let definition = parse(source);
        assert!(!definition.has_errors(), "{:?}", definition.diagnostics);
        definition
            .into_simulator(SimulatorConfig::default())
            .unwrap()
    }

    fn samples(sim: &Simulator, signal: &str) -> Vec<Signal> {
        sim.trace(signal).unwrap().samples().to_vec()
    }

    #[test]
    fn test_not_of_low_switch_is_high() {
        let mut sim = simulator(indoc! {"
            DEVICES S1:SWITCH 0, N1:NOT;
            CONNECT S1 > N1;
            MONITOR N1;
            END
        "});
        sim.run(1).unwrap();
        assert_eq!(samples(&sim, "N1"), vec![H]);
        assert_eq!(sim.cycle_count(), 1);
    }

    #[test]
    fn test_dtype_toggle_divides_clock() {
        let mut sim = simulator(indoc! {"
            DEVICES C1:CLOCK 1, D1:DTYPE, S0:SWITCH 0;
            CONNECT C1 > D1.CLK, D1.QBAR > D1.DATA, S0 > D1.SET, S0 > D1.CLEAR;
            MONITOR C1, D1.Q;
            END
        "});
        sim.run(8).unwrap();
        assert_eq!(samples(&sim, "C1"), vec![H, L, H, L, H, L, H, L]);
        assert!(!samples(&sim, "C1").iter().any(|s| s.is_edge()));
        // Latched on each rising edge, visible one cycle later
        assert_eq!(samples(&sim, "D1.Q"), vec![L, H, H, L, L, H, H, L]);
    }

    #[test]
    fn test_set_overrides_clock() {
        let mut sim = simulator(indoc! {"
            DEVICES C1:CLOCK 1, D1:DTYPE, S0:SWITCH 0, S1:SWITCH 1;
            CONNECT C1 > D1.CLK, S0 > D1.DATA, S1 > D1.SET, S1 > D1.CLEAR;
            MONITOR D1.Q, D1.QBAR;
            END
        "});
        sim.run(3).unwrap();
        assert_eq!(samples(&sim, "D1.Q"), vec![L, H, H]);
        assert_eq!(samples(&sim, "D1.QBAR"), vec![H, L, L]);
    }

    #[test]
    fn test_unstable_loop_rolls_back() {
        let mut sim = simulator(indoc! {"
            DEVICES S1:SWITCH 0, N1:NAND 2, A1:AND 1;
            CONNECT S1 > N1.I1, N1 > N1.I2, S1 > A1;
            MONITOR N1, A1;
            END
        "});
        sim.run(2).unwrap();
        assert_eq!(samples(&sim, "N1"), vec![H, H]);

        sim.set_switch("S1", true).unwrap();
        let err = sim.continue_run(3).unwrap_err();
        assert!(err.is_convergence_failure());
        assert!(matches!(
            err,
            LogsimError::ConvergenceFailure { cycle: 3, passes: DEFAULT_MAX_PASSES }
        ));
        assert_eq!(sim.cycle_count(), 2);
        assert_eq!(samples(&sim, "N1"), vec![H, H]);
        assert_eq!(samples(&sim, "A1"), vec![L, L]);

        // Recoverable once the loop is opened again
        sim.set_switch("S1", false).unwrap();
        sim.continue_run(1).unwrap();
        assert_eq!(samples(&sim, "N1"), vec![H, H, H]);
    }

    #[test]
    fn test_deep_chain_declared_backwards_settles() {
        let depth = 25;
        let devices: Vec<String> = (1..=depth).rev().map(|i| format!("N{}:NOT", i)).collect();
        let mut wires = vec!["S1 > N1".to_string()];
        wires.extend((1..depth).map(|i| format!("N{} > N{}", i, i + 1)));
        let source = format!(
            "DEVICES {}, S1:SWITCH 0; CONNECT {}; MONITOR N{}; END",
            devices.join(", "),
            wires.join(", "),
            depth
        );
        let mut sim = simulator(&source);
        sim.run(2).unwrap();
        assert_eq!(samples(&sim, &format!("N{}", depth)), vec![H, H]);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let source = indoc! {"
            DEVICES C1:CLOCK 2, G1:SIGGEN 0110100, X1:XOR, D1:DTYPE, S0:SWITCH 0;
            CONNECT C1 > X1.I1, G1 > X1.I2, X1 > D1.DATA, C1 > D1.CLK,
                    S0 > D1.SET, S0 > D1.CLEAR;
            MONITOR X1, D1.Q, D1.QBAR;
            END
        "};
        let mut first = simulator(source);
        let mut second = simulator(source);
        first.run(25).unwrap();
        second.run(25).unwrap();
        for signal in ["X1", "D1.Q", "D1.QBAR"] {
            assert_eq!(samples(&first, signal), samples(&second, signal));
        }

        let before = samples(&first, "D1.Q");
        first.run(25).unwrap();
        assert_eq!(samples(&first, "D1.Q"), before);
    }

    #[test]
    fn test_siggen_replays_waveform() {
        let mut sim = simulator("DEVICES G1:SIGGEN 0011; MONITOR G1; END");
        sim.run(6).unwrap();
        assert_eq!(samples(&sim, "G1"), vec![L, L, H, H, L, L]);
    }

    #[test]
    fn test_clock_half_period() {
        let mut sim = simulator("DEVICES C1:CLOCK 3; MONITOR C1; END");
        sim.run(7).unwrap();
        assert_eq!(samples(&sim, "C1"), vec![L, L, H, H, H, L, L]);
    }

    #[test]
    fn test_switch_between_runs() {
        let mut sim = simulator(indoc! {"
            DEVICES S1:SWITCH 0, S2:SWITCH 1, O1:OR 2;
            CONNECT S1 > O1.I1, S2 > O1.I2;
            MONITOR O1;
            END
        "});
        sim.run(1).unwrap();
        sim.set_switch("S2", false).unwrap();
        sim.continue_run(1).unwrap();
        sim.set_switch("S1", true).unwrap();
        sim.continue_run(1).unwrap();
        assert_eq!(samples(&sim, "O1"), vec![H, L, H]);

        // A fresh run keeps the switch settings
        sim.run(1).unwrap();
        assert_eq!(samples(&sim, "O1"), vec![H]);
        assert_eq!(sim.cycle_count(), 1);
    }

    #[test]
    fn test_set_switch_errors() {
        let mut sim = simulator("DEVICES S1:SWITCH 0, N1:NOT; CONNECT S1 > N1; MONITOR N1; END");
        assert!(matches!(
            sim.set_switch("S9", true),
            Err(LogsimError::UnknownSignal { .. })
        ));
        assert!(matches!(
            sim.set_switch("N1", true),
            Err(LogsimError::Network { source: NetworkError::NotASwitch, .. })
        ));
    }

    #[test]
    fn test_monitor_added_mid_run() {
        let mut sim = simulator("DEVICES S1:SWITCH 1, N1:NOT; CONNECT S1 > N1; MONITOR N1; END");
        sim.run(2).unwrap();
        sim.add_monitor("S1").unwrap();
        sim.continue_run(2).unwrap();

        let trace = sim.trace("S1").unwrap();
        assert_eq!(trace.start_cycle(), 2);
        assert_eq!(trace.samples(), &[H, H]);
        assert_eq!(samples(&sim, "N1"), vec![L, L, L, L]);

        assert!(matches!(
            sim.add_monitor("S1"),
            Err(LogsimError::Monitor { source: MonitorError::MonitorPresent, .. })
        ));
        sim.remove_monitor("S1").unwrap();
        assert!(sim.trace("S1").is_none());
        assert!(matches!(
            sim.remove_monitor("S1"),
            Err(LogsimError::Monitor { source: MonitorError::NotMonitored, .. })
        ));
    }

    #[test]
    fn test_monitor_name_errors() {
        let mut sim = simulator(indoc! {"
            DEVICES S1:SWITCH 0, D1:DTYPE;
            CONNECT S1 > D1.DATA, S1 > D1.CLK, S1 > D1.SET, S1 > D1.CLEAR;
            MONITOR D1.Q;
            END
        "});
        assert!(matches!(sim.add_monitor("X1"), Err(LogsimError::UnknownSignal { .. })));
        assert!(matches!(sim.add_monitor("D1.FOO"), Err(LogsimError::UnknownSignal { .. })));
        assert!(matches!(
            sim.add_monitor("D1"),
            Err(LogsimError::Network { source: NetworkError::PinRequired, .. })
        ));
        assert!(matches!(
            sim.add_monitor("D1.CLK"),
            Err(LogsimError::Network { source: NetworkError::InputToInput, .. })
        ));

        let (monitored, unmonitored) = sim.signal_names();
        assert_eq!(monitored, vec!["D1.Q"]);
        assert_eq!(unmonitored, vec!["S1", "D1.QBAR"]);
    }

    #[test]
    fn test_zero_passes_rejected() {
        let definition = parse("DEVICES S1:SWITCH 0; MONITOR S1; END");
        let result = definition.into_simulator(SimulatorConfig::new().with_max_passes(0));
        assert!(matches!(result, Err(LogsimError::InvalidSimulationParam { .. })));
    }
}
