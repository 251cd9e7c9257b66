//! WASM bindings for the logic simulator.
//!
//! This module provides JavaScript-friendly bindings for driving a
//! simulation from a web page.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLogicSim } from 'logsim_core';
//!
//! await init();
//!
//! const definition = `
//!   DEVICES C1:CLOCK 1, D1:DTYPE, S1:SWITCH 0;
//!   CONNECT C1 > D1.CLK, D1.QBAR > D1.DATA, S1 > D1.SET, S1 > D1.CLEAR;
//!   MONITOR C1, D1.Q;
//!   END
//! `;
//!
//! const sim = new WasmLogicSim(definition);
//! sim.run(16);
//! for (const name of sim.monitored_signals()) {
//!   console.log(name, sim.trace(name));
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;
use crate::engine::{Simulator, SimulatorConfig};
use crate::error::LogsimError;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(error: LogsimError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// WASM-compatible logic simulator.
///
/// Wraps the native `Simulator`; signals are addressed by their text names
/// such as `N1` or `D1.QBAR`.
#[wasm_bindgen]
pub struct WasmLogicSim {
    simulator: Simulator,
}

#[wasm_bindgen]
impl WasmLogicSim {
    /// Create a new simulator from definition text.
    ///
    /// # Returns
    /// A new `WasmLogicSim`, or an error listing every diagnostic if the
    /// definition has errors.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmLogicSim, JsValue> {
        Self::with_config(source, crate::DEFAULT_MAX_PASSES)
    }

    /// Create a new simulator with a custom propagation pass limit.
    #[wasm_bindgen]
    pub fn with_config(source: &str, max_passes: usize) -> Result<WasmLogicSim, JsValue> {
        let definition = dsl::parse(source);
        if definition.has_errors() {
            let message = definition
                .diagnostics
                .iter()
                .filter(|d| d.is_error())
                .map(|d| d.render(source))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(to_js(LogsimError::WasmError { message }));
        }

        let config = SimulatorConfig::new().with_max_passes(max_passes);
        let simulator = definition.into_simulator(config).map_err(to_js)?;
        Ok(WasmLogicSim { simulator })
    }

    /// Cold-start and run `cycles` cycles, clearing previous traces.
    #[wasm_bindgen]
    pub fn run(&mut self, cycles: u32) -> Result<(), JsValue> {
        self.simulator.run(u64::from(cycles)).map_err(to_js)
    }

    /// Run `cycles` more cycles without resetting.
    #[wasm_bindgen]
    pub fn continue_run(&mut self, cycles: u32) -> Result<(), JsValue> {
        self.simulator.continue_run(u64::from(cycles)).map_err(to_js)
    }

    /// Set a switch; takes effect from the next cycle.
    #[wasm_bindgen]
    pub fn set_switch(&mut self, name: &str, state: bool) -> Result<(), JsValue> {
        self.simulator.set_switch(name, state).map_err(to_js)
    }

    /// Start monitoring a signal.
    #[wasm_bindgen]
    pub fn add_monitor(&mut self, signal: &str) -> Result<(), JsValue> {
        self.simulator.add_monitor(signal).map_err(to_js)
    }

    /// Stop monitoring a signal.
    #[wasm_bindgen]
    pub fn remove_monitor(&mut self, signal: &str) -> Result<(), JsValue> {
        self.simulator.remove_monitor(signal).map_err(to_js)
    }

    /// Samples of a monitored signal as 0/1 bytes, or `undefined` if the
    /// signal is not monitored.
    #[wasm_bindgen]
    pub fn trace(&self, signal: &str) -> Option<Vec<u8>> {
        let trace = self.simulator.trace(signal)?;
        Some(trace.samples().iter().map(|s| u8::from(s.is_high())).collect())
    }

    /// Cycle at which recording of `signal` started.
    #[wasm_bindgen]
    pub fn trace_start(&self, signal: &str) -> Option<u32> {
        let trace = self.simulator.trace(signal)?;
        Some(u32::try_from(trace.start_cycle()).unwrap_or(u32::MAX))
    }

    /// Names of monitored signals, in the order they were added.
    #[wasm_bindgen]
    pub fn monitored_signals(&self) -> Vec<JsValue> {
        let (monitored, _) = self.simulator.signal_names();
        monitored.iter().map(|name| JsValue::from_str(name)).collect()
    }

    /// Names of output signals that are not monitored.
    #[wasm_bindgen]
    pub fn unmonitored_signals(&self) -> Vec<JsValue> {
        let (_, unmonitored) = self.simulator.signal_names();
        unmonitored.iter().map(|name| JsValue::from_str(name)).collect()
    }

    /// Cycles completed since the last cold start.
    #[wasm_bindgen(getter)]
    pub fn cycle_count(&self) -> u32 {
        u32::try_from(self.simulator.cycle_count()).unwrap_or(u32::MAX)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
