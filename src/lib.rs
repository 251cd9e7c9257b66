//! # Logsim Core
//!
//! A cycle-based simulator for digital logic networks.
//!
//! This library provides:
//! - A small definition language for devices, connections and monitors
//! - A parser that reports every syntax and semantic error it can find
//! - Switches, clocks, signal generators, logic gates and D-type flip-flops
//! - A cycle-by-cycle engine that settles combinational logic to a fixpoint
//! - Per-signal traces of monitored outputs
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`names`] - Interning of identifiers
//! - [`dsl`] - Scanner, parser and diagnostics for the definition language
//! - [`network`] - Network graph, pins, signals and validation
//! - [`devices`] - Device models
//! - [`engine`] - Cycle execution and the simulator facade
//! - [`monitors`] - Monitor points and their traces
//! - [`report`] - Text waveforms and diagnostics (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! logsim divider.def -n 16 --set S1=0
//! ```
//!
//! ### Library
//!
//! ```
//! use logsim_core::{dsl, SimulatorConfig};
//!
//! let definition = dsl::parse(
//!     "DEVICES S1:SWITCH 0, N1:NOT; CONNECT S1 > N1; MONITOR N1; END",
//! );
//! let mut sim = definition.into_simulator(SimulatorConfig::default()).unwrap();
//! sim.run(4).unwrap();
//! assert_eq!(sim.trace("N1").unwrap().samples().len(), 4);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmLogicSim } from 'logsim_core';
//!
//! const sim = new WasmLogicSim(definition);
//! sim.run(16);
//! ```

pub mod devices;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod monitors;
pub mod names;
pub mod network;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use dsl::{parse, Definition};
pub use engine::{Simulator, SimulatorConfig, DEFAULT_MAX_PASSES};
pub use error::{LogsimError, Result};
pub use network::Network;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLogicSim;

/// Maximum inputs of an AND, OR, NAND or NOR gate.
pub const MAX_GATE_INPUTS: usize = 16;

/// Maximum number of simultaneously monitored signals.
pub const MAX_MONITORS: usize = 16;
