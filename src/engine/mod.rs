//! Cycle-by-cycle execution engine.
//!
//! ## Cycle Model
//!
//! One cycle is an atomic logical step:
//!
//! ```text
//! 1. snapshot device state
//! 2. sources produce this cycle's level, flip-flops publish their stored bit
//! 3. combinational devices are re-evaluated drivers first, in place,
//!    until a full pass changes nothing (the fixpoint)
//! 4. flip-flops latch against the settled inputs
//! 5. the cycle counter advances and monitors sample
//! ```
//!
//! Without feedback the fixpoint takes two passes however the network was
//! declared. Devices on feedback loops are evaluated last, in declaration
//! order.
//!
//! If step 3 has not settled after the configured number of passes the
//! snapshot is restored and the cycle reports a convergence failure; no
//! sample is recorded for it.

mod propagate;
mod simulator;

pub use propagate::{evaluation_order, settle};
pub use simulator::{Simulator, SimulatorConfig};

/// Maximum propagation passes per cycle before declaring the network
/// unstable.
pub const DEFAULT_MAX_PASSES: usize = 20;
