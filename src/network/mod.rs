//! Network representation and validation.
//!
//! This module provides the internal representation of a logic network after
//! parsing. The [`Network`] struct owns all devices and connections in a form
//! suitable for simulation, and is the only mutable owner of device state.

mod graph;
mod types;
mod validate;

pub use graph::Network;
pub use types::*;
pub use validate::{check_network, unbound_inputs};
