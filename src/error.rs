//! Error types for the logic simulator.
//!
//! Definition problems (syntax and semantic errors) are not raised: the
//! parser collects them as [`Diagnostic`](crate::dsl::Diagnostic) values.
//! This module provides the error values that *are* returned:
//!
//! - [`LogsimError`] for crate-level operations (reading files, driving the
//!   simulator, shell-facing lookups)
//! - [`NetworkError`] for device construction and connection rejections
//! - [`MonitorError`] for monitor point rejections
//!
//! The parser turns the latter two into semantic diagnostics.

use thiserror::Error;

/// Result type alias using [`LogsimError`].
pub type Result<T> = std::result::Result<T, LogsimError>;

/// Unified error type for crate-level operations.
#[derive(Error, Debug)]
pub enum LogsimError {
    // ============ Definition Errors ============
    /// Error reading a definition file
    #[error("Failed to read definition file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The definition produced error diagnostics and cannot be simulated
    #[error("Definition has {errors} error(s) and cannot be simulated")]
    InvalidDefinition { errors: usize },

    // ============ Simulation Errors ============
    /// Combinational evaluation did not reach a fixpoint within one cycle
    #[error("Network did not settle in cycle {cycle} within {passes} passes")]
    ConvergenceFailure { cycle: u64, passes: usize },

    /// A signal name given by the caller does not resolve
    #[error("Unknown signal '{signal}'")]
    UnknownSignal { signal: String },

    /// A network operation requested by the caller was rejected
    #[error("Cannot apply to '{signal}': {source}")]
    Network {
        signal: String,
        #[source]
        source: NetworkError,
    },

    /// A monitor operation requested by the caller was rejected
    #[error("Cannot monitor '{signal}': {source}")]
    Monitor {
        signal: String,
        #[source]
        source: MonitorError,
    },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ Output Errors ============
    /// Error writing traces or installing the logger
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl LogsimError {
    /// Create a convergence failure error
    pub fn convergence_failure(cycle: u64, passes: usize) -> Self {
        Self::ConvergenceFailure { cycle, passes }
    }

    /// Create an unknown signal error
    pub fn unknown_signal(signal: impl Into<String>) -> Self {
        Self::UnknownSignal {
            signal: signal.into(),
        }
    }

    /// Check whether this is a per-cycle convergence failure.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, Self::ConvergenceFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_failure_message() {
        let err = LogsimError::convergence_failure(3, 20);
        assert!(err.is_convergence_failure());
        assert_eq!(err.to_string(), "Network did not settle in cycle 3 within 20 passes");
    }
}

/// Rejection of a device declaration or a connection.
///
/// Messages are phrased without the device name; callers prefix the
/// reference they were resolving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    // ============ Device Construction ============
    /// A device with this name already exists
    #[error("device is already declared")]
    DevicePresent,

    /// Required qualifier missing from a device declaration
    #[error("expected {expected}")]
    MissingQualifier { expected: &'static str },

    /// Gate input count outside the supported range
    #[error("number of inputs must be between 1 and {max}, got {arity}")]
    InvalidArity { arity: u64, max: usize },

    /// Switch initial state other than 0 or 1
    #[error("switch state must be a bit (0 or 1)")]
    InvalidBit,

    /// Clock half-period of zero
    #[error("clock half-period must be at least 1")]
    ZeroHalfPeriod,

    /// Signal generator waveform containing something other than bits
    #[error("signal generator waveform must consist of 0 and 1 bits only")]
    InvalidWaveform,

    /// Qualifier given to a device kind that takes none
    #[error("{kind} devices take no qualifier")]
    UnexpectedQualifier { kind: &'static str },

    // ============ Connections ============
    /// Reference to an undeclared device
    #[error("device is not declared")]
    DeviceAbsent,

    /// Reference to a pin the device does not have
    #[error("device has no such pin")]
    PortAbsent,

    /// Pin name omitted on a device with several pins of that direction
    #[error("device has several pins here; name one with '.'")]
    PinRequired,

    /// Connection into a device that has no inputs
    #[error("device has no inputs to connect to")]
    NoInputs,

    /// An input pin used as a connection source
    #[error("an input pin cannot drive a connection")]
    InputToInput,

    /// An output pin used as a connection destination
    #[error("an output pin cannot be driven by a connection")]
    OutputToOutput,

    /// Input pin already bound to a driver
    #[error("input is already connected")]
    InputConnected,

    // ============ Runtime ============
    /// Switch operation on a device that is not a switch
    #[error("device is not a switch")]
    NotASwitch,
}

/// Rejection of a monitor operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Monitor point names an undeclared device
    #[error("device is not declared")]
    DeviceAbsent,

    /// Monitor point names a pin that is not an output of the device
    #[error("only output pins can be monitored")]
    NotOutput,

    /// Monitor point already registered
    #[error("signal is already monitored")]
    MonitorPresent,

    /// Too many simultaneous monitor points
    #[error("at most {max} signals can be monitored")]
    Capacity { max: usize },

    /// Removal of a point that was never added
    #[error("signal is not monitored")]
    NotMonitored,
}
