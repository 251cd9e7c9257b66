//! Front end for the logic definition language.
//!
//! A definition lists devices, the wires between them and the signals to
//! record, in three sections closed by `END`.
//!
//! # Grammar Overview
//!
//! ```text
//! definition  = devices [ connect ] [ monitor ] "END"
//! devices     = "DEVICES" device { "," device } ";"
//! connect     = "CONNECT" [ connection { "," connection } ] ";"
//! monitor     = "MONITOR" [ signal { "," signal } ] ";"
//!
//! device      = name ":" kind [ number ]
//! connection  = signal ">" signal
//! signal      = name [ "." pin ]
//!
//! kind        = "SWITCH" | "CLOCK" | "SIGGEN" | "AND" | "OR" | "NAND"
//!             | "NOR" | "XOR" | "NOT" | "DTYPE"
//! pin         = "I1" .. "I16" | "DATA" | "CLK" | "SET" | "CLEAR" | "Q" | "QBAR"
//! name        = letter { letter | digit }
//! number      = digit { digit }
//! ```
//!
//! Whitespace is insignificant. `#` starts a comment running to the end of
//! the line and `/* ... */` encloses a block comment.
//!
//! # Device Kinds
//!
//! | Kind | Qualifier | Inputs | Outputs |
//! |------|-----------|--------|---------|
//! | SWITCH | initial state `0` or `1` | none | one |
//! | CLOCK | half-period in cycles, at least 1 | none | one |
//! | SIGGEN | waveform of bits, e.g. `0011` | none | one |
//! | AND, OR, NAND, NOR | number of inputs, 1 to 16 | `I1`..`In` | one |
//! | XOR | none | `I1`, `I2` | one |
//! | NOT | none | `I1` | one |
//! | DTYPE | none | `DATA`, `CLK`, `SET`, `CLEAR` | `Q`, `QBAR` |
//!
//! A pin name may be left out when the device has exactly one pin of the
//! direction being referenced.
//!
//! # Example
//!
//! ```text
//! # Divide a clock by two
//! DEVICES C1:CLOCK 1, D1:DTYPE, S1:SWITCH 0;
//! CONNECT C1 > D1.CLK, D1.QBAR > D1.DATA, S1 > D1.SET, S1 > D1.CLEAR;
//! MONITOR C1, D1.Q;
//! END
//! ```

mod diagnostic;
mod lexer;
mod parser;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use lexer::{Keyword, Position, Scanner, Token, TokenKind};
pub use parser::Parser;

use crate::engine::{Simulator, SimulatorConfig};
use crate::error::{LogsimError, Result};
use crate::monitors::Monitors;
use crate::names::Names;
use crate::network::{check_network, Network};

/// Everything read from a definition: the symbol table, the network, the
/// requested monitors and every diagnostic found along the way.
#[derive(Debug)]
pub struct Definition {
    pub names: Names,
    pub network: Network,
    pub monitors: Monitors,
    pub diagnostics: Vec<Diagnostic>,
}

impl Definition {
    /// Whether any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Hand the network to a simulator. Refused if the definition has errors.
    pub fn into_simulator(self, config: SimulatorConfig) -> Result<Simulator> {
        config.validate()?;
        if self.has_errors() {
            return Err(LogsimError::InvalidDefinition {
                errors: self.error_count(),
            });
        }
        debug_assert!(check_network(&self.network));
        Ok(Simulator::with_config(
            self.names,
            self.network,
            self.monitors,
            config,
        ))
    }
}

/// Parse a definition string.
pub fn parse(input: &str) -> Definition {
    Parser::new(Scanner::new(input)).parse()
}

/// Read and parse a definition file, returning the source text alongside
/// the result so diagnostics can be rendered against it.
pub fn parse_file(path: &std::path::Path) -> Result<(String, Definition)> {
    let content = std::fs::read_to_string(path).map_err(|e| LogsimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let definition = parse(&content);
    Ok((content, definition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_simulator_refuses_errors() {
        let definition = parse("DEVICES N1:NOT; END");
        assert_eq!(definition.error_count(), 1);
        assert!(matches!(
            definition.into_simulator(SimulatorConfig::default()),
            Err(LogsimError::InvalidDefinition { errors: 1 })
        ));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let definition = parse("DEVICES S1:SWITCH 0; END");
        assert_eq!(definition.warnings().count(), 1);
        assert!(definition.into_simulator(SimulatorConfig::default()).is_ok());
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(std::path::Path::new("/nonexistent/definition.txt"));
        assert!(matches!(result, Err(LogsimError::FileReadError { .. })));
    }
}
