//! Text output for the CLI frontend.
//!
//! Renders monitor traces as one waveform line per signal, and diagnostics
//! with the offending source line.

use std::io::Write;

use crate::dsl::Diagnostic;
use crate::engine::Simulator;
use crate::error::{LogsimError, Result};
use crate::monitors::Trace;

/// Mark for a HIGH sample.
pub const HIGH_MARK: char = '-';

/// Mark for a LOW sample.
pub const LOW_MARK: char = '_';

/// Draw a trace, padding with blanks for the cycles that ran before the
/// signal was monitored.
pub fn waveform(trace: &Trace) -> String {
    let padding = std::iter::repeat(' ').take(trace.start_cycle() as usize);
    let marks = trace
        .samples()
        .iter()
        .map(|signal| if signal.is_high() { HIGH_MARK } else { LOW_MARK });
    padding.chain(marks).collect()
}

/// All monitored signals, in the order they were added, with names padded
/// to a common width.
pub fn render_traces(simulator: &Simulator) -> String {
    let names = simulator.names();
    let rows: Vec<(String, String)> = simulator
        .monitors()
        .traces()
        .map(|(point, trace)| (point.signal_name(names), waveform(trace)))
        .collect();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, wave) in rows {
        out.push_str(&format!("{:<width$} : {}\n", name, wave, width = width));
    }
    out
}

/// Write traces after a run.
pub fn print_traces(simulator: &Simulator, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", render_traces(simulator)).map_err(|e| LogsimError::OutputError {
        message: e.to_string(),
    })
}

/// Write every diagnostic with its source line and caret.
pub fn print_diagnostics(
    diagnostics: &[Diagnostic],
    source: &str,
    out: &mut impl Write,
) -> Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{}", diagnostic.render(source)).map_err(|e| LogsimError::OutputError {
            message: e.to_string(),
        })?;
    }
    Ok(())
}
