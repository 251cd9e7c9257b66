//! Logsim - Digital Logic Simulator
//!
//! Reads a logic definition, reports any problems with it, runs it for a
//! number of cycles and prints the monitored signals as text waveforms.
//!
//! # Usage
//!
//! ```bash
//! logsim counter.def -n 16 --set S1=1
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use logsim_core::{dsl, report, LogsimError, Result, SimulatorConfig, DEFAULT_MAX_PASSES};

/// Cycle-based digital logic simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the logic definition file
    #[arg(value_name = "DEFINITION_FILE")]
    definition_file: PathBuf,

    /// Number of cycles to run
    #[arg(short = 'n', long, default_value_t = 10)]
    cycles: u64,

    /// Set a switch before running, e.g. `--set S1=1` (repeatable)
    #[arg(long = "set", value_name = "NAME=0|1", value_parser = parse_switch)]
    switches: Vec<(String, bool)>,

    /// Maximum propagation passes per cycle
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    max_passes: usize,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_switch(text: &str) -> std::result::Result<(String, bool), String> {
    let (name, state) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=0|1, got '{}'", text))?;
    match state {
        "0" => Ok((name.to_string(), false)),
        "1" => Ok((name.to_string(), true)),
        _ => Err(format!("switch state must be 0 or 1, got '{}'", state)),
    }
}

fn setup_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .map_err(|e| LogsimError::OutputError {
            message: e.to_string(),
        })
}

fn simulate(args: &Args) -> Result<bool> {
    let (source, definition) = dsl::parse_file(&args.definition_file)?;

    report::print_diagnostics(&definition.diagnostics, &source, &mut io::stderr())?;
    if definition.has_errors() {
        eprintln!("{} error(s); not simulating", definition.error_count());
        return Ok(false);
    }

    let config = SimulatorConfig::new().with_max_passes(args.max_passes);
    let mut simulator = definition.into_simulator(config)?;
    for (name, state) in &args.switches {
        simulator.set_switch(name, *state)?;
    }

    // Traces recorded before a failed cycle are still worth showing
    let outcome = simulator.run(args.cycles);
    report::print_traces(&simulator, &mut io::stdout())?;
    outcome?;
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match simulate(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
