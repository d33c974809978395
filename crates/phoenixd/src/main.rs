//! Entry point for the `phoenixd` binary.

use std::io::{self, Write};
use std::process::ExitCode;

use phoenixd::{LaunchError, run_server};

const MAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::main");

fn main() -> ExitCode {
    match run_server() {
        Ok(_) => ExitCode::SUCCESS,
        Err(LaunchError::Config { source }) => {
            // Help, version, and usage errors are rendered by clap.
            if let Err(error) = source.print() {
                report(&format!("{source} ({error})"));
            }
            if source.is_informational() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            tracing::error!(
                target: MAIN_TARGET,
                error = %error,
                "FATAL: server terminated"
            );
            if !tracing::dispatcher::has_been_set() {
                report(&format!("FATAL: {error}"));
            }
            ExitCode::FAILURE
        }
    }
}

/// Last-resort report for failures that happen before telemetry is up.
fn report(message: &str) {
    // Nothing is left to tell if stderr itself is gone.
    write_report(&mut io::stderr().lock(), message).unwrap_or_default();
}

fn write_report(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}: {message}", env!("CARGO_BIN_NAME"))?;
    out.flush()
}
