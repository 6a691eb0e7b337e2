//! Roster generator CLI.
//!
//! This binary loads settings from flags and `ROSTER_*` environment variables
//! and delegates to `synthetic_roster::roster_cli`, keeping the generation
//! flow testable without spawning a process. Logs are emitted as JSON on
//! stderr and as plain text under `LOG_DIR`; the success line goes to stdout.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use synthetic_roster::roster_cli::{
    CliError, LogFiles, RosterSettings, init_tracing, run, success_message,
};

fn main() -> ExitCode {
    init_tracing(&LogFiles::from_env());
    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "roster generation failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn execute() -> Result<(), CliError> {
    let settings =
        RosterSettings::load_from_iter(env::args_os()).map_err(|err| CliError::SettingsError {
            message: err.to_string(),
        })?;
    let outcome = run(&settings)?;
    write_success(&success_message(&outcome));
    Ok(())
}

fn write_success(message: &str) {
    if let Err(err) = writeln!(io::stdout().lock(), "{message}") {
        drop(err);
    }
}
