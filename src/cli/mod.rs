mod aggregate;
mod args;
mod commands;
mod interrupt;

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use crate::cli::args::Cli;
use crate::error::IplistError;

pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(clap_error_exit_code(&err));
        }
    };

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

fn execute(
    Cli {
        log_level,
        config,
        command,
    }: Cli,
) -> Result<(), IplistError> {
    interrupt::install_handler()?;
    crate::logging::init(log_level.into())?;
    interrupt::ensure_not_interrupted()?;

    commands::dispatch(command, config.as_deref())
}

/// The logger may not be up yet, so failures always go straight to stderr.
#[allow(clippy::print_stderr)]
fn report_failure(err: &IplistError) -> ExitCode {
    if !matches!(err, IplistError::Interrupted) {
        eprintln!("iplist: {err}");
    }
    ExitCode::from(err.exit_code())
}

fn clap_error_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 2,
    }
}
