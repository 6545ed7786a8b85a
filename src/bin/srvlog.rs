#![deny(unsafe_code)]

#[path = "cli.rs"]
mod cli;

use std::sync::Arc;
use std::{env, process::ExitCode};

use logging::StderrWarnings;
use logging_sink::StreamTarget;

fn main() -> ExitCode {
    cli::run_with(
        env::args_os(),
        StreamTarget::Stdout.open(),
        StreamTarget::Stderr.open(),
        Arc::new(StderrWarnings),
    )
}
