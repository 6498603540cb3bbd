//! Entry point for the `accessride` command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use accessride_cli::CliError;
use env_logger::Env;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    match accessride_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "the final error is reported after the logger may be filtered off"
)]
fn report(err: &CliError) {
    eprintln!("accessride: {err}");
}
