//! Command-line diagnostics for the accessride matching engine.
//!
//! `accessride match-driver <path>` ranks the bookings in a JSON query for
//! one driver; `accessride match-booking <path>` ranks drivers for one
//! booking. Both print pretty JSON, and `--explain` swaps the ranking for a
//! verdict on every candidate.
#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod matching;

pub use error::CliError;
use matching::{Direction, MatchArgs, run_match_with};

const ARG_INPUT: &str = "input";
const ARG_CAPABILITY_TABLE: &str = "capability-table";
const ARG_DEFAULT_SERVICE_RADIUS: &str = "default-service-radius";
const ARG_LOADING_SIDE: &str = "loading-side";
const ARG_EXPLAIN: &str = "explain";
const ENV_INPUT: &str = "ACCESSRIDE_CMDS_MATCH_INPUT";

/// Run the CLI with the current process arguments, printing to stdout.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, inputs or output fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

/// Run the CLI with explicit arguments, writing results to `writer`.
///
/// The first item is the program name, as with `std::env::args_os`.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, inputs or output fail.
pub fn run_with<I, T>(args: I, writer: &mut dyn Write) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    dispatch(cli.command, writer)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::MatchDriver(args) => run_match_with(Direction::DriverToBookings, args, writer),
        Command::MatchBooking(args) => run_match_with(Direction::BookingToDrivers, args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "accessride",
    about = "Offline diagnostics for the accessride matching engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the bookings in a query for its driver.
    MatchDriver(MatchArgs),
    /// Rank the drivers in a query for its booking.
    MatchBooking(MatchArgs),
}

#[cfg(test)]
mod tests;
