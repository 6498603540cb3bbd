//! `match-driver` and `match-booking` command implementation.

use std::io::{BufReader, Write};
use std::sync::Arc;

use accessride_core::{
    Booking, CapabilityEntry, CapabilityTable, Driver, Evaluation, FilterKind, FilterOutcome,
    LoadingSidePolicy, MatchConfig, MatchEngine, Matcher,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_CAPABILITY_TABLE, ARG_DEFAULT_SERVICE_RADIUS, ARG_EXPLAIN, ARG_INPUT, ARG_LOADING_SIDE,
    CliError, ENV_INPUT,
};

/// Which way a query ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// One driver, many bookings.
    DriverToBookings,
    /// One booking, many drivers.
    BookingToDrivers,
}

/// CLI arguments shared by both matching subcommands.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "match",
    long_about = "Load a JSON query from disk and print the ranked matches as \
                 JSON. Engine options can come from CLI flags, configuration \
                 files, or ACCESSRIDE_* environment variables."
)]
#[ortho_config(prefix = "ACCESSRIDE")]
pub(crate) struct MatchArgs {
    /// Path to the JSON query.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// JSON array of capability entries replacing the built-in table.
    #[arg(long = ARG_CAPABILITY_TABLE, value_name = "path")]
    #[serde(default)]
    pub(crate) capability_table: Option<Utf8PathBuf>,
    /// Service radius in miles for drivers without one of their own.
    #[arg(long = ARG_DEFAULT_SERVICE_RADIUS, value_name = "miles")]
    #[serde(default)]
    pub(crate) default_service_radius: Option<f64>,
    /// Treat a loading-side preference as `required` or `preferred`.
    #[arg(long = ARG_LOADING_SIDE, value_name = "policy")]
    #[serde(default)]
    pub(crate) loading_side: Option<LoadingSidePolicy>,
    /// Print a verdict for every candidate instead of the ranked list.
    #[arg(long = ARG_EXPLAIN)]
    #[serde(default)]
    pub(crate) explain: bool,
}

impl MatchArgs {
    pub(crate) fn into_settings(self) -> Result<MatchSettings, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatchSettings::try_from(merged)
    }
}

/// Resolved matching command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchSettings {
    /// JSON query file.
    pub(crate) input: Utf8PathBuf,
    /// Replacement capability table, if any.
    pub(crate) capability_table: Option<Utf8PathBuf>,
    /// Engine options.
    pub(crate) engine: MatchConfig,
    /// Print verdicts rather than rankings.
    pub(crate) explain: bool,
}

impl MatchSettings {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.input, ARG_INPUT)?;
        if let Some(path) = &self.capability_table {
            require_existing(path, ARG_CAPABILITY_TABLE)?;
        }
        Ok(())
    }

    fn build_matcher(&self) -> Result<Matcher, CliError> {
        let table = match &self.capability_table {
            Some(path) => load_capability_table(path)?,
            None => CapabilityTable::standard(),
        };
        Ok(Matcher::new(Arc::new(table), self.engine.clone())?)
    }
}

impl TryFrom<MatchArgs> for MatchSettings {
    type Error = CliError;

    fn try_from(args: MatchArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        let defaults = MatchConfig::default();
        let engine = MatchConfig {
            default_service_radius_miles: args
                .default_service_radius
                .unwrap_or(defaults.default_service_radius_miles),
            loading_side: args.loading_side.unwrap_or(defaults.loading_side),
            ..defaults
        };
        engine.validate()?;
        Ok(Self {
            input,
            capability_table: args.capability_table,
            engine,
            explain: args.explain,
        })
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `{ "driver": Driver, "bookings": [Booking] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct DriverQuery {
    pub(crate) driver: Driver,
    #[serde(default)]
    pub(crate) bookings: Vec<Booking>,
}

impl DriverQuery {
    fn validate(&self) -> Result<(), CliError> {
        self.driver.validate()?;
        self.bookings.iter().try_for_each(Booking::validate)?;
        Ok(())
    }
}

/// `{ "booking": Booking, "drivers": [Driver] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookingQuery {
    pub(crate) booking: Booking,
    #[serde(default)]
    pub(crate) drivers: Vec<Driver>,
}

impl BookingQuery {
    fn validate(&self) -> Result<(), CliError> {
        self.booking.validate()?;
        self.drivers.iter().try_for_each(Driver::validate)?;
        Ok(())
    }
}

/// Per-candidate verdict as printed by `--explain`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Verdict<'a, C> {
    candidate: &'a C,
    eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected_by: Option<FilterKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    filter_outcomes: &'a [FilterOutcome],
}

impl<'a, C> From<&'a Evaluation<C>> for Verdict<'a, C> {
    fn from(evaluation: &'a Evaluation<C>) -> Self {
        match evaluation {
            Evaluation::Eligible(result) => Self {
                candidate: &result.candidate,
                eligible: true,
                total_score: Some(result.total_score),
                rejected_by: None,
                reason: None,
                filter_outcomes: &result.filter_outcomes,
            },
            Evaluation::Rejected {
                candidate,
                rejection,
            } => Self {
                candidate,
                eligible: false,
                total_score: None,
                rejected_by: Some(rejection.filter),
                reason: Some(rejection.reason.to_string()),
                filter_outcomes: &rejection.outcomes,
            },
        }
    }
}

pub(super) fn run_match_with(
    direction: Direction,
    args: MatchArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let settings = resolve_settings(args)?;
    let matcher = settings.build_matcher()?;
    let payload = match direction {
        Direction::DriverToBookings => {
            let query: DriverQuery = load_json(&settings.input)?;
            query.validate()?;
            if settings.explain {
                render_verdicts(&matcher.explain_driver(&query.driver, &query.bookings))?
            } else {
                let ranked = matcher.match_driver_to_bookings(&query.driver, &query.bookings);
                debug!(
                    "ranked {} of {} bookings for driver {}",
                    ranked.len(),
                    query.bookings.len(),
                    query.driver.id
                );
                render(&ranked)?
            }
        }
        Direction::BookingToDrivers => {
            let query: BookingQuery = load_json(&settings.input)?;
            query.validate()?;
            if settings.explain {
                render_verdicts(&matcher.explain_booking(&query.booking, &query.drivers))?
            } else {
                let ranked = matcher.match_booking_to_drivers(&query.booking, &query.drivers);
                debug!(
                    "ranked {} of {} drivers for booking {}",
                    ranked.len(),
                    query.drivers.len(),
                    query.booking.id
                );
                render(&ranked)?
            }
        }
    };
    write_output(writer, &payload)
}

fn resolve_settings(args: MatchArgs) -> Result<MatchSettings, CliError> {
    let settings = args.into_settings()?;
    settings.validate_sources()?;
    Ok(settings)
}

fn load_capability_table(path: &Utf8Path) -> Result<CapabilityTable, CliError> {
    let entries: Vec<CapabilityEntry> = load_json(path)?;
    CapabilityTable::from_entries(entries).map_err(|source| CliError::InvalidCapabilityTable {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a JSON document from disk.
pub(super) fn load_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

fn render_verdicts<C: Serialize>(evaluations: &[Evaluation<C>]) -> Result<String, CliError> {
    let verdicts: Vec<Verdict<'_, C>> = evaluations.iter().map(Verdict::from).collect();
    render(&verdicts)
}

fn render<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)
}

fn write_output(writer: &mut dyn Write, payload: &str) -> Result<(), CliError> {
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn settings_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MatchSettings, CliError> {
    let merged = MatchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MatchSettings::try_from(merged)
}
