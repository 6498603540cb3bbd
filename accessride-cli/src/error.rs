//! Error types emitted by the accessride CLI.
//!
//! Every helper returns `Result<_, CliError>` and the workspace enables
//! `clippy::result_large_err`, so wrapped sources stay boxed or small.

use std::sync::Arc;

use accessride_core::{BookingError, CapabilityTableError, DriverError, MatchConfigError};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the accessride CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that could supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option that named the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option that named the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option that named the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening a JSON input failed.
    #[error("failed to open {path:?}: {source}")]
    OpenInput {
        /// File that could not be opened.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// A JSON input could not be decoded.
    #[error("failed to parse JSON at {path:?}: {source}")]
    ParseInput {
        /// File that held the bad JSON.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The capability table file describes an impossible vehicle.
    #[error("capability table in {path:?} is invalid: {source}")]
    InvalidCapabilityTable {
        /// Table file.
        path: Utf8PathBuf,
        /// First defect found.
        #[source]
        source: CapabilityTableError,
    },
    /// Engine options failed validation.
    #[error("invalid engine configuration: {0}")]
    InvalidEngineConfig(#[from] MatchConfigError),
    /// A driver record in the query failed validation.
    #[error(transparent)]
    InvalidDriver(#[from] DriverError),
    /// A booking record in the query failed validation.
    #[error(transparent)]
    InvalidBooking(#[from] BookingError),
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
