//! Temporary workspaces holding JSON queries for CLI tests.

use super::*;
use accessride_core::{Booking, Driver, LatLng, VehicleClass};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::TempDir;

pub(super) const CHARING_CROSS: LatLng = LatLng {
    lat: 51.5074,
    lng: -0.1278,
};

pub(super) const LEICESTER_SQUARE: LatLng = LatLng {
    lat: 51.5103,
    lng: -0.1301,
};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

pub(super) fn write_json<T: Serialize>(path: &Utf8Path, value: &T) {
    let payload = serde_json::to_vec_pretty(value).expect("serialise fixture");
    write_utf8(path, &payload);
}

pub(super) fn london_driver(id: u64, class: VehicleClass) -> Driver {
    Driver::new(id, class)
        .approved()
        .with_base_location(CHARING_CROSS)
        .with_rating(4.6)
        .with_completed_rides(80)
}

pub(super) fn wheelchair_booking(id: u64) -> Booking {
    Booking::new(id)
        .with_pickup_location(LEICESTER_SQUARE)
        .with_wheelchair_users(1)
}

/// Scratch directory that lives as long as the test.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Run the CLI in-process and return its stdout.
pub(super) fn run_capturing(argv: &[&str]) -> (Result<(), CliError>, String) {
    let mut stdout = Vec::new();
    let result = run_with(argv.iter().copied(), &mut stdout);
    let text = String::from_utf8(stdout).expect("stdout utf-8");
    (result, text)
}
