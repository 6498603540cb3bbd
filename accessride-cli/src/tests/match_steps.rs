//! Behaviour-driven step definitions driving the matching CLI scenarios.

use super::helpers::{
    LEICESTER_SQUARE, Workspace, london_driver, wheelchair_booking, write_json, write_utf8,
};
use super::*;
use crate::matching::{BookingQuery, DriverQuery};
use accessride_core::{Booking, Driver, LatLng, LoadingSide, MatchResult, VehicleClass};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

/// Scenario state shared by every step.
#[derive(Debug)]
struct MatchWorld {
    _workspace: Workspace,
    query_path: Utf8PathBuf,
    include_query: RefCell<bool>,
    extra_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl MatchWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let query_path = workspace.path("query.json");
        Self {
            _workspace: workspace,
            query_path,
            include_query: RefCell::new(true),
            extra_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn run(&self, subcommand: &str) {
        let mut argv = vec!["accessride".to_owned(), subcommand.to_owned()];
        if *self.include_query.borrow() {
            argv.push(self.query_path.as_str().to_owned());
        }
        argv.extend(self.extra_args.borrow().iter().cloned());
        let mut buffer = self.stdout.borrow_mut();
        let outcome = run_with(argv, &mut *buffer);
        self.result.replace(Some(outcome));
    }

    fn assert_succeeded(&self) -> String {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    fn with_error(&self, check: impl FnOnce(&CliError)) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error);
    }
}

#[fixture]
fn world() -> MatchWorld {
    MatchWorld::new()
}

#[given("a driver query with one reachable and one distant booking")]
fn driver_query(#[from(world)] world: &MatchWorld) {
    let glasgow = Booking::new(2)
        .with_pickup_location(LatLng {
            lat: 55.8642,
            lng: -4.2518,
        })
        .with_ambulatory_passengers(1);
    let nearby = Booking::new(1)
        .with_pickup_location(LEICESTER_SQUARE)
        .with_ambulatory_passengers(3);
    write_json(
        &world.query_path,
        &DriverQuery {
            driver: london_driver(11, VehicleClass::LargeCar),
            bookings: vec![glasgow, nearby],
        },
    );
}

#[given("a booking query for a wheelchair user with a car and a WAV driver")]
fn wheelchair_query(#[from(world)] world: &MatchWorld) {
    write_json(
        &world.query_path,
        &BookingQuery {
            booking: wheelchair_booking(20),
            drivers: vec![
                london_driver(1, VehicleClass::StandardCar),
                london_driver(2, VehicleClass::RearLoadingWav),
            ],
        },
    );
}

#[given("a booking query preferring rear loading with a side-loading WAV driver")]
fn rear_loading_query(#[from(world)] world: &MatchWorld) {
    write_json(
        &world.query_path,
        &BookingQuery {
            booking: wheelchair_booking(21).with_loading_side(LoadingSide::Rear),
            drivers: vec![london_driver(3, VehicleClass::SideLoadingWav)],
        },
    );
}

#[given("the query file contains invalid JSON")]
fn invalid_json(#[from(world)] world: &MatchWorld) {
    write_utf8(&world.query_path, b"{ not valid json");
}

#[given("I omit the query path")]
fn omit_query(#[from(world)] world: &MatchWorld) {
    *world.include_query.borrow_mut() = false;
}

#[given("I request an explanation")]
fn request_explanation(#[from(world)] world: &MatchWorld) {
    world
        .extra_args
        .borrow_mut()
        .push(format!("--{ARG_EXPLAIN}"));
}

#[given("I set the loading side policy to preferred")]
fn loading_side_preferred(#[from(world)] world: &MatchWorld) {
    world
        .extra_args
        .borrow_mut()
        .extend([format!("--{ARG_LOADING_SIDE}"), "preferred".to_owned()]);
}

#[when("I run the match-driver command")]
fn run_match_driver(#[from(world)] world: &MatchWorld) {
    world.run("match-driver");
}

#[when("I run the match-booking command")]
fn run_match_booking(#[from(world)] world: &MatchWorld) {
    world.run("match-booking");
}

#[then("the command succeeds and ranks only the reachable booking")]
fn ranks_reachable(#[from(world)] world: &MatchWorld) {
    let stdout = world.assert_succeeded();
    let ranked: Vec<MatchResult<Booking>> =
        serde_json::from_str(&stdout).expect("output should be ranked JSON");
    let ids: Vec<u64> = ranked.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![1]);
}

#[then("the command succeeds and explains both drivers")]
fn explains_both(#[from(world)] world: &MatchWorld) {
    let stdout = world.assert_succeeded();
    let payload: Value = serde_json::from_str(&stdout).expect("output should be JSON");
    let eligible: Vec<Option<bool>> = payload
        .as_array()
        .expect("verdict array")
        .iter()
        .map(|verdict| verdict.get("eligible").and_then(Value::as_bool))
        .collect();
    assert_eq!(eligible, vec![Some(false), Some(true)]);
}

#[then("the command succeeds and ranks the side-loading driver")]
fn ranks_side_loader(#[from(world)] world: &MatchWorld) {
    let stdout = world.assert_succeeded();
    let ranked: Vec<MatchResult<Driver>> =
        serde_json::from_str(&stdout).expect("output should be ranked JSON");
    let ids: Vec<u64> = ranked.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![3]);
    let bonus = ranked.first().map(|r| r.score_breakdown.vehicle_fit);
    assert_eq!(bonus, Some(5));
}

#[then("the command fails because the query JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &MatchWorld) {
    world.with_error(|error| match error {
        CliError::ParseInput { .. } => {}
        other => panic!("expected ParseInput, found {other:?}"),
    });
}

#[then("the command fails because the query path is missing")]
fn fails_missing_path(#[from(world)] world: &MatchWorld) {
    world.with_error(|error| match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_INPUT),
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

macro_rules! register_match_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/match_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: MatchWorld) {
            let _ = world;
        }
    };
}

register_match_scenario!(match_driver_happy_path, "ranking bookings for a driver");
register_match_scenario!(
    match_booking_explain,
    "explaining drivers for a wheelchair booking"
);
register_match_scenario!(relaxed_loading_side, "relaxing the loading side");
register_match_scenario!(invalid_query_json, "rejecting invalid JSON input");
register_match_scenario!(missing_query_path, "rejecting a missing query path");
