//! Shared test harness modules for the accessride CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]
#![expect(clippy::expect_used, reason = "tests fail fast on setup errors")]

use super::*;

mod helpers;
mod match_steps;
