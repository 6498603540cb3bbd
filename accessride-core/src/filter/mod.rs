//! Hard eligibility filters.
//!
//! Filters run in a fixed order, cheapest and most discriminating first:
//! approval, vehicle fit, gender, service area. The first failure ends the
//! run. Failing is not an error; the [`Rejection`] exists so callers can log
//! or explain why a pairing was dropped.

mod approval;
mod gender;
mod service_area;
mod vehicle_fit;

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::config::MatchConfig;
use crate::distance::DistanceSource;
use crate::driver::Driver;
use crate::vehicle::{CapabilityTable, LoadingSide, LoadingType, VehicleCapability};

/// Identifies one hard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Driver is approved and not suspended.
    Approval,
    /// Vehicle capability covers the accessibility profile.
    VehicleFit,
    /// Female-driver requirement, when the booking sets one.
    Gender,
    /// Pickup lies within the driver's service radius.
    ServiceArea,
}

impl FilterKind {
    /// Every filter in evaluation order.
    pub const ORDER: [Self; 4] = [
        Self::Approval,
        Self::VehicleFit,
        Self::Gender,
        Self::ServiceArea,
    ];

    /// Return the camel-case name used in serialised outcomes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approval => "approval",
            Self::VehicleFit => "vehicleFit",
            Self::Gender => "gender",
            Self::ServiceArea => "serviceArea",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a filter rejected a pairing.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Driver has not been approved.
    NotApproved,
    /// Driver is suspended.
    Suspended,
    /// The driver's class is missing from the capability table.
    UnknownVehicleClass {
        /// Class name as recorded on the driver.
        name: String,
    },
    /// Wheelchairs travel but the vehicle is not accessible.
    NoWheelchairAccess,
    /// More wheelchairs than the vehicle can secure.
    WheelchairCapacityExceeded {
        /// Wheelchairs travelling.
        demand: u32,
        /// Wheelchair spaces available.
        capacity: u32,
    },
    /// Booking needs a double WAV and the vehicle is not one.
    DoubleWavRequired,
    /// Vehicle does not load from the requested side.
    LoadingSideMismatch {
        /// Side the booking asked for.
        wanted: LoadingSide,
        /// What the vehicle offers.
        available: LoadingType,
    },
    /// More passengers than seats.
    PassengerCapacityExceeded {
        /// Everyone travelling.
        passengers: u32,
        /// Seats available.
        capacity: u32,
    },
    /// A scooter travels and the vehicle has neither ramp nor boot space.
    ScooterStorage,
    /// Booking requires a female driver.
    FemaleDriverRequired,
    /// Pickup lies beyond the service radius.
    OutsideServiceArea {
        /// Driver base to pickup, in miles.
        distance_miles: f64,
        /// Radius applied, in miles.
        radius_miles: f64,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApproved => f.write_str("not approved"),
            Self::Suspended => f.write_str("suspended"),
            Self::UnknownVehicleClass { name } => write!(f, "unknown vehicle class '{name}'"),
            Self::NoWheelchairAccess => f.write_str("vehicle cannot accommodate wheelchair(s)"),
            Self::WheelchairCapacityExceeded { demand, capacity } => write!(
                f,
                "{demand} wheelchair(s) exceed vehicle wheelchair capacity of {capacity}"
            ),
            Self::DoubleWavRequired => f.write_str("booking requires a double WAV"),
            Self::LoadingSideMismatch { wanted, available } => write!(
                f,
                "booking requires {wanted} loading but vehicle loading is {available}"
            ),
            Self::PassengerCapacityExceeded {
                passengers,
                capacity,
            } => write!(
                f,
                "{passengers} passenger(s) exceed vehicle capacity of {capacity}"
            ),
            Self::ScooterStorage => {
                f.write_str("mobility scooter needs a WAV or extra boot space")
            }
            Self::FemaleDriverRequired => f.write_str("booking requires a female driver"),
            Self::OutsideServiceArea {
                distance_miles,
                radius_miles,
            } => write!(
                f,
                "pickup is {distance_miles:.1} miles away, outside the {radius_miles:.1} mile service area"
            ),
        }
    }
}

/// Record of one filter having run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    /// Filter that ran.
    pub filter: FilterKind,
    /// Whether the pairing survived it.
    pub passed: bool,
    /// Rejection reason when it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FilterOutcome {
    const fn passed(filter: FilterKind) -> Self {
        Self {
            filter,
            passed: true,
            reason: None,
        }
    }

    fn failed(filter: FilterKind, reason: &RejectionReason) -> Self {
        Self {
            filter,
            passed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// The first filter a pairing failed, with the trail leading up to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Filter that failed.
    pub filter: FilterKind,
    /// Why it failed.
    pub reason: RejectionReason,
    /// Every filter that ran, the failing one last.
    pub outcomes: Vec<FilterOutcome>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.filter, self.reason)
    }
}

/// What the filters learnt about a pairing that passed them all.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Eligibility {
    pub(crate) capability: VehicleCapability,
    pub(crate) distance_miles: Option<f64>,
    pub(crate) outcomes: Vec<FilterOutcome>,
}

#[derive(Default)]
struct Trail {
    outcomes: Vec<FilterOutcome>,
}

impl Trail {
    fn record<T>(
        &mut self,
        filter: FilterKind,
        result: Result<T, RejectionReason>,
    ) -> Result<T, Rejection> {
        match result {
            Ok(value) => {
                self.outcomes.push(FilterOutcome::passed(filter));
                Ok(value)
            }
            Err(reason) => {
                self.outcomes.push(FilterOutcome::failed(filter, &reason));
                Err(Rejection {
                    filter,
                    reason,
                    outcomes: std::mem::take(&mut self.outcomes),
                })
            }
        }
    }
}

/// Runs the hard filters for one driver and booking.
pub(crate) struct FilterPipeline<'a> {
    pub(crate) table: &'a CapabilityTable,
    pub(crate) config: &'a MatchConfig,
    pub(crate) distances: &'a dyn DistanceSource,
}

impl FilterPipeline<'_> {
    /// Run every filter in [`FilterKind::ORDER`], stopping at the first
    /// failure.
    pub(crate) fn run(&self, driver: &Driver, booking: &Booking) -> Result<Eligibility, Rejection> {
        self.run_all(driver, booking).inspect_err(|rejection| {
            debug!(
                "driver {} / booking {} rejected by {} filter: {}",
                driver.id, booking.id, rejection.filter, rejection.reason
            );
        })
    }

    fn run_all(&self, driver: &Driver, booking: &Booking) -> Result<Eligibility, Rejection> {
        let mut trail = Trail::default();
        trail.record(FilterKind::Approval, approval::check(driver))?;
        let capability = trail.record(
            FilterKind::VehicleFit,
            vehicle_fit::check(self.table, self.config.loading_side, driver, booking),
        )?;
        trail.record(FilterKind::Gender, gender::check(driver, booking))?;
        let distance_miles = trail.record(
            FilterKind::ServiceArea,
            service_area::check(
                driver,
                booking,
                self.config.default_service_radius_miles,
                self.distances,
            ),
        )?;
        Ok(Eligibility {
            capability,
            distance_miles,
            outcomes: trail.outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DirectDistance, LatLng};
    use crate::vehicle::VehicleClass;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> CapabilityTable {
        CapabilityTable::standard()
    }

    fn pipeline<'a>(table: &'a CapabilityTable, config: &'a MatchConfig) -> FilterPipeline<'a> {
        FilterPipeline {
            table,
            config,
            distances: &DirectDistance,
        }
    }

    #[rstest]
    fn passing_pairing_records_every_filter(table: CapabilityTable) {
        let config = MatchConfig::default();
        let driver = Driver::new(1, VehicleClass::StandardCar)
            .approved()
            .with_base_location(LatLng { lat: 51.5, lng: -0.1 });
        let booking = Booking::new(2)
            .with_ambulatory_passengers(1)
            .with_pickup_location(LatLng { lat: 51.52, lng: -0.12 });
        let eligibility = pipeline(&table, &config)
            .run(&driver, &booking)
            .expect("eligible");
        let ran: Vec<_> = eligibility.outcomes.iter().map(|o| o.filter).collect();
        assert_eq!(ran, FilterKind::ORDER);
        assert!(eligibility.outcomes.iter().all(|o| o.passed));
        assert!(eligibility.distance_miles.is_some());
    }

    #[rstest]
    fn stops_at_first_failure(table: CapabilityTable) {
        let config = MatchConfig::default();
        // Fails approval and gender; only approval should run.
        let driver = Driver::new(1, VehicleClass::StandardCar);
        let booking = Booking::new(2)
            .with_ambulatory_passengers(1)
            .female_driver_only();
        let rejection = pipeline(&table, &config)
            .run(&driver, &booking)
            .expect_err("rejected");
        assert_eq!(rejection.filter, FilterKind::Approval);
        assert_eq!(rejection.reason, RejectionReason::NotApproved);
        assert_eq!(rejection.outcomes.len(), 1);
        assert_eq!(rejection.outcomes[0].reason.as_deref(), Some("not approved"));
    }

    #[rstest]
    fn gender_runs_after_vehicle_fit(table: CapabilityTable) {
        let config = MatchConfig::default();
        let driver = Driver::new(1, VehicleClass::StandardCar).approved();
        let booking = Booking::new(2)
            .with_ambulatory_passengers(1)
            .female_driver_only();
        let rejection = pipeline(&table, &config)
            .run(&driver, &booking)
            .expect_err("rejected");
        assert_eq!(rejection.filter, FilterKind::Gender);
        assert_eq!(rejection.outcomes.len(), 3);
        assert_eq!(rejection.to_string(), "gender: booking requires a female driver");
    }
}
