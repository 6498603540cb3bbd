//! Vehicle capability against a booking's accessibility profile.

use super::RejectionReason;
use crate::booking::Booking;
use crate::config::LoadingSidePolicy;
use crate::driver::Driver;
use crate::vehicle::{CapabilityTable, VehicleCapability};

/// Pass iff the driver's vehicle can carry everyone in the booking, returning
/// the capability record for scoring.
pub(super) fn check(
    table: &CapabilityTable,
    policy: LoadingSidePolicy,
    driver: &Driver,
    booking: &Booking,
) -> Result<VehicleCapability, RejectionReason> {
    let capability = table
        .get(&driver.vehicle_class)
        .copied()
        .ok_or_else(|| RejectionReason::UnknownVehicleClass {
            name: driver.vehicle_class.to_string(),
        })?;
    let profile = &booking.accessibility_profile;
    let demand = profile.wheelchair_demand();

    if demand > 0 && (!capability.is_wav || capability.wheelchair_capacity == 0) {
        return Err(RejectionReason::NoWheelchairAccess);
    }
    if demand > capability.wheelchair_capacity {
        return Err(RejectionReason::WheelchairCapacityExceeded {
            demand,
            capacity: capability.wheelchair_capacity,
        });
    }
    if profile.requires_double_wav() && !capability.is_double_wav {
        return Err(RejectionReason::DoubleWavRequired);
    }
    if policy == LoadingSidePolicy::Required
        && let Some(wanted) = profile.loading_side()
        && !capability.loading_type.satisfies(wanted)
    {
        return Err(RejectionReason::LoadingSideMismatch {
            wanted,
            available: capability.loading_type,
        });
    }
    let passengers = profile.total_passengers();
    if passengers > capability.max_passengers {
        return Err(RejectionReason::PassengerCapacityExceeded {
            passengers,
            capacity: capability.max_passengers,
        });
    }
    if profile.wheelchair_config.mobility_scooters > 0
        && !capability.has_extra_boot_space
        && !capability.is_wav
    {
        return Err(RejectionReason::ScooterStorage);
    }
    Ok(capability)
}
