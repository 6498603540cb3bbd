//! Female-driver requirement.

use super::RejectionReason;
use crate::booking::Booking;
use crate::driver::Driver;

/// Fail only when the booking demands a female driver and this one is not.
pub(super) const fn check(driver: &Driver, booking: &Booking) -> Result<(), RejectionReason> {
    if booking.accessibility_profile.female_driver_only && !driver.female_driver {
        return Err(RejectionReason::FemaleDriverRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleClass;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, true)]
    #[case(false, true, true)]
    #[case(true, true, true)]
    #[case(true, false, false)]
    fn only_a_stated_requirement_rejects(
        #[case] female_only: bool,
        #[case] female_driver: bool,
        #[case] passes: bool,
    ) {
        let mut booking = Booking::new(1);
        booking.accessibility_profile.female_driver_only = female_only;
        let mut driver = Driver::new(2, VehicleClass::StandardCar);
        driver.female_driver = female_driver;
        assert_eq!(check(&driver, &booking).is_ok(), passes);
    }
}
