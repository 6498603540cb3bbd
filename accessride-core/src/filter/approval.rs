//! Approval and suspension checks.

use super::RejectionReason;
use crate::driver::Driver;

/// Pass iff the driver is approved and not suspended.
pub(super) const fn check(driver: &Driver) -> Result<(), RejectionReason> {
    if !driver.approved {
        return Err(RejectionReason::NotApproved);
    }
    if driver.suspended {
        return Err(RejectionReason::Suspended);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleClass;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, Err(RejectionReason::NotApproved))]
    #[case(false, true, Err(RejectionReason::NotApproved))]
    #[case(true, true, Err(RejectionReason::Suspended))]
    #[case(true, false, Ok(()))]
    fn distinguishes_unapproved_from_suspended(
        #[case] approved: bool,
        #[case] suspended: bool,
        #[case] expected: Result<(), RejectionReason>,
    ) {
        let mut driver = Driver::new(1, VehicleClass::StandardCar);
        driver.approved = approved;
        driver.suspended = suspended;
        assert_eq!(check(&driver), expected);
    }
}
