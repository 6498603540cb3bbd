//! Vehicle classes and their loading configuration.
//!
//! # Examples
//! ```
//! use accessride_core::VehicleClass;
//!
//! assert_eq!(VehicleClass::DoubleWav.as_str(), "DOUBLE_WAV");
//! assert_eq!("SIDE_LOADING_WAV".parse::<VehicleClass>(), Ok(VehicleClass::SideLoadingWav));
//! assert!(!VehicleClass::from("HOVERCRAFT").is_recognised());
//! ```

mod capability;

pub use capability::{CapabilityEntry, CapabilityTable, CapabilityTableError, VehicleCapability};

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

/// Discrete category describing a vehicle's seats, wheelchair spaces and
/// loading configuration.
///
/// Names outside the recognised set are preserved as
/// [`VehicleClass::Unrecognised`] rather than rejected, so a driver record
/// with an unknown class still loads and simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleClass {
    /// Saloon or hatchback without wheelchair access.
    StandardCar,
    /// Estate or MPV with extra seats and boot space.
    LargeCar,
    /// Wheelchair-accessible vehicle with a side ramp or lift.
    SideLoadingWav,
    /// Wheelchair-accessible vehicle with a rear ramp or lift.
    RearLoadingWav,
    /// Wheelchair-accessible vehicle carrying two wheelchairs.
    DoubleWav,
    /// Minibus with several wheelchair spaces.
    MinibusAccessible,
    /// Minibus without wheelchair access.
    MinibusStandard,
    /// Any other class name, kept verbatim.
    Unrecognised(String),
}

impl VehicleClass {
    /// Every recognised class, in capability-table order.
    pub const RECOGNISED: [Self; 7] = [
        Self::StandardCar,
        Self::LargeCar,
        Self::SideLoadingWav,
        Self::RearLoadingWav,
        Self::DoubleWav,
        Self::MinibusAccessible,
        Self::MinibusStandard,
    ];

    /// Return the canonical `SCREAMING_SNAKE_CASE` name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::StandardCar => "STANDARD_CAR",
            Self::LargeCar => "LARGE_CAR",
            Self::SideLoadingWav => "SIDE_LOADING_WAV",
            Self::RearLoadingWav => "REAR_LOADING_WAV",
            Self::DoubleWav => "DOUBLE_WAV",
            Self::MinibusAccessible => "MINIBUS_ACCESSIBLE",
            Self::MinibusStandard => "MINIBUS_STANDARD",
            Self::Unrecognised(name) => name,
        }
    }

    /// Report whether the class is one of [`VehicleClass::RECOGNISED`].
    #[must_use]
    pub const fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognised(_))
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VehicleClass {
    fn from(value: &str) -> Self {
        let normalised = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::RECOGNISED
            .into_iter()
            .find(|class| class.as_str() == normalised)
            .unwrap_or_else(|| Self::Unrecognised(value.to_owned()))
    }
}

impl From<String> for VehicleClass {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<VehicleClass> for String {
    fn from(value: VehicleClass) -> Self {
        match value {
            VehicleClass::Unrecognised(name) => name,
            recognised => recognised.as_str().to_owned(),
        }
    }
}

impl std::str::FromStr for VehicleClass {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// How wheelchairs board a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingType {
    /// No ramp or lift.
    #[default]
    None,
    /// Side-mounted ramp or lift.
    Side,
    /// Rear-mounted ramp or lift.
    Rear,
}

impl LoadingType {
    /// Report whether this loading type serves a passenger's preferred side.
    #[must_use]
    pub const fn satisfies(self, side: LoadingSide) -> bool {
        matches!(
            (self, side),
            (Self::Side, LoadingSide::Side) | (Self::Rear, LoadingSide::Rear)
        )
    }

    /// Return the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Side => "side",
            Self::Rear => "rear",
        }
    }
}

impl std::fmt::Display for LoadingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passenger's preferred wheelchair loading side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingSide {
    /// Board from the side of the vehicle.
    Side,
    /// Board from the rear of the vehicle.
    Rear,
}

impl std::fmt::Display for LoadingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Side => "side",
            Self::Rear => "rear",
        })
    }
}
