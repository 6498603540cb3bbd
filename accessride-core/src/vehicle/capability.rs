//! Static mapping from vehicle class to seating and wheelchair capability.
//!
//! The table is built once at start-up and shared immutably. A malformed
//! custom table is a configuration defect, so [`CapabilityTable::from_entries`]
//! rejects it up front instead of letting it skew matching later.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LoadingType, VehicleClass};

/// Seating, wheelchair and loading attributes of one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCapability {
    /// Total passengers carried, wheelchair users included.
    pub max_passengers: u32,
    /// Wheelchairs that can travel secured in the vehicle.
    pub wheelchair_capacity: u32,
    /// Wheelchair-accessible vehicle.
    #[serde(rename = "isWAV")]
    pub is_wav: bool,
    /// Carries two or more wheelchairs at once.
    #[serde(rename = "isDoubleWAV")]
    pub is_double_wav: bool,
    /// How wheelchairs board.
    pub loading_type: LoadingType,
    /// Room for a folded mobility scooter in the boot.
    pub has_extra_boot_space: bool,
}

impl VehicleCapability {
    const fn car(max_passengers: u32, has_extra_boot_space: bool) -> Self {
        Self {
            max_passengers,
            wheelchair_capacity: 0,
            is_wav: false,
            is_double_wav: false,
            loading_type: LoadingType::None,
            has_extra_boot_space,
        }
    }

    const fn wav(
        max_passengers: u32,
        wheelchair_capacity: u32,
        loading_type: LoadingType,
        has_extra_boot_space: bool,
    ) -> Self {
        Self {
            max_passengers,
            wheelchair_capacity,
            is_wav: true,
            is_double_wav: wheelchair_capacity >= 2,
            loading_type,
            has_extra_boot_space,
        }
    }
}

/// One row of a capability table, as read from configuration.
///
/// # Examples
/// ```
/// use accessride_core::CapabilityEntry;
///
/// let json = r#"{
///     "vehicleClass": "STANDARD_CAR",
///     "maxPassengers": 4,
///     "wheelchairCapacity": 0,
///     "isWAV": false,
///     "isDoubleWAV": false,
///     "loadingType": "none",
///     "hasExtraBootSpace": false
/// }"#;
/// let entry: CapabilityEntry = serde_json::from_str(json).expect("valid entry");
/// assert_eq!(entry.capability.max_passengers, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityEntry {
    /// Class the row describes.
    pub vehicle_class: VehicleClass,
    /// Attributes of the class.
    #[serde(flatten)]
    pub capability: VehicleCapability,
}

/// Defects found while validating a capability table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityTableError {
    /// The table lists no classes at all.
    #[error("capability table is empty")]
    Empty,
    /// A class name is not one of the recognised vehicle classes.
    #[error("capability table lists unrecognised vehicle class '{name}'")]
    UnrecognisedClass {
        /// Name found in the table.
        name: String,
    },
    /// A class appears more than once.
    #[error("capability table lists {class} more than once")]
    DuplicateClass {
        /// Repeated class.
        class: VehicleClass,
    },
    /// A class carries no passengers.
    #[error("{class} must carry at least one passenger")]
    NoSeats {
        /// Offending class.
        class: VehicleClass,
    },
    /// Wheelchair spaces exceed total seats.
    #[error("{class} has {wheelchair_capacity} wheelchair spaces but only {max_passengers} seats")]
    WheelchairsExceedSeats {
        /// Offending class.
        class: VehicleClass,
        /// Declared wheelchair spaces.
        wheelchair_capacity: u32,
        /// Declared seats.
        max_passengers: u32,
    },
    /// A WAV declares no wheelchair space.
    #[error("{class} is marked as a WAV but has no wheelchair space")]
    WavWithoutSpace {
        /// Offending class.
        class: VehicleClass,
    },
    /// A WAV declares no ramp or lift.
    #[error("{class} is marked as a WAV but has no loading type")]
    WavWithoutLoading {
        /// Offending class.
        class: VehicleClass,
    },
    /// Wheelchair spaces are declared on a vehicle that is not a WAV.
    #[error("{class} has wheelchair space but is not marked as a WAV")]
    SpaceWithoutWav {
        /// Offending class.
        class: VehicleClass,
    },
    /// The double-WAV flag disagrees with the wheelchair capacity.
    #[error("{class} double-WAV flag does not match wheelchair capacity {wheelchair_capacity}")]
    DoubleWavMismatch {
        /// Offending class.
        class: VehicleClass,
        /// Declared wheelchair spaces.
        wheelchair_capacity: u32,
    },
}

/// Immutable lookup from [`VehicleClass`] to [`VehicleCapability`].
///
/// # Examples
/// ```
/// use accessride_core::{CapabilityTable, VehicleClass};
///
/// let table = CapabilityTable::standard();
/// let double = table.get(&VehicleClass::DoubleWav).expect("listed class");
/// assert_eq!(double.wheelchair_capacity, 2);
/// assert!(table.get(&VehicleClass::from("UNICYCLE")).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    entries: HashMap<VehicleClass, VehicleCapability>,
}

impl CapabilityTable {
    /// The built-in table covering every recognised class.
    #[must_use]
    pub fn standard() -> Self {
        let entries = [
            (VehicleClass::StandardCar, VehicleCapability::car(4, false)),
            (VehicleClass::LargeCar, VehicleCapability::car(6, true)),
            (
                VehicleClass::SideLoadingWav,
                VehicleCapability::wav(5, 1, LoadingType::Side, false),
            ),
            (
                VehicleClass::RearLoadingWav,
                VehicleCapability::wav(5, 1, LoadingType::Rear, false),
            ),
            (
                VehicleClass::DoubleWav,
                VehicleCapability::wav(6, 2, LoadingType::Rear, false),
            ),
            (
                VehicleClass::MinibusAccessible,
                VehicleCapability::wav(12, 4, LoadingType::Rear, true),
            ),
            (VehicleClass::MinibusStandard, VehicleCapability::car(16, true)),
        ];
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Validate and build a table from configuration rows.
    ///
    /// # Errors
    /// Returns [`CapabilityTableError`] for the first malformed or repeated
    /// row, or when no rows are supplied.
    pub fn from_entries<I>(entries: I) -> Result<Self, CapabilityTableError>
    where
        I: IntoIterator<Item = CapabilityEntry>,
    {
        let mut table = HashMap::new();
        for entry in entries {
            validate_entry(&entry)?;
            let CapabilityEntry {
                vehicle_class,
                capability,
            } = entry;
            if table.contains_key(&vehicle_class) {
                return Err(CapabilityTableError::DuplicateClass {
                    class: vehicle_class,
                });
            }
            table.insert(vehicle_class, capability);
        }
        if table.is_empty() {
            return Err(CapabilityTableError::Empty);
        }
        Ok(Self { entries: table })
    }

    /// Look up the capability of a class.
    #[must_use]
    pub fn get(&self, class: &VehicleClass) -> Option<&VehicleCapability> {
        self.entries.get(class)
    }

    /// Number of classes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the table as configuration rows, in recognised-class order.
    #[must_use]
    pub fn entries(&self) -> Vec<CapabilityEntry> {
        VehicleClass::RECOGNISED
            .into_iter()
            .filter_map(|class| {
                self.entries.get(&class).map(|capability| CapabilityEntry {
                    vehicle_class: class.clone(),
                    capability: *capability,
                })
            })
            .collect()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_entry(entry: &CapabilityEntry) -> Result<(), CapabilityTableError> {
    let class = || entry.vehicle_class.clone();
    let cap = &entry.capability;
    if let VehicleClass::Unrecognised(name) = &entry.vehicle_class {
        return Err(CapabilityTableError::UnrecognisedClass { name: name.clone() });
    }
    if cap.max_passengers == 0 {
        return Err(CapabilityTableError::NoSeats { class: class() });
    }
    if cap.wheelchair_capacity > cap.max_passengers {
        return Err(CapabilityTableError::WheelchairsExceedSeats {
            class: class(),
            wheelchair_capacity: cap.wheelchair_capacity,
            max_passengers: cap.max_passengers,
        });
    }
    if cap.is_wav {
        if cap.wheelchair_capacity == 0 {
            return Err(CapabilityTableError::WavWithoutSpace { class: class() });
        }
        if cap.loading_type == LoadingType::None {
            return Err(CapabilityTableError::WavWithoutLoading { class: class() });
        }
    } else if cap.wheelchair_capacity > 0 {
        return Err(CapabilityTableError::SpaceWithoutWav { class: class() });
    }
    if cap.is_double_wav != (cap.wheelchair_capacity >= 2) {
        return Err(CapabilityTableError::DoubleWavMismatch {
            class: class(),
            wheelchair_capacity: cap.wheelchair_capacity,
        });
    }
    Ok(())
}
