//! The fixed roster of ride sharers.

use crate::credentials::HashedPasscodes;
use crate::types::DriverId;
use serde::{Deserialize, Serialize};

/// A ride sharer on the roster
///
/// Passcodes are not part of the record; they live in a
/// [`CredentialVerifier`](crate::credentials::CredentialVerifier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Roster id
    pub id: DriverId,
    /// Display name
    pub name: String,
    /// Car model
    pub car: String,
    /// License plate
    pub plate: String,
}

impl Driver {
    /// Creates a driver record
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        car: impl Into<String>,
        plate: impl Into<String>,
    ) -> Self {
        Self {
            id: DriverId::new(id),
            name: name.into(),
            car: car.into(),
            plate: plate.into(),
        }
    }
}

/// Immutable list of ride sharers, fixed at startup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    drivers: Vec<Driver>,
}

impl Roster {
    /// Creates a roster
    #[must_use]
    pub const fn new(drivers: Vec<Driver>) -> Self {
        Self { drivers }
    }

    /// Looks up a driver
    #[must_use]
    pub fn get(&self, id: &DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == *id)
    }

    /// Whether the driver is on the roster
    #[must_use]
    pub fn contains(&self, id: &DriverId) -> bool {
        self.get(id).is_some()
    }

    /// Display name of a driver, if on the roster
    #[must_use]
    pub fn name_of(&self, id: &DriverId) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    /// First driver on the roster (the default selection)
    #[must_use]
    pub fn first(&self) -> Option<&Driver> {
        self.drivers.first()
    }

    /// All drivers in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    /// Number of drivers
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether the roster is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

// (id, name, car, plate, passcode)
const DEMO_DRIVERS: [(&str, &str, &str, &str, &str); 4] = [
    ("d1", "Alice Kim", "Toyota Prius", "PR1-234", "alice123"),
    ("d2", "Ben Carter", "Honda Civic", "CVC-889", "ben123"),
    ("d3", "Chloe Nguyen", "Hyundai Ioniq", "ION-552", "chloe123"),
    ("d4", "Emi Barter", "Honda Civic", "CVC 889", "emi123"),
];

/// The demo roster
#[must_use]
pub fn demo_roster() -> Roster {
    Roster::new(
        DEMO_DRIVERS
            .iter()
            .map(|(id, name, car, plate, _)| Driver::new(*id, *name, *car, *plate))
            .collect(),
    )
}

/// Passcodes for the demo roster
#[must_use]
pub fn demo_credentials() -> HashedPasscodes {
    DEMO_DRIVERS
        .iter()
        .fold(HashedPasscodes::new(), |passcodes, (id, _, _, _, passcode)| {
            passcodes.with_passcode(DriverId::new(*id), passcode)
        })
}
