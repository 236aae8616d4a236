//! Charging station value types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{ElectricVehicle, VehicleId};

/// Station identifier
pub type StationId = u32;

/// Opaque description of where a station is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location {
    pub info: String,
}

impl Location {
    pub fn new(info: impl Into<String>) -> Self {
        Self { info: info.into() }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info)
    }
}

/// Outcome of an inventory operation.
///
/// The failure variants are soft: they were logged or notified and the
/// inventory was left untouched. The caller decides what to do next.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Added,
    Removed,
    Rented,
    Returned,
    Renamed,
    StationFull,
    VehicleNotFound,
    /// The vehicle id is already held by this station
    AlreadyPresent,
}

impl InventoryStatus {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Added | Self::Removed | Self::Rented | Self::Returned | Self::Renamed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Rented => "rented",
            Self::Returned => "returned",
            Self::Renamed => "renamed",
            Self::StationFull => "station_full",
            Self::VehicleNotFound => "vehicle_not_found",
            Self::AlreadyPresent => "already_present",
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only inventory summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationReport {
    pub station_id: StationId,
    pub location: Location,
    pub capacity: usize,
    pub available: usize,
    pub rented: usize,
    /// Sum of the rental cost of every rented vehicle
    pub rented_cost: u64,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for StationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rental report for station {} ({}): available vehicles: {}, rented vehicles: {}",
            self.station_id, self.location, self.available, self.rented
        )
    }
}

/// The `(available, rented)` pair guarded by one lock per station.
///
/// A vehicle id lives in at most one of the two collections.
#[derive(Debug, Default)]
pub(crate) struct Inventory {
    pub(crate) available: Vec<ElectricVehicle>,
    pub(crate) rented: Vec<ElectricVehicle>,
}

impl Inventory {
    pub(crate) fn holds(&self, id: VehicleId) -> bool {
        self.available.iter().chain(self.rented.iter()).any(|v| v.id == id)
    }

    /// Remove from `available`, keeping the order of the rest.
    pub(crate) fn take_available(&mut self, id: VehicleId) -> Option<ElectricVehicle> {
        let index = self.available.iter().position(|v| v.id == id)?;
        Some(self.available.remove(index))
    }

    pub(crate) fn take_rented(&mut self, id: VehicleId) -> Option<ElectricVehicle> {
        let index = self.rented.iter().position(|v| v.id == id)?;
        Some(self.rented.remove(index))
    }

    pub(crate) fn find_mut(&mut self, id: VehicleId) -> Option<&mut ElectricVehicle> {
        self.available
            .iter_mut()
            .chain(self.rented.iter_mut())
            .find(|v| v.id == id)
    }
}
