use thiserror::Error;

use crate::domain::station::StationId;
use crate::domain::vehicle::VehicleId;

/// Hard failures surfaced to the caller.
///
/// Inventory mismatches (full station, missing vehicle) are not errors:
/// they come back as [`InventoryStatus`](crate::domain::station::InventoryStatus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    #[error("Invalid vehicle data: {0}")]
    InvalidVehicle(String),

    #[error("Permission denied: '{capability}' is required")]
    PermissionDenied { capability: String },

    #[error("Rental not found for vehicle {0}")]
    RentalNotFound(VehicleId),

    #[error("Station {0} not found")]
    StationNotFound(StationId),

    #[error("Station {0} already registered")]
    StationAlreadyExists(StationId),

    #[error("Station {station_id} is busy, inventory lock not acquired in time")]
    StationBusy { station_id: StationId },

    #[error("Vehicle id space exhausted")]
    VehicleIdsExhausted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
