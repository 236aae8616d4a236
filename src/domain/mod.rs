pub mod escalation;
pub mod permission;
pub mod ports;
pub mod station;
pub mod vehicle;

// Re-export commonly used types
pub use escalation::{ChangeHandler, ChangeRequest, EscalationChain, HandlerRole, Resolution};
pub use permission::{guard, guard_async, CapabilitySet, PermissionGuard, VERIFIED_USER};
pub use ports::{ActivityLogger, Notifier, SharedLogger, SharedNotifier};
pub use station::{
    ChargingStation, InventoryStatus, Location, StationCollaborators, StationId, StationReport,
};
pub use vehicle::{
    compare_by_rate, create_vehicle, same_rate, ElectricVehicle, VariantField, VehicleId,
    VehicleSpec, VehicleVariant,
};

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
