pub mod model;
pub mod charging_station;

pub use model::{InventoryStatus, Location, StationId, StationReport};
pub use charging_station::{ChargingStation, StationCollaborators};
