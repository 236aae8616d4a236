pub mod factory;
pub mod model;

pub use factory::{create_vehicle, create_vehicle_with, registered_kinds, VariantField};
pub use model::{
    compare_by_rate, same_rate, ElectricVehicle, PricingRule, VehicleId, VehicleSpec,
    VehicleVariant,
};
