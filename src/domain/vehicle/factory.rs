//! Vehicle factory backed by a static registration table

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use super::model::{ElectricVehicle, VehicleId, VehicleSpec, VehicleVariant};
use crate::support::errors::{DomainError, DomainResult};

/// The one field each variant adds on top of [`VehicleSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantField {
    MaxSpeed(u32),
    TowingCapacity(u32),
    PremiumFeatures(Vec<String>),
}

type Constructor = fn(VariantField) -> DomainResult<VehicleVariant>;

fn build_city_car(field: VariantField) -> DomainResult<VehicleVariant> {
    match field {
        VariantField::MaxSpeed(max_speed) => Ok(VehicleVariant::CityCar { max_speed }),
        other => Err(mismatch("city", "max_speed", &other)),
    }
}

fn build_suv(field: VariantField) -> DomainResult<VehicleVariant> {
    match field {
        VariantField::TowingCapacity(towing_capacity) => Ok(VehicleVariant::Suv { towing_capacity }),
        other => Err(mismatch("suv", "towing_capacity", &other)),
    }
}

fn build_luxury_car(field: VariantField) -> DomainResult<VehicleVariant> {
    match field {
        VariantField::PremiumFeatures(premium_features) => {
            Ok(VehicleVariant::LuxuryCar { premium_features })
        }
        other => Err(mismatch("luxury", "premium_features", &other)),
    }
}

fn mismatch(kind: &str, expected: &str, got: &VariantField) -> DomainError {
    DomainError::InvalidVehicle(format!("{kind} requires {expected}, got {got:?}"))
}

/// Variant name → constructor. Class-style names are aliases of the tags.
const REGISTRY: &[(&str, Constructor)] = &[
    ("city", build_city_car),
    ("suv", build_suv),
    ("luxury", build_luxury_car),
    ("CityCar", build_city_car),
    ("SUV", build_suv),
    ("LuxuryCar", build_luxury_car),
];

/// Names accepted by [`create_vehicle`]
pub fn registered_kinds() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

fn lookup(variant_name: &str) -> Option<Constructor> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == variant_name)
        .map(|(_, ctor)| *ctor)
}

/// Build a vehicle of the named variant.
///
/// Fails with [`DomainError::UnknownVehicleType`] for unregistered names and
/// [`DomainError::InvalidVehicle`] when the fields do not validate or the
/// variant field belongs to another variant.
pub fn create_vehicle(
    variant_name: &str,
    spec: VehicleSpec,
    field: VariantField,
) -> DomainResult<ElectricVehicle> {
    let ctor =
        lookup(variant_name).ok_or_else(|| DomainError::UnknownVehicleType(variant_name.to_string()))?;

    spec.validate()
        .map_err(|e| DomainError::InvalidVehicle(e.to_string()))?;

    let variant = ctor(field)?;
    debug!(vehicle_id = spec.id, kind = variant.kind(), "Vehicle created");
    Ok(ElectricVehicle::new(spec, variant))
}

/// Positional convenience matching the full factory signature.
pub fn create_vehicle_with(
    variant_name: &str,
    id: VehicleId,
    model: impl Into<String>,
    battery_level: u8,
    hourly_rate: u32,
    available: bool,
    field: VariantField,
) -> DomainResult<ElectricVehicle> {
    create_vehicle(
        variant_name,
        VehicleSpec {
            id,
            model: model.into(),
            battery_level,
            hourly_rate,
            available,
        },
        field,
    )
}
