//! Electric vehicle domain entity

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vehicle identifier, unique within a station's lifetime
pub type VehicleId = u32;

/// Two-tier hourly pricing: rates strictly above `threshold` get the
/// cheaper multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRule {
    pub threshold: u32,
    pub above_threshold: u64,
    pub at_or_below_threshold: u64,
}

impl PricingRule {
    pub fn cost(&self, hourly_rate: u32) -> u64 {
        let multiplier = if hourly_rate > self.threshold {
            self.above_threshold
        } else {
            self.at_or_below_threshold
        };
        multiplier * u64::from(hourly_rate)
    }
}

const CITY_CAR_PRICING: PricingRule = PricingRule {
    threshold: 5,
    above_threshold: 100,
    at_or_below_threshold: 150,
};

const SUV_PRICING: PricingRule = PricingRule {
    threshold: 7,
    above_threshold: 120,
    at_or_below_threshold: 170,
};

const LUXURY_CAR_PRICING: PricingRule = PricingRule {
    threshold: 5,
    above_threshold: 350,
    at_or_below_threshold: 500,
};

/// Closed set of vehicle variants, each carrying its own extra field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VehicleVariant {
    CityCar {
        /// km/h
        max_speed: u32,
    },
    Suv {
        /// kg
        towing_capacity: u32,
    },
    LuxuryCar {
        premium_features: Vec<String>,
    },
}

impl VehicleVariant {
    pub fn pricing(&self) -> PricingRule {
        match self {
            Self::CityCar { .. } => CITY_CAR_PRICING,
            Self::Suv { .. } => SUV_PRICING,
            Self::LuxuryCar { .. } => LUXURY_CAR_PRICING,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CityCar { .. } => "city",
            Self::Suv { .. } => "suv",
            Self::LuxuryCar { .. } => "luxury",
        }
    }
}

/// Common vehicle fields, validated before a vehicle is built
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleSpec {
    pub id: VehicleId,
    #[validate(length(min = 1, max = 100, message = "model must be 1–100 characters"))]
    pub model: String,
    #[validate(range(max = 100, message = "battery_level must be 0–100"))]
    pub battery_level: u8,
    #[validate(range(min = 1, message = "hourly_rate must be positive"))]
    pub hourly_rate: u32,
    pub available: bool,
}

/// A rentable electric vehicle
///
/// `available` is informational only. Which station collection holds the
/// vehicle decides whether it can be rented.
///
/// There is deliberately no `PartialEq`/`PartialOrd`: vehicles are ordered
/// by [`compare_by_rate`] and identified by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricVehicle {
    pub id: VehicleId,
    pub model: String,
    pub battery_level: u8,
    pub hourly_rate: u32,
    pub available: bool,
    #[serde(flatten)]
    pub variant: VehicleVariant,
}

impl ElectricVehicle {
    pub fn new(spec: VehicleSpec, variant: VehicleVariant) -> Self {
        Self {
            id: spec.id,
            model: spec.model,
            battery_level: spec.battery_level,
            hourly_rate: spec.hourly_rate,
            available: spec.available,
            variant,
        }
    }

    /// Rental cost for one booking at the current hourly rate
    pub fn rental_cost(&self) -> u64 {
        self.variant.pricing().cost(self.hourly_rate)
    }

    pub fn kind(&self) -> &'static str {
        self.variant.kind()
    }
}

impl fmt::Display for ElectricVehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            VehicleVariant::CityCar { max_speed } => {
                write!(f, "City EV: {}, max speed: {} km/h", self.model, max_speed)
            }
            VehicleVariant::Suv { towing_capacity } => {
                write!(f, "SUV EV: {}, towing capacity: {} kg", self.model, towing_capacity)
            }
            VehicleVariant::LuxuryCar { premium_features } => write!(
                f,
                "Luxury EV: {}, premium features: [{}]",
                self.model,
                premium_features.join(", ")
            ),
        }
    }
}

/// Orders vehicles by hourly rate only, ignoring every other field.
pub fn compare_by_rate(a: &ElectricVehicle, b: &ElectricVehicle) -> Ordering {
    a.hourly_rate.cmp(&b.hourly_rate)
}

/// Rate equality, the narrow counterpart of [`compare_by_rate`].
pub fn same_rate(a: &ElectricVehicle, b: &ElectricVehicle) -> bool {
    a.hourly_rate == b.hourly_rate
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: VehicleId, hourly_rate: u32) -> VehicleSpec {
        VehicleSpec {
            id,
            model: "Model".into(),
            battery_level: 80,
            hourly_rate,
            available: true,
        }
    }

    fn city(rate: u32) -> ElectricVehicle {
        ElectricVehicle::new(spec(1, rate), VehicleVariant::CityCar { max_speed: 120 })
    }

    fn suv(rate: u32) -> ElectricVehicle {
        ElectricVehicle::new(spec(2, rate), VehicleVariant::Suv { towing_capacity: 1500 })
    }

    fn luxury(rate: u32) -> ElectricVehicle {
        ElectricVehicle::new(
            spec(3, rate),
            VehicleVariant::LuxuryCar {
                premium_features: vec!["massage seats".into()],
            },
        )
    }

    #[test]
    fn city_car_threshold_is_five() {
        assert_eq!(city(5).rental_cost(), 750);
        assert_eq!(city(6).rental_cost(), 600);
        assert_eq!(city(1).rental_cost(), 150);
    }

    #[test]
    fn suv_threshold_is_seven() {
        assert_eq!(suv(6).rental_cost(), 1020);
        assert_eq!(suv(7).rental_cost(), 1190);
        assert_eq!(suv(8).rental_cost(), 960);
    }

    #[test]
    fn luxury_threshold_is_five() {
        assert_eq!(luxury(5).rental_cost(), 2500);
        assert_eq!(luxury(6).rental_cost(), 2100);
    }

    #[test]
    fn ordering_ignores_everything_but_rate() {
        let cheap_luxury = luxury(4);
        let pricey_city = city(9);
        assert_eq!(compare_by_rate(&cheap_luxury, &pricey_city), Ordering::Less);
        assert_eq!(compare_by_rate(&pricey_city, &cheap_luxury), Ordering::Greater);

        let a = city(6);
        let b = suv(6);
        assert!(same_rate(&a, &b));
        assert_eq!(compare_by_rate(&a, &b), Ordering::Equal);
        assert!(!same_rate(&a, &luxury(7)));
    }

    #[test]
    fn sorting_by_rate() {
        let mut fleet = vec![luxury(8), city(3), suv(5)];
        fleet.sort_by(compare_by_rate);
        let rates: Vec<u32> = fleet.iter().map(|v| v.hourly_rate).collect();
        assert_eq!(rates, vec![3, 5, 8]);
    }

    #[test]
    fn spec_validation_rejects_bad_fields() {
        assert!(spec(1, 5).validate().is_ok());

        let mut bad = spec(1, 0);
        assert!(bad.validate().is_err());

        bad = spec(1, 5);
        bad.battery_level = 101;
        assert!(bad.validate().is_err());

        bad = spec(1, 5);
        bad.model.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn display_names_the_variant() {
        assert_eq!(city(5).to_string(), "City EV: Model, max speed: 120 km/h");
        assert!(luxury(5).to_string().contains("massage seats"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(suv(7)).unwrap();
        assert_eq!(json["kind"], "suv");
        assert_eq!(json["towing_capacity"], 1500);
        let back: ElectricVehicle = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), "suv");
        assert_eq!(back.rental_cost(), 1190);
    }
}
