//! Fleet registry: every charging station known to this process

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::station::{ChargingStation, StationId, StationReport};
use crate::domain::vehicle::{create_vehicle, ElectricVehicle, VariantField, VehicleId, VehicleSpec};
use crate::support::errors::{DomainError, DomainResult};

/// Thread-safe registry of charging stations.
///
/// Also hands out vehicle ids that stay unique for the process lifetime.
pub struct FleetRegistry {
    stations: DashMap<StationId, Arc<ChargingStation>>,
    /// Next id to hand out; past `VehicleId::MAX` once the id space is spent
    vehicle_counter: AtomicU64,
}

/// Shared, reference-counted fleet registry
pub type SharedFleetRegistry = Arc<FleetRegistry>;

impl FleetRegistry {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
            vehicle_counter: AtomicU64::new(1),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedFleetRegistry {
        Arc::new(Self::new())
    }

    pub fn register(&self, station: ChargingStation) -> DomainResult<Arc<ChargingStation>> {
        match self.stations.entry(station.id()) {
            Entry::Occupied(_) => {
                warn!(station_id = station.id(), "Station already registered");
                Err(DomainError::StationAlreadyExists(station.id()))
            }
            Entry::Vacant(slot) => {
                info!(station_id = station.id(), location = %station.location(), "Registering station");
                let station = Arc::new(station);
                slot.insert(station.clone());
                Ok(station)
            }
        }
    }

    pub fn get(&self, station_id: StationId) -> DomainResult<Arc<ChargingStation>> {
        self.stations
            .get(&station_id)
            .map(|s| s.value().clone())
            .ok_or(DomainError::StationNotFound(station_id))
    }

    pub fn remove(&self, station_id: StationId) -> Option<Arc<ChargingStation>> {
        let removed = self.stations.remove(&station_id).map(|(_, s)| s);
        if removed.is_some() {
            info!(station_id, "Station unregistered");
        }
        removed
    }

    /// Registered ids, ascending
    pub fn station_ids(&self) -> Vec<StationId> {
        let mut ids: Vec<_> = self.stations.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn count(&self) -> usize {
        self.stations.len()
    }

    /// Allocate a fresh vehicle id. Never repeats an id once handed out.
    pub fn next_vehicle_id(&self) -> DomainResult<VehicleId> {
        self.vehicle_counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                (next <= u64::from(VehicleId::MAX)).then_some(next + 1)
            })
            .ok()
            .and_then(|id| VehicleId::try_from(id).ok())
            .ok_or_else(|| {
                warn!("Vehicle id space exhausted");
                DomainError::VehicleIdsExhausted
            })
    }

    /// Keep generated ids clear of an externally assigned one
    pub fn reserve_vehicle_id(&self, id: VehicleId) {
        self.vehicle_counter
            .fetch_max(u64::from(id) + 1, Ordering::SeqCst);
    }

    /// Build a vehicle through the factory with a freshly allocated id
    pub fn create_vehicle(
        &self,
        variant_name: &str,
        model: impl Into<String>,
        battery_level: u8,
        hourly_rate: u32,
        field: VariantField,
    ) -> DomainResult<ElectricVehicle> {
        let spec = VehicleSpec {
            id: self.next_vehicle_id()?,
            model: model.into(),
            battery_level,
            hourly_rate,
            available: true,
        };
        create_vehicle(variant_name, spec, field)
    }

    /// One report per station, ordered by station id
    pub async fn fleet_report(&self) -> Vec<StationReport> {
        // Collect first: no map guard may be held across an await
        let stations: Vec<Arc<ChargingStation>> =
            self.stations.iter().map(|e| e.value().clone()).collect();

        let mut reports = Vec::with_capacity(stations.len());
        for station in stations {
            reports.push(station.generate_report().await);
        }
        reports.sort_by_key(|r| r.station_id);
        reports
    }
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
