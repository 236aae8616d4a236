//! Charging station inventory and the guarded rental transaction
//!
//! Reads share the inventory lock; `add`, `remove`, `rent`, `return` and
//! `rename` take it exclusively and re-check their preconditions under it.
//! Different stations never contend.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::model::{Inventory, InventoryStatus, Location, StationId, StationReport};
use crate::domain::permission::{CapabilitySet, PermissionGuard, VERIFIED_USER};
use crate::domain::ports::{SharedLogger, SharedNotifier};
use crate::domain::vehicle::{ElectricVehicle, VehicleId};
use crate::support::errors::{DomainError, DomainResult};

/// Collaborators injected into a station at construction
#[derive(Clone)]
pub struct StationCollaborators {
    /// Activity log: rentals, returns, reports
    pub logger: SharedLogger,
    /// User-facing messages
    pub notifier: SharedNotifier,
    /// Receives the permission guard's decision records
    pub audit: SharedLogger,
}

/// A charging point holding a bounded set of available vehicles
pub struct ChargingStation {
    id: StationId,
    capacity: usize,
    location: Location,
    inventory: RwLock<Inventory>,
    logger: SharedLogger,
    notifier: SharedNotifier,
    rental_guard: PermissionGuard,
}

impl ChargingStation {
    pub fn new(
        id: StationId,
        capacity: usize,
        location: Location,
        collaborators: StationCollaborators,
    ) -> Self {
        let StationCollaborators {
            logger,
            notifier,
            audit,
        } = collaborators;

        Self {
            id,
            capacity,
            location,
            inventory: RwLock::new(Inventory::default()),
            logger,
            notifier,
            rental_guard: PermissionGuard::new(VERIFIED_USER, audit),
        }
    }

    /// Replace the capability the rental guard requires
    pub fn with_required_capability(mut self, capability: impl Into<String>) -> Self {
        self.rental_guard = PermissionGuard::new(capability, self.rental_guard.audit());
        self
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn required_capability(&self) -> &str {
        self.rental_guard.required()
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Append to `available` if there is room.
    pub async fn add_vehicle(&self, vehicle: ElectricVehicle) -> InventoryStatus {
        let mut inventory = self.inventory.write().await;

        if inventory.holds(vehicle.id) {
            warn!(station_id = self.id, vehicle_id = vehicle.id, "Vehicle already at station");
            self.notifier.notify(&format!(
                "Vehicle {} is already at charging station {}",
                vehicle.id, self.id
            ));
            return InventoryStatus::AlreadyPresent;
        }

        if inventory.available.len() >= self.capacity {
            warn!(station_id = self.id, capacity = self.capacity, "Station full");
            self.notifier
                .notify(&format!("Charging station {} is full", self.id));
            return InventoryStatus::StationFull;
        }

        debug!(station_id = self.id, vehicle_id = vehicle.id, "Vehicle added");
        inventory.available.push(vehicle);
        InventoryStatus::Added
    }

    /// Drop a vehicle from `available`. Rented vehicles cannot be removed.
    pub async fn remove_vehicle(&self, vehicle_id: VehicleId) -> InventoryStatus {
        let mut inventory = self.inventory.write().await;

        match inventory.take_available(vehicle_id) {
            Some(_) => {
                debug!(station_id = self.id, vehicle_id, "Vehicle removed");
                InventoryStatus::Removed
            }
            None => {
                warn!(station_id = self.id, vehicle_id, "Vehicle not found for removal");
                self.notifier.notify(&format!(
                    "Vehicle {} not found at charging station {}",
                    vehicle_id, self.id
                ));
                InventoryStatus::VehicleNotFound
            }
        }
    }

    /// Rename a vehicle wherever this station holds it.
    pub async fn rename_vehicle(&self, vehicle_id: VehicleId, model: impl Into<String>) -> InventoryStatus {
        let mut inventory = self.inventory.write().await;

        match inventory.find_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.model = model.into();
                debug!(station_id = self.id, vehicle_id, model = %vehicle.model, "Vehicle renamed");
                InventoryStatus::Renamed
            }
            None => {
                warn!(station_id = self.id, vehicle_id, "Vehicle not found for rename");
                self.notifier.notify(&format!(
                    "Vehicle {} not found at charging station {}",
                    vehicle_id, self.id
                ));
                InventoryStatus::VehicleNotFound
            }
        }
    }

    /// Rent a vehicle on behalf of a caller holding the rental capability.
    ///
    /// Denial is a hard [`DomainError::PermissionDenied`]. A vehicle that is
    /// not available cancels the rental softly with a notification.
    pub async fn rent_vehicle(
        &self,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
    ) -> DomainResult<InventoryStatus> {
        self.rental_guard
            .run_async(granted, move || async move {
                let mut inventory = self.inventory.write().await;
                Ok(self.rent_locked(&mut inventory, vehicle_id))
            })
            .await
    }

    /// [`rent_vehicle`](Self::rent_vehicle) with a bound on waiting for the
    /// inventory lock. Outcomes are identical once the lock is held.
    pub async fn rent_vehicle_within(
        &self,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
        timeout: Duration,
    ) -> DomainResult<InventoryStatus> {
        self.rental_guard
            .run_async(granted, move || async move {
                let mut inventory = self.write_within(timeout).await?;
                Ok(self.rent_locked(&mut inventory, vehicle_id))
            })
            .await
    }

    /// Bring a rented vehicle back into `available`.
    ///
    /// Fails with [`DomainError::RentalNotFound`] when the vehicle is not
    /// rented from this station. A full station keeps it rented.
    pub async fn return_vehicle(
        &self,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
    ) -> DomainResult<InventoryStatus> {
        self.rental_guard
            .run_async(granted, move || async move {
                let mut inventory = self.inventory.write().await;

                if !inventory.rented.iter().any(|v| v.id == vehicle_id) {
                    return Err(DomainError::RentalNotFound(vehicle_id));
                }

                if inventory.available.len() >= self.capacity {
                    warn!(station_id = self.id, vehicle_id, "Station full, return refused");
                    self.notifier
                        .notify(&format!("Charging station {} is full", self.id));
                    return Ok(InventoryStatus::StationFull);
                }

                let Some(mut vehicle) = inventory.take_rented(vehicle_id) else {
                    return Err(DomainError::RentalNotFound(vehicle_id));
                };
                vehicle.available = true;
                self.logger.log(&format!("EV {} returned", vehicle.model));
                self.notifier
                    .notify(&format!("Thank you for returning {}", vehicle.model));
                inventory.available.push(vehicle);
                Ok(InventoryStatus::Returned)
            })
            .await
    }

    fn rent_locked(&self, inventory: &mut Inventory, vehicle_id: VehicleId) -> InventoryStatus {
        let status = match inventory.take_available(vehicle_id) {
            Some(mut vehicle) => {
                vehicle.available = false;
                self.logger.log(&format!("EV {} rented", vehicle.model));
                self.notifier
                    .notify(&format!("Your EV {} is ready for pickup", vehicle.model));
                info!(station_id = self.id, vehicle_id, "Vehicle rented");
                inventory.rented.push(vehicle);
                InventoryStatus::Rented
            }
            None => {
                warn!(station_id = self.id, vehicle_id, "Rental cancelled, vehicle not available");
                self.notifier.notify("Rental cancelled");
                InventoryStatus::VehicleNotFound
            }
        };

        metrics::counter!("rentals_total", "station_id" => self.id.to_string(), "outcome" => status.as_str())
            .increment(1);
        status
    }

    async fn write_within(&self, timeout: Duration) -> DomainResult<RwLockWriteGuard<'_, Inventory>> {
        tokio::time::timeout(timeout, self.inventory.write())
            .await
            .map_err(|_| {
                warn!(station_id = self.id, ?timeout, "Inventory lock wait timed out");
                DomainError::StationBusy { station_id: self.id }
            })
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Snapshot of `available` in insertion order
    pub async fn get_available_vehicles(&self) -> Vec<ElectricVehicle> {
        self.inventory.read().await.available.clone()
    }

    pub async fn rented_vehicles(&self) -> Vec<ElectricVehicle> {
        self.inventory.read().await.rented.clone()
    }

    pub async fn available_count(&self) -> usize {
        self.inventory.read().await.available.len()
    }

    pub async fn rented_count(&self) -> usize {
        self.inventory.read().await.rented.len()
    }

    /// First available vehicle whose model matches exactly
    pub async fn search_by_model(&self, model: &str) -> Option<ElectricVehicle> {
        self.inventory
            .read()
            .await
            .available
            .iter()
            .find(|v| v.model == model)
            .cloned()
    }

    /// Summarise the inventory, record it in the activity log and publish it
    /// through the notifier.
    pub async fn generate_report(&self) -> StationReport {
        let report = {
            let inventory = self.inventory.read().await;
            StationReport {
                station_id: self.id,
                location: self.location.clone(),
                capacity: self.capacity,
                available: inventory.available.len(),
                rented: inventory.rented.len(),
                rented_cost: inventory.rented.iter().map(ElectricVehicle::rental_cost).sum(),
                generated_at: Utc::now(),
            }
        };

        self.logger.log(&report.to_string());
        self.notifier.publish_report(&report);
        report
    }

    #[cfg(test)]
    pub(crate) async fn lock_inventory(&self) -> RwLockWriteGuard<'_, Inventory> {
        self.inventory.write().await
    }
}

impl std::fmt::Debug for ChargingStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChargingStation")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::{create_vehicle_with, VariantField};
    use crate::infrastructure::collaborators::{RecordingLogger, RecordingNotifier};
    use std::sync::Arc;

    struct Fixture {
        station: ChargingStation,
        logger: Arc<RecordingLogger>,
        notifier: Arc<RecordingNotifier>,
        audit: Arc<RecordingLogger>,
    }

    fn fixture(capacity: usize) -> Fixture {
        let logger = Arc::new(RecordingLogger::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let audit = Arc::new(RecordingLogger::new());
        let station = ChargingStation::new(
            1,
            capacity,
            Location::new("Moscow"),
            StationCollaborators {
                logger: logger.clone(),
                notifier: notifier.clone(),
                audit: audit.clone(),
            },
        );
        Fixture {
            station,
            logger,
            notifier,
            audit,
        }
    }

    fn city(id: VehicleId, model: &str, rate: u32) -> ElectricVehicle {
        create_vehicle_with("city", id, model, 90, rate, true, VariantField::MaxSpeed(130)).unwrap()
    }

    fn verified() -> CapabilitySet {
        CapabilitySet::new().grant(VERIFIED_USER)
    }

    fn ids(vehicles: &[ElectricVehicle]) -> Vec<VehicleId> {
        vehicles.iter().map(|v| v.id).collect()
    }

    #[tokio::test]
    async fn full_station_rejects_softly() {
        let f = fixture(1);

        assert_eq!(f.station.add_vehicle(city(1, "Leaf", 6)).await, InventoryStatus::Added);
        assert_eq!(
            f.station.add_vehicle(city(2, "Zoe", 4)).await,
            InventoryStatus::StationFull
        );

        assert_eq!(ids(&f.station.get_available_vehicles().await), vec![1]);
        assert_eq!(f.notifier.messages(), vec!["Charging station 1 is full"]);
    }

    #[tokio::test]
    async fn rent_without_capability_is_denied() {
        let f = fixture(2);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;

        let err = f.station.rent_vehicle(&CapabilitySet::new(), 1).await.unwrap_err();

        assert_eq!(
            err,
            DomainError::PermissionDenied {
                capability: VERIFIED_USER.into()
            }
        );
        assert_eq!(ids(&f.station.get_available_vehicles().await), vec![1]);
        assert_eq!(f.station.rented_count().await, 0);
        assert_eq!(f.audit.records(), vec!["Access 'verified user' denied"]);
        assert!(f.logger.is_empty());
        assert!(f.notifier.is_empty());
    }

    #[tokio::test]
    async fn verified_rent_moves_vehicle() {
        let f = fixture(2);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;

        let status = f.station.rent_vehicle(&verified(), 1).await.unwrap();

        assert_eq!(status, InventoryStatus::Rented);
        assert!(f.station.get_available_vehicles().await.is_empty());
        let rented = f.station.rented_vehicles().await;
        assert_eq!(ids(&rented), vec![1]);
        assert!(!rented[0].available);
        assert_eq!(f.logger.records(), vec!["EV Leaf rented"]);
        assert_eq!(f.notifier.messages(), vec!["Your EV Leaf is ready for pickup"]);
        assert_eq!(f.audit.len(), 1);
    }

    #[tokio::test]
    async fn renting_missing_vehicle_is_cancelled() {
        let f = fixture(2);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.rent_vehicle(&verified(), 1).await.unwrap();

        // Second attempt: already rented
        let status = f.station.rent_vehicle(&verified(), 1).await.unwrap();

        assert_eq!(status, InventoryStatus::VehicleNotFound);
        assert_eq!(f.station.rented_count().await, 1);
        assert_eq!(f.logger.len(), 1);
        assert_eq!(f.notifier.messages().last().map(String::as_str), Some("Rental cancelled"));
    }

    #[tokio::test]
    async fn search_follows_renames_and_insertion_order() {
        let f = fixture(5);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.add_vehicle(city(2, "Zoe", 4)).await;
        let _ = f.station.add_vehicle(city(3, "Zoe", 5)).await;

        assert_eq!(f.station.rename_vehicle(2, "Tesla X").await, InventoryStatus::Renamed);
        assert_eq!(f.station.search_by_model("Tesla X").await.map(|v| v.id), Some(2));
        assert_eq!(f.station.search_by_model("Zoe").await.map(|v| v.id), Some(3));
        assert!(f.station.search_by_model("Tesla").await.is_none());

        assert_eq!(f.station.rename_vehicle(2, "Model 3").await, InventoryStatus::Renamed);
        assert!(f.station.search_by_model("Tesla X").await.is_none());
    }

    #[tokio::test]
    async fn renaming_unknown_vehicle_notifies() {
        let f = fixture(2);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;

        assert_eq!(f.station.rename_vehicle(42, "Ghost").await, InventoryStatus::VehicleNotFound);
        assert_eq!(f.notifier.messages(), vec!["Vehicle 42 not found at charging station 1"]);
        assert_eq!(f.station.search_by_model("Leaf").await.map(|v| v.id), Some(1));
    }

    #[tokio::test]
    async fn search_ignores_rented_vehicles() {
        let f = fixture(2);
        let _ = f.station.add_vehicle(city(1, "Tesla X", 6)).await;
        let _ = f.station.rent_vehicle(&verified(), 1).await.unwrap();
        assert!(f.station.search_by_model("Tesla X").await.is_none());
    }

    #[tokio::test]
    async fn remove_only_touches_available() {
        let f = fixture(3);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.add_vehicle(city(2, "Zoe", 4)).await;
        let _ = f.station.add_vehicle(city(3, "Ioniq", 5)).await;
        let _ = f.station.rent_vehicle(&verified(), 3).await.unwrap();

        assert_eq!(f.station.remove_vehicle(1).await, InventoryStatus::Removed);
        assert_eq!(f.station.remove_vehicle(1).await, InventoryStatus::VehicleNotFound);
        assert_eq!(f.station.remove_vehicle(3).await, InventoryStatus::VehicleNotFound);
        assert_eq!(ids(&f.station.get_available_vehicles().await), vec![2]);
        assert_eq!(f.station.rented_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_id_is_not_added_twice() {
        let f = fixture(3);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.rent_vehicle(&verified(), 1).await.unwrap();

        assert_eq!(
            f.station.add_vehicle(city(1, "Leaf", 6)).await,
            InventoryStatus::AlreadyPresent
        );
        assert_eq!(f.station.available_count().await, 0);
    }

    #[tokio::test]
    async fn return_restores_availability() {
        let f = fixture(1);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.rent_vehicle(&verified(), 1).await.unwrap();
        let _ = f.station.add_vehicle(city(2, "Zoe", 4)).await;

        // Slot taken by vehicle 2
        assert_eq!(
            f.station.return_vehicle(&verified(), 1).await,
            Ok(InventoryStatus::StationFull)
        );
        assert_eq!(f.station.rented_count().await, 1);

        let _ = f.station.remove_vehicle(2).await;
        assert_eq!(
            f.station.return_vehicle(&verified(), 1).await,
            Ok(InventoryStatus::Returned)
        );
        let available = f.station.get_available_vehicles().await;
        assert_eq!(ids(&available), vec![1]);
        assert!(available[0].available);

        assert_eq!(
            f.station.return_vehicle(&verified(), 1).await,
            Err(DomainError::RentalNotFound(1))
        );
        assert!(f.station.return_vehicle(&CapabilitySet::new(), 1).await.is_err());
    }

    #[tokio::test]
    async fn report_counts_both_collections() {
        let f = fixture(3);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let _ = f.station.add_vehicle(city(2, "Zoe", 5)).await;
        let _ = f.station.rent_vehicle(&verified(), 2).await.unwrap();

        let report = f.station.generate_report().await;

        assert_eq!(report.available, 1);
        assert_eq!(report.rented, 1);
        assert_eq!(report.capacity, 3);
        assert_eq!(report.rented_cost, 750);
        assert_eq!(report.location, Location::new("Moscow"));
        assert!(f.logger.records().last().unwrap().contains("rented vehicles: 1"));
        assert_eq!(f.notifier.reports(), vec![report]);
    }

    #[tokio::test]
    async fn invariants_hold_over_mixed_sequence() {
        let f = fixture(3);
        let caps = verified();

        for step in 0..60u32 {
            let id = step % 7;
            match step % 4 {
                0 | 1 => {
                    let _ = f.station.add_vehicle(city(id, "Leaf", 6)).await;
                }
                2 => {
                    let _ = f.station.rent_vehicle(&caps, id).await.unwrap();
                }
                _ => {
                    let _ = f.station.remove_vehicle((id + 3) % 7).await;
                }
            }

            let available = f.station.get_available_vehicles().await;
            let rented = f.station.rented_vehicles().await;
            assert!(available.len() <= 3);
            for v in &available {
                assert!(!rented.iter().any(|r| r.id == v.id), "vehicle {} in both", v.id);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_rents_of_one_vehicle_succeed_once() {
        let f = fixture(1);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;
        let station = Arc::new(f.station);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let station = station.clone();
            handles.push(tokio::spawn(async move {
                station.rent_vehicle(&verified(), 1).await.unwrap()
            }));
        }

        let mut rented = 0;
        for handle in handles {
            if handle.await.unwrap() == InventoryStatus::Rented {
                rented += 1;
            }
        }
        assert_eq!(rented, 1);
        assert_eq!(station.rented_count().await, 1);
        assert_eq!(f.logger.len(), 1);
    }

    #[tokio::test]
    async fn bounded_rent_reports_busy_station() {
        let f = fixture(1);
        let _ = f.station.add_vehicle(city(1, "Leaf", 6)).await;

        {
            let _held = f.station.inventory.write().await;
            let err = f
                .station
                .rent_vehicle_within(&verified(), 1, Duration::from_millis(20))
                .await
                .unwrap_err();
            assert_eq!(err, DomainError::StationBusy { station_id: 1 });
        }

        let status = f
            .station
            .rent_vehicle_within(&verified(), 1, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(status, InventoryStatus::Rented);
    }

    #[tokio::test]
    async fn required_capability_is_configurable() {
        let f = fixture(1);
        let station = f.station.with_required_capability("premium member");
        let _ = station.add_vehicle(city(1, "Leaf", 6)).await;

        assert!(station.rent_vehicle(&verified(), 1).await.is_err());
        let caps = CapabilitySet::new().grant("premium member");
        assert_eq!(station.rent_vehicle(&caps, 1).await, Ok(InventoryStatus::Rented));
        assert_eq!(station.required_capability(), "premium member");
    }
}
