//! Rental workflow variants
//!
//! A caller picks one [`RentalProcess`] at setup and drives every rental
//! through it. The variants differ only in how the rental is initiated; the
//! station's guarded rent decides the outcome. Every rental waits at most
//! `lock_timeout` for the station's inventory lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::permission::CapabilitySet;
use crate::domain::ports::SharedNotifier;
use crate::domain::station::{ChargingStation, InventoryStatus};
use crate::domain::vehicle::VehicleId;
use crate::support::errors::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalChannel {
    Online,
    Offline,
}

impl fmt::Display for RentalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

#[async_trait]
pub trait RentalProcess: Send + Sync {
    fn channel(&self) -> RentalChannel;

    async fn rent_car(
        &self,
        station: &ChargingStation,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
    ) -> DomainResult<InventoryStatus>;
}

pub type SharedRentalProcess = Arc<dyn RentalProcess>;

/// Default bound on waiting for a station's inventory lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

async fn initiate(
    channel: RentalChannel,
    notifier: &SharedNotifier,
    lock_timeout: Duration,
    station: &ChargingStation,
    granted: &CapabilitySet,
    vehicle_id: VehicleId,
) -> DomainResult<InventoryStatus> {
    debug!(%channel, station_id = station.id(), vehicle_id, ?lock_timeout, "Starting rental");
    notifier.notify(&format!("Processing {} rental", channel));
    station
        .rent_vehicle_within(granted, vehicle_id, lock_timeout)
        .await
}

/// Rental booked remotely, e.g. from an app
pub struct OnlineRentalProcess {
    notifier: SharedNotifier,
    lock_timeout: Duration,
}

impl OnlineRentalProcess {
    pub fn new(notifier: SharedNotifier) -> Self {
        Self {
            notifier,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

#[async_trait]
impl RentalProcess for OnlineRentalProcess {
    fn channel(&self) -> RentalChannel {
        RentalChannel::Online
    }

    async fn rent_car(
        &self,
        station: &ChargingStation,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
    ) -> DomainResult<InventoryStatus> {
        initiate(
            self.channel(),
            &self.notifier,
            self.lock_timeout,
            station,
            granted,
            vehicle_id,
        )
        .await
    }
}

/// Rental booked at the station counter
pub struct OfflineRentalProcess {
    notifier: SharedNotifier,
    lock_timeout: Duration,
}

impl OfflineRentalProcess {
    pub fn new(notifier: SharedNotifier) -> Self {
        Self {
            notifier,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

#[async_trait]
impl RentalProcess for OfflineRentalProcess {
    fn channel(&self) -> RentalChannel {
        RentalChannel::Offline
    }

    async fn rent_car(
        &self,
        station: &ChargingStation,
        granted: &CapabilitySet,
        vehicle_id: VehicleId,
    ) -> DomainResult<InventoryStatus> {
        initiate(
            self.channel(),
            &self.notifier,
            self.lock_timeout,
            station,
            granted,
            vehicle_id,
        )
        .await
    }
}

/// Pick the process for a channel
pub fn rental_process(
    channel: RentalChannel,
    notifier: SharedNotifier,
    lock_timeout: Duration,
) -> SharedRentalProcess {
    match channel {
        RentalChannel::Online => {
            Arc::new(OnlineRentalProcess::new(notifier).with_lock_timeout(lock_timeout))
        }
        RentalChannel::Offline => {
            Arc::new(OfflineRentalProcess::new(notifier).with_lock_timeout(lock_timeout))
        }
    }
}
