//! Process bootstrap shared by the CLI and tests.
//!
//! Provides [`init_tracing`] and [`FleetRuntime`], which turns an
//! [`AppConfig`] into registered, seeded stations wired to the event bus.
//! Notifications are also written to the `ev_rental::notification` tracing
//! target, so headless runs see them without a bus subscriber.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::fleet::{FleetRegistry, SharedFleetRegistry};
use crate::application::rental::{rental_process, SharedRentalProcess};
use crate::config::{AppConfig, StationConfig};
use crate::domain::escalation::EscalationChain;
use crate::domain::station::{ChargingStation, InventoryStatus, Location, StationCollaborators};
use crate::domain::vehicle::{create_vehicle, VehicleSpec};
use crate::domain::ports::SharedNotifier;
use crate::infrastructure::collaborators::{
    EventBusNotifier, FanoutNotifier, TracingLogger, TracingNotifier,
};
use crate::notifications::{create_event_bus_with_capacity, SharedEventBus};
use crate::support::errors::AppError;

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Everything a driver needs to run rentals and change requests
pub struct FleetRuntime {
    pub config: AppConfig,
    pub fleet: SharedFleetRegistry,
    pub event_bus: SharedEventBus,
    pub escalation: EscalationChain,
    pub rental: SharedRentalProcess,
}

impl FleetRuntime {
    /// Register and seed every configured station.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let event_bus = create_event_bus_with_capacity(config.notifications.channel_capacity);
        let fleet = FleetRegistry::shared();

        for station_cfg in &config.stations {
            let station = build_station(station_cfg, &config, &event_bus);
            let station = fleet.register(station)?;
            seed_station(&fleet, &station, station_cfg).await?;
        }

        let rental = rental_process(
            config.rental.channel,
            notifier_for(EventBusNotifier::new(event_bus.clone())),
            config.rental.lock_timeout(),
        );

        info!(
            stations = fleet.count(),
            channel = %config.rental.channel,
            lock_timeout_ms = config.rental.lock_timeout_ms,
            "Fleet runtime started"
        );

        Ok(Self {
            config,
            fleet,
            event_bus,
            escalation: EscalationChain::standard(),
            rental,
        })
    }
}

/// Publish on the bus and mirror to tracing
fn notifier_for(bus_notifier: EventBusNotifier) -> SharedNotifier {
    Arc::new(FanoutNotifier::new(vec![
        Arc::new(TracingNotifier),
        Arc::new(bus_notifier),
    ]))
}

fn build_station(
    station_cfg: &StationConfig,
    config: &AppConfig,
    event_bus: &SharedEventBus,
) -> ChargingStation {
    ChargingStation::new(
        station_cfg.id,
        station_cfg.capacity,
        Location::new(station_cfg.location.clone()),
        StationCollaborators {
            logger: Arc::new(TracingLogger),
            notifier: notifier_for(EventBusNotifier::for_station(event_bus.clone(), station_cfg.id)),
            audit: Arc::new(TracingLogger),
        },
    )
    .with_required_capability(config.rental.required_capability.clone())
}

async fn seed_station(
    fleet: &FleetRegistry,
    station: &ChargingStation,
    station_cfg: &StationConfig,
) -> Result<(), AppError> {
    for vehicle_cfg in &station_cfg.vehicles {
        let id = match vehicle_cfg.id {
            Some(id) => {
                fleet.reserve_vehicle_id(id);
                id
            }
            None => fleet.next_vehicle_id()?,
        };

        let spec = VehicleSpec {
            id,
            model: vehicle_cfg.model.clone(),
            battery_level: vehicle_cfg.battery_level,
            hourly_rate: vehicle_cfg.hourly_rate,
            available: vehicle_cfg.available,
        };
        let vehicle = create_vehicle(&vehicle_cfg.kind, spec, vehicle_cfg.variant_field()?)?;

        let status = station.add_vehicle(vehicle).await;
        if status != InventoryStatus::Added {
            warn!(station_id = station.id(), vehicle_id = id, %status, "Seed vehicle not added");
        }
    }
    Ok(())
}
