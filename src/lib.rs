//! # EV Rental
//!
//! Inventory and rental core for electric vehicles parked at charging
//! stations.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: vehicles and their pricing, the station inventory, the
//!   capability guard, the change-request escalation chain, and the ports
//!   the station reports through
//! - **application**: multi-station fleet registry and rental workflows
//! - **infrastructure**: adapters for the logging and notification ports
//! - **notifications**: in-process event bus for station notifications
//! - **runtime**: tracing setup and fleet bootstrap from configuration

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod runtime;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export the fleet entry points
pub use application::{FleetRegistry, SharedFleetRegistry};
pub use runtime::{init_tracing, FleetRuntime};

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
