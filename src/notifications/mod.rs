//! Notifications module
//!
//! Broadcasts station notifications and reports to in-process subscribers.
//!
//! # Usage
//! ```ignore
//! use ev_rental::notifications::{create_event_bus, Event, NotificationEvent};
//! use chrono::Utc;
//!
//! let event_bus = create_event_bus();
//! event_bus.publish(Event::Notification(NotificationEvent {
//!     station_id: Some(1),
//!     message: "Your EV Leaf is ready for pickup".to_string(),
//!     timestamp: Utc::now(),
//! }));
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, create_event_bus_with_capacity, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
