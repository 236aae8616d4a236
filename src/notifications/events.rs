//! Notification events
//!
//! Defines all event types that can be broadcast to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::station::{StationId, StationReport};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// User-facing message from a station (pickup ready, rental cancelled, ...)
    Notification(NotificationEvent),
    /// Inventory summary produced by a station
    ReportGenerated(StationReport),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Notification(_) => "notification",
            Event::ReportGenerated(_) => "report_generated",
        }
    }

    /// Get the station ID if applicable
    pub fn station_id(&self) -> Option<StationId> {
        match self {
            Event::Notification(e) => e.station_id,
            Event::ReportGenerated(r) => Some(r.station_id),
        }
    }
}

/// Notification event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub station_id: Option<StationId>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
