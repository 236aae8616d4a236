//! Adapters for the activity-log and notification ports

use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use crate::domain::ports::{ActivityLogger, Notifier, SharedNotifier};
use crate::domain::station::{StationId, StationReport};
use crate::notifications::{Event, NotificationEvent, SharedEventBus};

/// Forwards activity records to `tracing` at INFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ActivityLogger for TracingLogger {
    fn log(&self, message: &str) {
        info!(target: "ev_rental::activity", "{}", message);
    }
}

/// Emits notifications as tracing events, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "ev_rental::notification", "{}", message);
    }
}

/// Publishes notifications on the event bus.
pub struct EventBusNotifier {
    bus: SharedEventBus,
    station_id: Option<StationId>,
}

impl EventBusNotifier {
    pub fn new(bus: SharedEventBus) -> Self {
        Self {
            bus,
            station_id: None,
        }
    }

    /// Tag every notification with the owning station
    pub fn for_station(bus: SharedEventBus, station_id: StationId) -> Self {
        Self {
            bus,
            station_id: Some(station_id),
        }
    }
}

impl Notifier for EventBusNotifier {
    fn notify(&self, message: &str) {
        self.bus.publish(Event::Notification(NotificationEvent {
            station_id: self.station_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        }));
    }

    fn publish_report(&self, report: &StationReport) {
        self.bus.publish(Event::ReportGenerated(report.clone()));
    }
}

/// Delivers every notification and report to each target in order.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    targets: Vec<SharedNotifier>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<SharedNotifier>) -> Self {
        Self { targets }
    }

    pub fn with(mut self, target: SharedNotifier) -> Self {
        self.targets.push(target);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, message: &str) {
        for target in &self.targets {
            target.notify(message);
        }
    }

    fn publish_report(&self, report: &StationReport) {
        for target in &self.targets {
            target.publish_report(report);
        }
    }
}

/// In-memory activity log for development and testing
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActivityLogger for RecordingLogger {
    fn log(&self, message: &str) {
        // A poisoned lock drops the record rather than failing the caller
        if let Ok(mut records) = self.records.lock() {
            records.push(message.to_string());
        }
    }
}

/// In-memory notifier for development and testing
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    reports: Mutex<Vec<StationReport>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn reports(&self) -> Vec<StationReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }

    fn publish_report(&self, report: &StationReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
    }
}
