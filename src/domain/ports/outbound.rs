//! Outbound ports: collaborators the station reports through
//!
//! The station holds these behind `Arc<dyn ...>` and never inherits their
//! behaviour. Concrete adapters live in
//! [`infrastructure::collaborators`](crate::infrastructure::collaborators).

use std::sync::Arc;

use crate::domain::station::StationReport;

/// Append-only, ordered activity log.
///
/// Implementations must not fail observably; errors are swallowed inside.
pub trait ActivityLogger: Send + Sync {
    fn log(&self, message: &str);
}

/// Fire-and-forget user notifications. No delivery guarantee.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);

    /// Hand a freshly generated station report to subscribers.
    ///
    /// Plain message sinks ignore reports.
    fn publish_report(&self, _report: &StationReport) {}
}

pub type SharedLogger = Arc<dyn ActivityLogger>;
pub type SharedNotifier = Arc<dyn Notifier>;
