//! In-process fan-out of station notifications and reports
//!
//! Stations publish through [`EventBusNotifier`](crate::infrastructure::EventBusNotifier);
//! any number of tasks may hold an [`EventSubscriber`]. A subscriber that
//! falls more than `capacity` messages behind skips to the oldest retained one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::{Event, EventMessage};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
    subscribers: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is the number of messages retained per lagging subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrap `event` with an id and timestamp and deliver it to every
    /// current subscriber. Publishing never fails.
    pub fn publish(&self, event: Event) {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let station_id = message.event.station_id();

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(event_type, ?station_id, delivered, "Station event published");
    }

    pub fn subscribe(&self) -> EventSubscriber {
        let receiver = self.sender.subscribe();
        let total = self.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        info!(total, "Station event subscriber attached");

        EventSubscriber {
            receiver,
            subscribers: self.subscribers.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    subscribers: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Next message, or `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Station event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        info!(remaining, "Station event subscriber detached");
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

/// Shared bus sized from `notifications.channel_capacity`
pub fn create_event_bus_with_capacity(capacity: usize) -> SharedEventBus {
    Arc::new(EventBus::with_capacity(capacity))
}
