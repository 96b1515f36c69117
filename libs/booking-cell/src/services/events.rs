use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};

/// Events the engine emits to external collaborators (notification,
/// payment, dashboards). Emission is fire-and-forget: a failed or absent
/// subscriber never rolls back the state change that produced the event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingCreated {
        booking: Booking,
    },
    BookingStatusChanged {
        booking: Booking,
        from: BookingStatus,
        to: BookingStatus,
    },
    ReminderDue {
        booking_id: Uuid,
        fire_at: DateTime<Utc>,
    },
}

pub type BookingEventReceiver = broadcast::Receiver<BookingEvent>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BookingEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> BookingEventReceiver {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: BookingEvent) {
        // send only fails when nobody is subscribed; that is not an error.
        if self.sender.send(event).is_err() {
            debug!("Booking event dropped: no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
