use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{Booking, ReminderPlan};
use crate::services::events::{BookingEvent, EventBus};

/// When the pre-appointment reminder for `booking` should fire. A lead
/// time that has already passed yields `FireImmediately` rather than a
/// timestamp in the past. Pure; callers recompute if the booking's start
/// moves.
pub fn plan(booking: &Booking, lead_time_hours: i64, now: DateTime<Utc>) -> ReminderPlan {
    let fire_at = booking.start_time - Duration::hours(lead_time_hours);
    if fire_at <= now {
        ReminderPlan::FireImmediately
    } else {
        ReminderPlan::FireAt(fire_at)
    }
}

/// Computes reminder hand-off records and announces them on the event
/// bus. Delivery itself belongs to the notification collaborator.
pub struct ReminderScheduler {
    events: EventBus,
    lead_time_hours: i64,
}

impl ReminderScheduler {
    pub fn new(events: EventBus, lead_time_hours: i64) -> Self {
        Self {
            events,
            lead_time_hours,
        }
    }

    pub fn schedule(&self, booking: &Booking, now: DateTime<Utc>) -> ReminderPlan {
        let plan = plan(booking, self.lead_time_hours, now);
        let fire_at = match plan {
            ReminderPlan::FireAt(at) => at,
            ReminderPlan::FireImmediately => now,
        };
        debug!("Reminder for booking {} due at {}", booking.id, fire_at);
        self.events.publish(BookingEvent::ReminderDue {
            booking_id: booking.id,
            fire_at,
        });
        plan
    }
}
