// libs/booking-cell/tests/reminders_test.rs
use assert_matches::assert_matches;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use booking_cell::models::{Booking, BookingStatus, ReminderPlan};
use booking_cell::services::events::{BookingEvent, EventBus};
use booking_cell::services::reminders::{self, ReminderScheduler};

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn booking_starting_at(start: &str) -> Booking {
    let start_time = instant(start);
    Booking {
        id: Uuid::new_v4(),
        provider_id: Uuid::new_v4(),
        service_id: Uuid::new_v4(),
        start_time,
        end_time: start_time + chrono::Duration::minutes(60),
        buffer_minutes: 15,
        status: BookingStatus::Confirmed,
        client_ref: "client-1".to_string(),
        requires_payment: true,
        recurrence_group_id: None,
        created_at: instant("2024-06-01T08:00:00Z"),
        updated_at: instant("2024-06-01T08:00:00Z"),
        version: 0,
    }
}

#[test]
fn lead_time_before_start_yields_a_fire_time() {
    let booking = booking_starting_at("2024-06-10T10:00:00Z");
    let plan = reminders::plan(&booking, 24, instant("2024-06-01T08:00:00Z"));
    assert_eq!(plan, ReminderPlan::FireAt(instant("2024-06-09T10:00:00Z")));
}

#[test]
fn elapsed_lead_time_fires_immediately_instead_of_in_the_past() {
    let booking = booking_starting_at("2024-06-10T10:00:00Z");

    // Ten hours out with a 24 hour lead: the fire time is already gone.
    let plan = reminders::plan(&booking, 24, instant("2024-06-10T00:00:00Z"));
    assert_eq!(plan, ReminderPlan::FireImmediately);

    // Exactly on the boundary counts as immediate, never a past stamp.
    let boundary = reminders::plan(&booking, 24, instant("2024-06-09T10:00:00Z"));
    assert_eq!(boundary, ReminderPlan::FireImmediately);
}

#[tokio::test]
async fn scheduler_publishes_the_hand_off_record() {
    let events = EventBus::default();
    let mut subscription = events.subscribe();
    let scheduler = ReminderScheduler::new(events, 24);

    let booking = booking_starting_at("2024-06-10T10:00:00Z");
    let plan = scheduler.schedule(&booking, instant("2024-06-01T08:00:00Z"));
    assert_eq!(plan, ReminderPlan::FireAt(instant("2024-06-09T10:00:00Z")));

    let event = subscription.recv().await.unwrap();
    assert_matches!(
        event,
        BookingEvent::ReminderDue { booking_id, fire_at }
            if booking_id == booking.id && fire_at == instant("2024-06-09T10:00:00Z")
    );
}

#[tokio::test]
async fn immediate_reminders_are_stamped_with_now() {
    let events = EventBus::default();
    let mut subscription = events.subscribe();
    let scheduler = ReminderScheduler::new(events, 24);

    let booking = booking_starting_at("2024-06-10T10:00:00Z");
    let now = instant("2024-06-10T02:00:00Z");
    let plan = scheduler.schedule(&booking, now);
    assert_eq!(plan, ReminderPlan::FireImmediately);

    let event = subscription.recv().await.unwrap();
    assert_matches!(
        event,
        BookingEvent::ReminderDue { fire_at, .. } if fire_at == now
    );
}
