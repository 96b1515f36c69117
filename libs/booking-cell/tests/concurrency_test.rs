// libs/booking-cell/tests/concurrency_test.rs
use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use futures::future::join_all;
use uuid::Uuid;

use availability_cell::models::{CreateServiceRequest, DayHours, Service};
use availability_cell::services::calendar::InMemoryCalendar;
use availability_cell::services::catalog::InMemoryCatalog;
use booking_cell::models::{BookingError, BookingRequest};
use booking_cell::{BookingLedger, BookingState, InMemoryBookingLedger};
use shared_config::AppConfig;

async fn setup() -> (Arc<BookingState>, Service) {
    let calendar = Arc::new(InMemoryCalendar::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let provider_id = Uuid::new_v4();

    let open = DayHours::between("09:00:00".parse().unwrap(), "17:00:00".parse().unwrap())
        .unwrap();
    for weekday in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        calendar.set_hours(provider_id, weekday, open).await.unwrap();
    }

    let service = catalog
        .create_service(
            provider_id,
            CreateServiceRequest {
                name: "Consultation".to_string(),
                duration_minutes: 60,
                buffer_minutes: Some(15),
                max_advance_book_days: Some(30),
                price: 45.0,
            },
        )
        .await
        .unwrap();

    let config = AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        provider_timezone: "UTC".to_string(),
        default_granularity_minutes: 30,
        reminder_lead_hours: 24,
        max_recurrence_count: 52,
    };
    let state = Arc::new(BookingState::new(config, calendar, catalog, ledger));
    (state, service)
}

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[tokio::test]
async fn parallel_admissions_of_one_slot_yield_exactly_one_winner() {
    let (state, service) = setup().await;
    let now = instant("2024-06-01T08:00:00Z");

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let state = Arc::clone(&state);
            let request = BookingRequest {
                service_id: service.id,
                start_time: instant("2024-06-10T10:00:00Z"),
                client_ref: format!("client-{}", i),
            };
            tokio::spawn(async move { state.admission.admit(&request, now).await })
        })
        .collect();

    let outcomes: Vec<Result<_, BookingError>> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(BookingError::Conflict { .. })))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn parallel_admissions_of_disjoint_slots_all_win() {
    let (state, service) = setup().await;
    let now = instant("2024-06-01T08:00:00Z");

    // 09:00, 11:00, 13:00, 15:00: buffered spans never touch.
    let starts = [
        "2024-06-10T09:00:00Z",
        "2024-06-10T11:00:00Z",
        "2024-06-10T13:00:00Z",
        "2024-06-10T15:00:00Z",
    ];
    let attempts: Vec<_> = starts
        .iter()
        .map(|start| {
            let state = Arc::clone(&state);
            let request = BookingRequest {
                service_id: service.id,
                start_time: instant(start),
                client_ref: "client".to_string(),
            };
            tokio::spawn(async move { state.admission.admit(&request, now).await })
        })
        .collect();

    let outcomes = join_all(attempts).await;
    assert!(outcomes
        .into_iter()
        .all(|joined| joined.unwrap().is_ok()));
}

#[tokio::test]
async fn ledger_invariant_no_two_active_bookings_overlap() {
    let (state, service) = setup().await;
    let now = instant("2024-06-01T08:00:00Z");

    // Hammer the same morning with overlapping requests.
    let starts = [
        "2024-06-10T09:00:00Z",
        "2024-06-10T09:30:00Z",
        "2024-06-10T10:00:00Z",
        "2024-06-10T10:30:00Z",
        "2024-06-10T11:00:00Z",
        "2024-06-10T11:30:00Z",
    ];
    let attempts: Vec<_> = starts
        .iter()
        .map(|start| {
            let state = Arc::clone(&state);
            let request = BookingRequest {
                service_id: service.id,
                start_time: instant(start),
                client_ref: "client".to_string(),
            };
            tokio::spawn(async move { state.admission.admit(&request, now).await })
        })
        .collect();
    join_all(attempts).await;

    let bookings = state
        .ledger
        .query(
            service.provider_id,
            instant("2024-06-09T00:00:00Z"),
            instant("2024-06-12T00:00:00Z"),
        )
        .await
        .unwrap();
    let active: Vec<_> = bookings
        .iter()
        .filter(|booking| booking.status.is_active())
        .collect();

    for (i, a) in active.iter().enumerate() {
        for b in active.iter().skip(i + 1) {
            let disjoint =
                a.buffered_end() <= b.buffered_start() || b.buffered_end() <= a.buffered_start();
            assert!(
                disjoint,
                "bookings {} and {} hold overlapping buffered spans",
                a.id, b.id
            );
        }
    }
}
