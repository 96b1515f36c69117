// libs/booking-cell/tests/recurrence_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use availability_cell::models::{CreateServiceRequest, DayHours, Service};
use availability_cell::services::calendar::InMemoryCalendar;
use availability_cell::services::catalog::InMemoryCatalog;
use booking_cell::models::{
    BookingError, BookingRequest, RecurrenceFrequency, RecurrenceRule, RejectionReason,
};
use booking_cell::{BookingLedger, BookingState, InMemoryBookingLedger};
use shared_config::AppConfig;

struct TestSetup {
    state: Arc<BookingState>,
    service: Service,
}

impl TestSetup {
    async fn new(max_advance_book_days: i32) -> Self {
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
                    max_advance_book_days: Some(max_advance_book_days),
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
        Self { state, service }
    }

    fn anchor(&self, start: &str) -> BookingRequest {
        BookingRequest {
            service_id: self.service.id,
            start_time: instant(start),
            client_ref: "client-1".to_string(),
        }
    }
}

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn weekly(count: u32) -> RecurrenceRule {
    RecurrenceRule {
        frequency: RecurrenceFrequency::Weekly,
        count,
    }
}

// ==============================================================================
// SERIES EXPANSION TESTS
// ==============================================================================

#[tokio::test]
async fn weekly_series_admits_every_free_occurrence() {
    let setup = TestSetup::new(60).await;

    let outcome = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-06-10T10:00:00Z"),
            weekly(4),
            instant("2024-06-01T08:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.admitted.len(), 4);
    assert!(outcome.rejected.is_empty());

    let dates: Vec<NaiveDate> = outcome
        .admitted
        .iter()
        .map(|booking| booking.start_time.date_naive())
        .collect();
    assert_eq!(
        dates,
        vec![
            date("2024-06-10"),
            date("2024-06-17"),
            date("2024-06-24"),
            date("2024-07-01"),
        ]
    );

    // Same time of day and weekday throughout, one shared group id.
    for booking in &outcome.admitted {
        assert_eq!(booking.start_time.time(), instant("2024-06-10T10:00:00Z").time());
        assert_eq!(
            booking.recurrence_group_id,
            Some(outcome.recurrence_group_id)
        );
    }
}

#[tokio::test]
async fn a_conflicted_occurrence_does_not_abort_the_series() {
    let setup = TestSetup::new(60).await;

    // Third occurrence's slot is already taken.
    setup
        .state
        .admission
        .admit(
            &setup.anchor("2024-06-24T10:00:00Z"),
            instant("2024-06-01T08:00:00Z"),
        )
        .await
        .unwrap();

    let outcome = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-06-10T10:00:00Z"),
            weekly(4),
            instant("2024-06-01T08:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.admitted.len(), 3);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].date, date("2024-06-24"));
    assert_eq!(outcome.rejected[0].reason, RejectionReason::Conflict);
}

#[tokio::test]
async fn occurrences_beyond_the_horizon_are_rejected_individually() {
    let setup = TestSetup::new(30).await;

    // Occurrences land on 06-10, 06-17, 06-24, 07-01, 07-08; the horizon
    // from 06-01 ends 07-01, so only the last occurrence is out.
    let outcome = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-06-10T10:00:00Z"),
            weekly(5),
            instant("2024-06-01T08:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.admitted.len(), 4);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].date, date("2024-07-08"));
    assert_eq!(outcome.rejected[0].reason, RejectionReason::Validation);
}

#[tokio::test]
async fn monthly_series_skips_months_missing_the_anchor_day() {
    let setup = TestSetup::new(365).await;

    // Jan 31 -> Feb has no 31st -> Mar 31.
    let outcome = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-01-31T10:00:00Z"),
            RecurrenceRule {
                frequency: RecurrenceFrequency::Monthly,
                count: 3,
            },
            instant("2024-01-15T08:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.admitted.len(), 2);
    let dates: Vec<NaiveDate> = outcome
        .admitted
        .iter()
        .map(|booking| booking.start_time.date_naive())
        .collect();
    assert_eq!(dates, vec![date("2024-01-31"), date("2024-03-31")]);

    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].reason, RejectionReason::InvalidDate);
}

#[tokio::test]
async fn absurd_counts_are_rejected_up_front() {
    let setup = TestSetup::new(60).await;

    let zero = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-06-10T10:00:00Z"),
            weekly(0),
            instant("2024-06-01T08:00:00Z"),
        )
        .await;
    assert_matches!(zero, Err(BookingError::Validation(_)));

    let oversized = setup
        .state
        .recurrence
        .expand(
            &setup.anchor("2024-06-10T10:00:00Z"),
            weekly(53),
            instant("2024-06-01T08:00:00Z"),
        )
        .await;
    assert_matches!(oversized, Err(BookingError::Validation(_)));

    // Nothing was written before the rule was rejected.
    let bookings = setup
        .state
        .ledger
        .query(
            setup.service.provider_id,
            instant("2024-06-01T00:00:00Z"),
            instant("2025-06-01T00:00:00Z"),
        )
        .await
        .unwrap();
    assert!(bookings.is_empty());
}
