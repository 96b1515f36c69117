use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use availability_cell::services::calendar::CalendarProvider;
use availability_cell::services::catalog::ServiceCatalog;

use crate::models::{Booking, BookingError, BookingRequest, BookingStatus};
use crate::services::events::{BookingEvent, EventBus};
use crate::services::ledger::BookingLedger;
use crate::services::reminders::ReminderScheduler;

/// Admits or rejects proposed bookings against the ledger. Validation
/// failures are synchronous and side-effect-free; the conflict decision
/// itself is delegated to the ledger's atomic insert so that of N
/// concurrent attempts on an overlapping slot exactly one wins.
pub struct AdmissionService {
    catalog: Arc<dyn ServiceCatalog>,
    calendar: Arc<dyn CalendarProvider>,
    ledger: Arc<dyn BookingLedger>,
    events: EventBus,
    reminders: ReminderScheduler,
}

impl AdmissionService {
    pub fn new(
        catalog: Arc<dyn ServiceCatalog>,
        calendar: Arc<dyn CalendarProvider>,
        ledger: Arc<dyn BookingLedger>,
        events: EventBus,
        reminders: ReminderScheduler,
    ) -> Self {
        Self {
            catalog,
            calendar,
            ledger,
            events,
            reminders,
        }
    }

    pub async fn admit(
        &self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        self.admit_in_group(request, None, now).await
    }

    /// Admit one booking, optionally as a member of a recurrence series.
    pub async fn admit_in_group(
        &self,
        request: &BookingRequest,
        recurrence_group_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let service = self.catalog.get(request.service_id).await?;
        let duration = Duration::minutes(service.duration_minutes as i64);
        let buffer = Duration::minutes(service.buffer_minutes as i64);
        let start = request.start_time;
        let end = start + duration;

        if request.client_ref.trim().is_empty() {
            return Err(BookingError::Validation(
                "Client reference cannot be empty".to_string(),
            ));
        }

        if start < now {
            return Err(BookingError::Validation(
                "Booking start time must not be in the past".to_string(),
            ));
        }

        // Horizon is judged per calendar date, matching the slot
        // generator, so a slot offered on the last bookable day admits.
        let horizon_date =
            (now + Duration::days(service.max_advance_book_days as i64)).date_naive();
        if start.date_naive() > horizon_date {
            return Err(BookingError::Validation(format!(
                "Booking start time is beyond the {}-day advance horizon",
                service.max_advance_book_days
            )));
        }

        self.check_open_window(&service, start, end + buffer).await?;

        // Price decides both the payment flag and the initial status: paid
        // services wait for capture, free ones confirm immediately.
        let requires_payment = service.price > 0.0;
        let initial_status = if requires_payment {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            provider_id: service.provider_id,
            service_id: service.id,
            start_time: start,
            end_time: end,
            buffer_minutes: service.buffer_minutes,
            status: initial_status,
            client_ref: request.client_ref.clone(),
            requires_payment,
            recurrence_group_id,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let admitted = self.ledger.insert_if_no_conflict(booking).await?;
        info!(
            "Admitted booking {} ({} at {})",
            admitted.id, admitted.status, admitted.start_time
        );

        // Collaborator hand-off happens strictly after the critical
        // section; a slow or failed subscriber cannot invalidate the
        // committed booking.
        self.events.publish(BookingEvent::BookingCreated {
            booking: admitted.clone(),
        });
        self.reminders.schedule(&admitted, now);

        Ok(admitted)
    }

    /// The requested span must sit inside the day's open window: start no
    /// earlier than opening, trailing buffer no later than closing. Same
    /// boundary rule as the slot generator, so an available slot is always
    /// admissible absent an intervening write.
    async fn check_open_window(
        &self,
        service: &availability_cell::models::Service,
        start: DateTime<Utc>,
        buffered_end: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let date = start.date_naive();
        let day = self.calendar.hours(service.provider_id, date.weekday()).await?;

        if day.closed {
            return Err(BookingError::Validation(format!(
                "Provider is closed on {}",
                date.weekday()
            )));
        }
        if self.calendar.is_exception(service.provider_id, date).await? {
            return Err(BookingError::Validation(format!(
                "Provider is closed on {}",
                date
            )));
        }

        let open = date.and_time(day.open).and_utc();
        let close = date.and_time(day.close).and_utc();
        if start < open || buffered_end > close {
            debug!(
                "Rejected out-of-hours request: {} .. {} vs {} .. {}",
                start, buffered_end, open, close
            );
            return Err(BookingError::Validation(
                "Requested time falls outside the provider's operating hours".to_string(),
            ));
        }

        Ok(())
    }
}
