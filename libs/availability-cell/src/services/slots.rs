use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityError, BusyInterval, DayHours, Service, SlotBlock, TimeSlot};
use crate::services::calendar::CalendarProvider;
use crate::services::catalog::ServiceCatalog;

/// Turns a date, a service and a ledger snapshot into the day's candidate
/// slots. Output reflects only the snapshot it was computed from; an
/// available slot carries no reservation.
pub struct SlotGenerator {
    calendar: Arc<dyn CalendarProvider>,
    catalog: Arc<dyn ServiceCatalog>,
}

impl SlotGenerator {
    pub fn new(calendar: Arc<dyn CalendarProvider>, catalog: Arc<dyn ServiceCatalog>) -> Self {
        Self { calendar, catalog }
    }

    /// Candidate slots for one date, against the supplied busy intervals
    /// (already buffered by their own bookings' rules).
    pub async fn day_slots(
        &self,
        service_id: Uuid,
        date: NaiveDate,
        busy: &[BusyInterval],
        now: DateTime<Utc>,
        granularity_minutes: i32,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        if granularity_minutes < 1 || granularity_minutes > 240 {
            return Err(AvailabilityError::Validation(
                "Slot granularity must be between 1 and 240 minutes".to_string(),
            ));
        }

        let service = self.catalog.get(service_id).await?;
        let day = self.calendar.hours(service.provider_id, date.weekday()).await?;
        let is_exception = self.calendar.is_exception(service.provider_id, date).await?;

        let slots = generate(date, &service, day, is_exception, busy, now, granularity_minutes);
        debug!(
            "Generated {} candidate slots for service {} on {}",
            slots.len(),
            service_id,
            date
        );
        Ok(slots)
    }
}

/// Generate the ordered candidate slots for one day.
///
/// Boundary rule: a start time is offered while `start + duration + buffer`
/// still fits before closing; the leading buffer may extend before opening.
/// A weekday marked closed in the template yields no candidates at all,
/// while an exception date yields the template's candidates flagged
/// `closed`. One reason per slot, strongest first: closed, past,
/// beyond-horizon, booked.
pub fn generate(
    date: NaiveDate,
    service: &Service,
    day: DayHours,
    is_exception: bool,
    busy: &[BusyInterval],
    now: DateTime<Utc>,
    granularity_minutes: i32,
) -> Vec<TimeSlot> {
    if day.closed {
        return Vec::new();
    }

    let duration = Duration::minutes(service.duration_minutes as i64);
    let buffer = Duration::minutes(service.buffer_minutes as i64);
    let step = Duration::minutes(granularity_minutes as i64);

    let open = date.and_time(day.open).and_utc();
    let close = date.and_time(day.close).and_utc();
    let horizon_date = (now + Duration::days(service.max_advance_book_days as i64)).date_naive();
    let beyond_horizon = date > horizon_date;

    let mut slots = Vec::new();
    let mut start = open;

    while start + duration + buffer <= close {
        let end = start + duration;

        let reason = if is_exception {
            Some(SlotBlock::Closed)
        } else if start < now {
            Some(SlotBlock::Past)
        } else if beyond_horizon {
            Some(SlotBlock::BeyondHorizon)
        } else if busy
            .iter()
            .any(|interval| intervals_overlap(start - buffer, end + buffer, interval.start, interval.end))
        {
            Some(SlotBlock::Booked)
        } else {
            None
        };

        slots.push(TimeSlot {
            start,
            end,
            available: reason.is_none(),
            reason,
        });

        start += step;
    }

    slots
}

/// Two half-open intervals [s1, e1) and [s2, e2) overlap iff
/// s1 < e2 AND s2 < e1.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}
