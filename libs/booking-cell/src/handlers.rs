// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use availability_cell::models::{BusyInterval, TimeSlot};
use availability_cell::services::calendar::CalendarProvider;
use availability_cell::services::catalog::ServiceCatalog;
use availability_cell::services::slots::SlotGenerator;
use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{
    AvailabilityQuery, Booking, BookingRequest, BookingSearchQuery, CreateBookingRequest,
    SeriesOutcome, TransitionRequest,
};
use crate::services::admission::AdmissionService;
use crate::services::events::EventBus;
use crate::services::ledger::BookingLedger;
use crate::services::lifecycle::BookingLifecycleService;
use crate::services::recurrence::RecurrenceService;
use crate::services::reminders::ReminderScheduler;

/// Engine state shared across requests: the read ports, the ledger, and
/// the services wired on top of them.
pub struct BookingState {
    pub config: AppConfig,
    pub calendar: Arc<dyn CalendarProvider>,
    pub catalog: Arc<dyn ServiceCatalog>,
    pub ledger: Arc<dyn BookingLedger>,
    pub slots: SlotGenerator,
    pub admission: Arc<AdmissionService>,
    pub lifecycle: BookingLifecycleService,
    pub recurrence: RecurrenceService,
    pub events: EventBus,
}

impl BookingState {
    pub fn new(
        config: AppConfig,
        calendar: Arc<dyn CalendarProvider>,
        catalog: Arc<dyn ServiceCatalog>,
        ledger: Arc<dyn BookingLedger>,
    ) -> Self {
        let events = EventBus::default();
        let reminders = ReminderScheduler::new(events.clone(), config.reminder_lead_hours);
        let admission = Arc::new(AdmissionService::new(
            Arc::clone(&catalog),
            Arc::clone(&calendar),
            Arc::clone(&ledger),
            events.clone(),
            reminders,
        ));
        let lifecycle = BookingLifecycleService::new(Arc::clone(&ledger), events.clone());
        let recurrence = RecurrenceService::new(Arc::clone(&admission), config.max_recurrence_count);
        let slots = SlotGenerator::new(Arc::clone(&calendar), Arc::clone(&catalog));

        Self {
            config,
            calendar,
            catalog,
            ledger,
            slots,
            admission,
            lifecycle,
            recurrence,
            events,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateBookingResponse {
    Single(Booking),
    Series(SeriesOutcome),
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

/// A day's candidate slots for one service. Snapshot semantics: an
/// available slot is a hint that can be lost to a concurrent admission.
pub async fn availability(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let now = Utc::now();
    let service = state.catalog.get(query.service_id).await?;

    // Pull one day of margin on both sides so buffers straddling midnight
    // still count against the requested date.
    let day_start = query.date.and_time(NaiveTime::MIN).and_utc();
    let window_start = day_start - Duration::days(1);
    let window_end = day_start + Duration::days(2);
    let bookings = state
        .ledger
        .query(service.provider_id, window_start, window_end)
        .await?;
    let busy: Vec<BusyInterval> = bookings
        .iter()
        .filter(|booking| booking.status.is_active())
        .map(|booking| BusyInterval {
            start: booking.buffered_start(),
            end: booking.buffered_end(),
        })
        .collect();

    let granularity = query
        .granularity_minutes
        .unwrap_or(state.config.default_granularity_minutes as i32);
    let slots = state
        .slots
        .day_slots(query.service_id, query.date, &busy, now, granularity)
        .await?;
    Ok(Json(slots))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

pub async fn create_booking(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let now = Utc::now();
    let anchor = BookingRequest {
        service_id: request.service_id,
        start_time: request.start_time,
        client_ref: request.client_ref,
    };

    match request.recurrence {
        Some(rule) => {
            let outcome = state.recurrence.expand(&anchor, rule, now).await?;
            Ok(Json(CreateBookingResponse::Series(outcome)))
        }
        None => {
            let booking = state.admission.admit(&anchor, now).await?;
            Ok(Json(CreateBookingResponse::Single(booking)))
        }
    }
}

pub async fn get_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.ledger.get(booking_id).await?;
    Ok(Json(booking))
}

pub async fn search_bookings(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<BookingSearchQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    if query.from >= query.to {
        return Err(AppError::Validation(
            "Search range start must be before its end".to_string(),
        ));
    }
    let bookings = state
        .ledger
        .query(query.provider_id, query.from, query.to)
        .await?;
    Ok(Json(bookings))
}

pub async fn transition_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.lifecycle.transition(booking_id, request.new_status).await?;
    Ok(Json(booking))
}
