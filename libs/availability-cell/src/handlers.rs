// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{
    weekday_from_index, AddExceptionRequest, CreateServiceRequest, DayHours, ExceptionRangeQuery,
    Service, SetDayHoursRequest, WeeklyHours,
};
use crate::services::calendar::{CalendarProvider, InMemoryCalendar};
use crate::services::catalog::{InMemoryCatalog, ServiceCatalog};

/// Shared state for the provider-configuration surface. The concrete
/// stores are exposed here so hours and services can be edited; the engine
/// itself only sees the read ports.
pub struct AvailabilityState {
    pub calendar: Arc<InMemoryCalendar>,
    pub catalog: Arc<InMemoryCatalog>,
}

// ==============================================================================
// OPERATING HOURS HANDLERS
// ==============================================================================

pub async fn get_weekly_hours(
    State(state): State<Arc<AvailabilityState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<WeeklyHours>, AppError> {
    let hours = state.calendar.weekly_hours(provider_id).await?;
    Ok(Json(hours))
}

pub async fn set_day_hours(
    State(state): State<Arc<AvailabilityState>>,
    Path((provider_id, day_of_week)): Path<(Uuid, i32)>,
    Json(request): Json<SetDayHoursRequest>,
) -> Result<Json<Value>, AppError> {
    let weekday = weekday_from_index(day_of_week)?;

    let hours = if request.closed {
        DayHours::closed_all_day()
    } else {
        match (request.open, request.close) {
            (Some(open), Some(close)) => DayHours::between(open, close)?,
            _ => {
                return Err(AppError::Validation(
                    "Open and close times are required unless the day is closed".to_string(),
                ))
            }
        }
    };

    state.calendar.set_hours(provider_id, weekday, hours).await?;
    Ok(Json(json!({
        "provider_id": provider_id,
        "day_of_week": day_of_week,
        "hours": hours,
    })))
}

// ==============================================================================
// EXCEPTION DATE HANDLERS
// ==============================================================================

pub async fn list_exceptions(
    State(state): State<Arc<AvailabilityState>>,
    Path(provider_id): Path<Uuid>,
    Query(range): Query<ExceptionRangeQuery>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    if range.from > range.to {
        return Err(AppError::Validation(
            "Range start must not be after range end".to_string(),
        ));
    }
    let dates = state
        .calendar
        .exceptions(provider_id, range.from, range.to)
        .await?;
    Ok(Json(dates))
}

pub async fn add_exception(
    State(state): State<Arc<AvailabilityState>>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<AddExceptionRequest>,
) -> Result<Json<Value>, AppError> {
    state.calendar.add_exception(provider_id, request.date).await?;
    Ok(Json(json!({
        "provider_id": provider_id,
        "date": request.date,
        "closed": true,
        "reason": request.reason,
    })))
}

pub async fn remove_exception(
    State(state): State<Arc<AvailabilityState>>,
    Path((provider_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let removed = state.calendar.remove_exception(provider_id, date).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "No closure exception on {} for this provider",
            date
        )));
    }
    Ok(Json(json!({
        "provider_id": provider_id,
        "date": date,
        "removed": true,
    })))
}

// ==============================================================================
// SERVICE CATALOG HANDLERS
// ==============================================================================

pub async fn create_service(
    State(state): State<Arc<AvailabilityState>>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let service = state.catalog.create_service(provider_id, request).await?;
    Ok(Json(service))
}

pub async fn list_services(
    State(state): State<Arc<AvailabilityState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = state.catalog.list(provider_id).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AvailabilityState>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let service = state.catalog.get(service_id).await?;
    Ok(Json(service))
}
