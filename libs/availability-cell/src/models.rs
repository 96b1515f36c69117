// libs/availability-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// OPERATING HOURS MODELS
// ==============================================================================

/// Operating hours for one weekday of a provider's template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub closed: bool,
}

impl DayHours {
    pub fn between(open: NaiveTime, close: NaiveTime) -> Result<Self, AvailabilityError> {
        if open >= close {
            return Err(AvailabilityError::Validation(
                "Opening time must be before closing time".to_string(),
            ));
        }
        Ok(Self { open, close, closed: false })
    }

    pub fn closed_all_day() -> Self {
        Self {
            open: NaiveTime::MIN,
            close: NaiveTime::MIN,
            closed: true,
        }
    }
}

/// A provider's weekly operating-hours template, indexed Sunday (0) through
/// Saturday (6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub days: [DayHours; 7],
}

impl WeeklyHours {
    pub fn day(&self, weekday: Weekday) -> DayHours {
        self.days[weekday.num_days_from_sunday() as usize]
    }

    pub fn set_day(&mut self, weekday: Weekday, hours: DayHours) {
        self.days[weekday.num_days_from_sunday() as usize] = hours;
    }
}

impl Default for WeeklyHours {
    fn default() -> Self {
        Self {
            days: [DayHours::closed_all_day(); 7],
        }
    }
}

/// Map an API day-of-week value (0 = Sunday .. 6 = Saturday) to a weekday.
pub fn weekday_from_index(day_of_week: i32) -> Result<Weekday, AvailabilityError> {
    match day_of_week {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(AvailabilityError::Validation(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        )),
    }
}

// ==============================================================================
// SERVICE CATALOG MODELS
// ==============================================================================

/// A bookable service offering. Owned by the provider-configuration surface;
/// read-only to the engine during any single computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: i32,
    pub max_advance_book_days: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// Why a candidate slot is not bookable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SlotBlock {
    Past,
    Booked,
    BeyondHorizon,
    Closed,
}

impl fmt::Display for SlotBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotBlock::Past => write!(f, "past"),
            SlotBlock::Booked => write!(f, "booked"),
            SlotBlock::BeyondHorizon => write!(f, "beyond-horizon"),
            SlotBlock::Closed => write!(f, "closed"),
        }
    }
}

/// A candidate appointment slot. Derived from the calendar and ledger at
/// query time and never persisted; an available slot is a hint, not a hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotBlock>,
}

/// An already-buffered span occupied by an existing booking.
#[derive(Debug, Clone, Copy)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SetDayHoursRequest {
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: Option<i32>,
    pub max_advance_book_days: Option<i32>,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddExceptionRequest {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Service not found")]
    ServiceNotFound,

    #[error("No calendar configured for provider")]
    CalendarNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AvailabilityError> for shared_models::AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ServiceNotFound | AvailabilityError::CalendarNotFound => {
                shared_models::AppError::NotFound(err.to_string())
            }
            AvailabilityError::Validation(msg) => shared_models::AppError::Validation(msg),
            AvailabilityError::Storage(msg) => shared_models::AppError::Storage(msg),
        }
    }
}
