// libs/booking-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use availability_cell::models::AvailabilityError;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// An admitted booking. Created only by the admission path, mutated only
/// through the lifecycle service, never physically deleted: cancellation
/// is a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub buffer_minutes: i32,
    pub status: BookingStatus,
    pub client_ref: String,
    pub requires_payment: bool,
    pub recurrence_group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic token for compare-and-swap status updates.
    pub version: u64,
}

impl Booking {
    /// Start of the span this booking occupies for overlap testing: its
    /// own time expanded by its service's buffer on both sides.
    pub fn buffered_start(&self) -> DateTime<Utc> {
        self.start_time - Duration::minutes(self.buffer_minutes as i64)
    }

    pub fn buffered_end(&self) -> DateTime<Utc> {
        self.end_time + Duration::minutes(self.buffer_minutes as i64)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Active bookings are the only ones that occupy calendar time.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// A proposed booking, before admission. End time and payment flag are
/// recomputed by the engine from the service, never trusted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub client_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub client_ref: String,
    pub recurrence: Option<RecurrenceRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub new_status: BookingStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingSearchQuery {
    pub provider_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub granularity_minutes: Option<i32>,
}

// ==============================================================================
// RECURRENCE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    pub count: u32,
}

/// Partial-success report of a series expansion. Admission failures of
/// individual occurrences never fail the series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesOutcome {
    pub recurrence_group_id: Uuid,
    pub admitted: Vec<Booking>,
    pub rejected: Vec<RejectedOccurrence>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedOccurrence {
    pub date: NaiveDate,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    Conflict,
    Validation,
    InvalidDate,
    Storage,
}

// ==============================================================================
// REMINDER MODELS
// ==============================================================================

/// Hand-off record for the notification collaborator: when a reminder
/// should fire, or that the lead time has already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPlan {
    FireAt(DateTime<Utc>),
    FireImmediately,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot conflicts with booking {conflicting_booking_id}")]
    Conflict { conflicting_booking_id: Uuid },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AvailabilityError> for BookingError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ServiceNotFound | AvailabilityError::CalendarNotFound => {
                BookingError::NotFound(err.to_string())
            }
            AvailabilityError::Validation(msg) => BookingError::Validation(msg),
            AvailabilityError::Storage(msg) => BookingError::Storage(msg),
        }
    }
}

impl From<BookingError> for shared_models::AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(msg) => shared_models::AppError::NotFound(msg),
            BookingError::Validation(msg) => shared_models::AppError::Validation(msg),
            BookingError::Conflict { .. } => shared_models::AppError::Conflict(err.to_string()),
            BookingError::InvalidTransition { .. } => {
                shared_models::AppError::InvalidTransition(err.to_string())
            }
            BookingError::Storage(msg) => shared_models::AppError::Storage(msg),
        }
    }
}
