use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Booking, BookingError, BookingStatus};
use crate::services::events::{BookingEvent, EventBus};
use crate::services::ledger::BookingLedger;

/// Grace period after the scheduled start before a no-show is warranted.
const NO_SHOW_GRACE_MINUTES: i64 = 30;

/// Bounded retries for status races; each retry re-reads and re-validates.
const MAX_TRANSITION_ATTEMPTS: u32 = 3;

/// Governs the booking status graph. Every mutation goes through
/// `transition`; anything not in the table fails without touching the
/// ledger.
pub struct BookingLifecycleService {
    ledger: Arc<dyn BookingLedger>,
    events: EventBus,
}

impl BookingLifecycleService {
    pub fn new(ledger: Arc<dyn BookingLedger>, events: EventBus) -> Self {
        Self { ledger, events }
    }

    /// All legal next statuses for a given current status. Completed,
    /// cancelled and no-show are terminal.
    pub fn valid_transitions(current: BookingStatus) -> Vec<BookingStatus> {
        match current {
            BookingStatus::Pending => vec![BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => vec![
                BookingStatus::Completed,
                BookingStatus::Cancelled,
                BookingStatus::NoShow,
            ],
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow => vec![],
        }
    }

    pub fn validate_transition(
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<(), BookingError> {
        if !Self::valid_transitions(from).contains(&to) {
            warn!("Invalid status transition attempted: {} -> {}", from, to);
            return Err(BookingError::InvalidTransition { from, to });
        }
        Ok(())
    }

    /// Apply a status change through a compare-and-swap against the
    /// booking's version. A lost race re-reads and re-validates, so a
    /// transition that became illegal mid-flight fails rather than
    /// clobbering the winner.
    pub async fn transition(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let current = self.ledger.get(booking_id).await?;
            let from = current.status;
            Self::validate_transition(from, new_status)?;

            match self
                .ledger
                .update_status(booking_id, current.version, new_status)
                .await
            {
                Ok(updated) => {
                    debug!(
                        "Booking {} transitioned {} -> {}",
                        booking_id, from, new_status
                    );
                    self.events.publish(BookingEvent::BookingStatusChanged {
                        booking: updated.clone(),
                        from,
                        to: new_status,
                    });
                    return Ok(updated);
                }
                Err(BookingError::Conflict { .. }) if attempt < MAX_TRANSITION_ATTEMPTS => {
                    warn!(
                        "Status race on booking {}, retrying ({}/{})",
                        booking_id, attempt, MAX_TRANSITION_ATTEMPTS
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(BookingError::Conflict {
            conflicting_booking_id: booking_id,
        })
    }

    /// Advisory: a confirmed booking whose start passed the grace window
    /// without check-in is a no-show candidate. The engine never applies
    /// this automatically; external schedulers decide.
    pub fn should_mark_no_show(booking: &Booking, now: DateTime<Utc>) -> bool {
        booking.status == BookingStatus::Confirmed
            && now > booking.start_time + Duration::minutes(NO_SHOW_GRACE_MINUTES)
    }

    /// Advisory: a confirmed booking whose end has passed may be marked
    /// done.
    pub fn is_due_completion(booking: &Booking, now: DateTime<Utc>) -> bool {
        booking.status == BookingStatus::Confirmed && now >= booking.end_time
    }
}
