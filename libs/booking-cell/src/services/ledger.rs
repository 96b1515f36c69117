use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use availability_cell::services::slots::intervals_overlap;

use crate::models::{Booking, BookingError, BookingStatus};

/// Durable store of a provider's bookings. `insert_if_no_conflict` and
/// `update_status` are the engine's only write paths; both must be atomic
/// with respect to other writes for the same provider.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Bookings (any status) whose buffered span touches [from, to).
    async fn query(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError>;

    async fn get(&self, booking_id: Uuid) -> Result<Booking, BookingError>;

    /// Insert the booking unless its buffered interval overlaps an active
    /// booking's buffered interval; check and insert are one atomic step.
    async fn insert_if_no_conflict(&self, booking: Booking) -> Result<Booking, BookingError>;

    /// Compare-and-swap status update: fails with a conflict when the
    /// stored version no longer matches `expected_version`.
    async fn update_status(
        &self,
        booking_id: Uuid,
        expected_version: u64,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError>;
}

/// In-memory ledger. One mutex-guarded shelf per provider is the critical
/// section that serializes the validate-then-write admission step; it
/// contains no external I/O.
#[derive(Default)]
pub struct InMemoryBookingLedger {
    shelves: RwLock<HashMap<Uuid, Arc<Mutex<Vec<Booking>>>>>,
    providers: RwLock<HashMap<Uuid, Uuid>>,
}

impl InMemoryBookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn shelf(&self, provider_id: Uuid) -> Arc<Mutex<Vec<Booking>>> {
        {
            let shelves = self.shelves.read().await;
            if let Some(shelf) = shelves.get(&provider_id) {
                return Arc::clone(shelf);
            }
        }
        let mut shelves = self.shelves.write().await;
        Arc::clone(shelves.entry(provider_id).or_default())
    }

    async fn provider_of(&self, booking_id: Uuid) -> Result<Uuid, BookingError> {
        let providers = self.providers.read().await;
        providers
            .get(&booking_id)
            .copied()
            .ok_or_else(|| BookingError::NotFound(format!("Booking {} not found", booking_id)))
    }
}

#[async_trait]
impl BookingLedger for InMemoryBookingLedger {
    async fn query(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError> {
        let shelf = self.shelf(provider_id).await;
        let bookings = shelf.lock().await;
        let mut matched: Vec<Booking> = bookings
            .iter()
            .filter(|booking| intervals_overlap(booking.buffered_start(), booking.buffered_end(), from, to))
            .cloned()
            .collect();
        matched.sort_by_key(|booking| booking.start_time);
        Ok(matched)
    }

    async fn get(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let provider_id = self.provider_of(booking_id).await?;
        let shelf = self.shelf(provider_id).await;
        let bookings = shelf.lock().await;
        bookings
            .iter()
            .find(|booking| booking.id == booking_id)
            .cloned()
            .ok_or_else(|| BookingError::NotFound(format!("Booking {} not found", booking_id)))
    }

    async fn insert_if_no_conflict(&self, booking: Booking) -> Result<Booking, BookingError> {
        let shelf = self.shelf(booking.provider_id).await;
        let mut bookings = shelf.lock().await;

        if let Some(existing) = bookings.iter().find(|existing| {
            existing.status.is_active()
                && intervals_overlap(
                    booking.buffered_start(),
                    booking.buffered_end(),
                    existing.buffered_start(),
                    existing.buffered_end(),
                )
        }) {
            warn!(
                "Admission rejected: {} overlaps booking {}",
                booking.start_time, existing.id
            );
            return Err(BookingError::Conflict {
                conflicting_booking_id: existing.id,
            });
        }

        bookings.push(booking.clone());
        drop(bookings);

        let mut providers = self.providers.write().await;
        providers.insert(booking.id, booking.provider_id);
        debug!("Booking {} admitted for provider {}", booking.id, booking.provider_id);
        Ok(booking)
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        expected_version: u64,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let provider_id = self.provider_of(booking_id).await?;
        let shelf = self.shelf(provider_id).await;
        let mut bookings = shelf.lock().await;

        let booking = bookings
            .iter_mut()
            .find(|booking| booking.id == booking_id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.version != expected_version {
            // Lost a status race; the caller re-reads and re-validates.
            return Err(BookingError::Conflict {
                conflicting_booking_id: booking_id,
            });
        }

        booking.status = new_status;
        booking.version += 1;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }
}
