use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityError, DayHours, WeeklyHours};

/// Read port over a provider's operating hours and dated closures. The
/// engine only ever reads snapshots through this trait; mutation lives on
/// the concrete store and belongs to the provider-configuration surface.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn hours(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
    ) -> Result<DayHours, AvailabilityError>;

    async fn exceptions(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AvailabilityError>;

    async fn is_exception(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError>;
}

#[derive(Debug, Default)]
struct CalendarEntry {
    hours: WeeklyHours,
    exceptions: HashSet<NaiveDate>,
}

/// In-memory calendar store.
#[derive(Default)]
pub struct InMemoryCalendar {
    calendars: RwLock<HashMap<Uuid, CalendarEntry>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one weekday's hours, creating the provider's calendar on
    /// first write.
    pub async fn set_hours(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
        hours: DayHours,
    ) -> Result<(), AvailabilityError> {
        if !hours.closed && hours.open >= hours.close {
            return Err(AvailabilityError::Validation(
                "Opening time must be before closing time".to_string(),
            ));
        }

        let mut calendars = self.calendars.write().await;
        let entry = calendars.entry(provider_id).or_default();
        entry.hours.set_day(weekday, hours);
        debug!("Updated hours for provider {} on {:?}", provider_id, weekday);
        Ok(())
    }

    pub async fn weekly_hours(&self, provider_id: Uuid) -> Result<WeeklyHours, AvailabilityError> {
        let calendars = self.calendars.read().await;
        calendars
            .get(&provider_id)
            .map(|entry| entry.hours.clone())
            .ok_or(AvailabilityError::CalendarNotFound)
    }

    pub async fn add_exception(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<(), AvailabilityError> {
        let mut calendars = self.calendars.write().await;
        let entry = calendars.entry(provider_id).or_default();
        entry.exceptions.insert(date);
        debug!("Added closure exception for provider {} on {}", provider_id, date);
        Ok(())
    }

    pub async fn remove_exception(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        let mut calendars = self.calendars.write().await;
        let removed = calendars
            .get_mut(&provider_id)
            .map(|entry| entry.exceptions.remove(&date))
            .unwrap_or(false);
        Ok(removed)
    }
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    async fn hours(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
    ) -> Result<DayHours, AvailabilityError> {
        let calendars = self.calendars.read().await;
        calendars
            .get(&provider_id)
            .map(|entry| entry.hours.day(weekday))
            .ok_or(AvailabilityError::CalendarNotFound)
    }

    async fn exceptions(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        let calendars = self.calendars.read().await;
        let mut dates: Vec<NaiveDate> = calendars
            .get(&provider_id)
            .map(|entry| {
                entry
                    .exceptions
                    .iter()
                    .filter(|date| **date >= from && **date <= to)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        dates.sort();
        Ok(dates)
    }

    async fn is_exception(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        let calendars = self.calendars.read().await;
        Ok(calendars
            .get(&provider_id)
            .map(|entry| entry.exceptions.contains(&date))
            .unwrap_or(false))
    }
}
