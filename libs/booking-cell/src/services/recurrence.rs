use chrono::{DateTime, Datelike, Duration, Months, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    BookingError, BookingRequest, RecurrenceFrequency, RecurrenceRule, RejectedOccurrence,
    RejectionReason, SeriesOutcome,
};
use crate::services::admission::AdmissionService;

/// Expands one recurring request into independently-admitted bookings.
/// Bounded and eager: occurrences are generated up front and each one is
/// admitted (or rejected) on its own; there is no cross-occurrence
/// atomicity and a rejection never aborts the rest of the series.
pub struct RecurrenceService {
    admission: Arc<AdmissionService>,
    max_count: u32,
}

impl RecurrenceService {
    pub fn new(admission: Arc<AdmissionService>, max_count: u32) -> Self {
        Self { admission, max_count }
    }

    pub async fn expand(
        &self,
        anchor: &BookingRequest,
        rule: RecurrenceRule,
        now: DateTime<Utc>,
    ) -> Result<SeriesOutcome, BookingError> {
        if rule.count == 0 {
            return Err(BookingError::Validation(
                "Recurrence count must be positive".to_string(),
            ));
        }
        if rule.count > self.max_count {
            return Err(BookingError::Validation(format!(
                "Recurrence count must not exceed {}",
                self.max_count
            )));
        }

        let recurrence_group_id = Uuid::new_v4();
        let mut admitted = Vec::new();
        let mut rejected = Vec::new();

        for index in 0..rule.count {
            let start = match occurrence_start(anchor.start_time, rule.frequency, index) {
                Some(start) => start,
                None => {
                    // The target month has no such day-of-month; skip this
                    // occurrence, keep the series going.
                    rejected.push(RejectedOccurrence {
                        date: approximate_occurrence_date(anchor.start_time, rule.frequency, index),
                        reason: RejectionReason::InvalidDate,
                    });
                    continue;
                }
            };

            let request = BookingRequest {
                service_id: anchor.service_id,
                start_time: start,
                client_ref: anchor.client_ref.clone(),
            };

            match self
                .admission
                .admit_in_group(&request, Some(recurrence_group_id), now)
                .await
            {
                Ok(booking) => admitted.push(booking),
                Err(err) => {
                    debug!(
                        "Series occurrence on {} rejected: {}",
                        start.date_naive(),
                        err
                    );
                    rejected.push(RejectedOccurrence {
                        date: start.date_naive(),
                        reason: rejection_reason(&err),
                    });
                }
            }
        }

        info!(
            "Series {} expanded: {} admitted, {} rejected",
            recurrence_group_id,
            admitted.len(),
            rejected.len()
        );

        Ok(SeriesOutcome {
            recurrence_group_id,
            admitted,
            rejected,
        })
    }
}

/// Start instant of occurrence `index` (0 = the anchor itself). Weekly
/// steps preserve the anchor's weekday and time of day; monthly steps
/// preserve its day-of-month and return None when the target month lacks
/// that day.
pub fn occurrence_start(
    anchor: DateTime<Utc>,
    frequency: RecurrenceFrequency,
    index: u32,
) -> Option<DateTime<Utc>> {
    match frequency {
        RecurrenceFrequency::Weekly => Some(anchor + Duration::weeks(index as i64)),
        RecurrenceFrequency::Monthly => {
            let shifted = anchor.checked_add_months(Months::new(index))?;
            // chrono clamps a missing day-of-month to the month's end;
            // treat the clamp as a skipped occurrence instead.
            if shifted.day() != anchor.day() {
                return None;
            }
            Some(shifted)
        }
    }
}

fn approximate_occurrence_date(
    anchor: DateTime<Utc>,
    frequency: RecurrenceFrequency,
    index: u32,
) -> chrono::NaiveDate {
    match frequency {
        RecurrenceFrequency::Weekly => (anchor + Duration::weeks(index as i64)).date_naive(),
        RecurrenceFrequency::Monthly => anchor
            .checked_add_months(Months::new(index))
            .map(|shifted| shifted.date_naive())
            .unwrap_or_else(|| anchor.date_naive()),
    }
}

fn rejection_reason(err: &BookingError) -> RejectionReason {
    match err {
        BookingError::Conflict { .. } => RejectionReason::Conflict,
        BookingError::Storage(_) => RejectionReason::Storage,
        _ => RejectionReason::Validation,
    }
}
