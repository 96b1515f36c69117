pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::BookingState;
pub use models::*;
pub use router::booking_routes;
pub use services::admission::AdmissionService;
pub use services::events::{BookingEvent, BookingEventReceiver, EventBus};
pub use services::ledger::{BookingLedger, InMemoryBookingLedger};
pub use services::lifecycle::BookingLifecycleService;
pub use services::recurrence::RecurrenceService;
pub use services::reminders::ReminderScheduler;
