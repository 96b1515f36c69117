pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::AvailabilityState;
pub use models::*;
pub use router::availability_routes;
pub use services::calendar::{CalendarProvider, InMemoryCalendar};
pub use services::catalog::{InMemoryCatalog, ServiceCatalog};
pub use services::slots::SlotGenerator;
