pub mod admission;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod recurrence;
pub mod reminders;
