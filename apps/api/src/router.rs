use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::availability_routes;
use availability_cell::AvailabilityState;
use booking_cell::router::booking_routes;
use booking_cell::BookingState;

pub fn create_router(
    availability_state: Arc<AvailabilityState>,
    booking_state: Arc<BookingState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking engine is running!" }))
        .merge(availability_routes(availability_state))
        .merge(booking_routes(booking_state))
}
