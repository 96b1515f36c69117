// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, BookingState};

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/availability", get(handlers::availability))
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings", get(handlers::search_bookings))
        .route("/bookings/{booking_id}", get(handlers::get_booking))
        .route(
            "/bookings/{booking_id}/transition",
            post(handlers::transition_booking),
        )
        .with_state(state)
}
