// libs/availability-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{self, AvailabilityState};

pub fn availability_routes(state: Arc<AvailabilityState>) -> Router {
    Router::new()
        // Operating hours template
        .route("/providers/{provider_id}/hours", get(handlers::get_weekly_hours))
        .route(
            "/providers/{provider_id}/hours/{day_of_week}",
            put(handlers::set_day_hours),
        )
        // Dated closures
        .route("/providers/{provider_id}/exceptions", get(handlers::list_exceptions))
        .route("/providers/{provider_id}/exceptions", post(handlers::add_exception))
        .route(
            "/providers/{provider_id}/exceptions/{date}",
            delete(handlers::remove_exception),
        )
        // Service catalog
        .route("/providers/{provider_id}/services", post(handlers::create_service))
        .route("/providers/{provider_id}/services", get(handlers::list_services))
        .route("/services/{service_id}", get(handlers::get_service))
        .with_state(state)
}
