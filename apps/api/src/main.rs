use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use availability_cell::{AvailabilityState, InMemoryCalendar, InMemoryCatalog};
use booking_cell::{BookingState, InMemoryBookingLedger};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking engine API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Shared stores: the provider-configuration surface mutates them, the
    // engine reads them through its ports.
    let calendar = Arc::new(InMemoryCalendar::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let ledger = Arc::new(InMemoryBookingLedger::new());

    let availability_state = Arc::new(AvailabilityState {
        calendar: Arc::clone(&calendar),
        catalog: Arc::clone(&catalog),
    });
    let booking_state = Arc::new(BookingState::new(
        config.clone(),
        calendar,
        catalog,
        ledger,
    ));

    // Build the application router
    let app = router::create_router(availability_state, booking_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_address);

    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
