//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{customers, dispatch, drivers, health, payments, trips};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Customers
/// - `POST /v1/customers` - Register customer
/// - `GET /v1/customers/:id` - Get customer
/// - `GET /v1/customers/:id/trips` - Customer's trips, newest first
/// - `POST /v1/customers/:id/bookings` - Book a trip and pay its fare
///
/// ## Trips
/// - `GET /v1/trips` - All trips
/// - `GET /v1/trips/:id` - Get trip
/// - `PUT /v1/trips/:id` - Edit a requested trip
/// - `POST /v1/trips/:id/complete` - Complete an assigned trip
/// - `POST /v1/trips/:id/cancel` - Cancel a trip
/// - `GET /v1/trips/:id/payments` - Trip payments
/// - `POST /v1/trips/:id/payments` - Record a payment
///
/// ## Dispatch
/// - `GET /v1/dispatch/pending` - Pending trips
/// - `GET /v1/dispatch/drivers` - Available drivers
/// - `POST /v1/dispatch/assign` - Assign the selected driver to the selected trip
///
/// ## Drivers
/// - `GET /v1/drivers` - All drivers
/// - `POST /v1/drivers` - Add driver
/// - `GET /v1/drivers/:id` - Get driver
/// - `PUT /v1/drivers/:id` - Update driver
/// - `DELETE /v1/drivers/:id` - Delete driver
/// - `GET /v1/drivers/:id/trips` - Driver's active trips
///
/// ## Payments
/// - `GET /v1/payments` - All payments
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Customers
        .route("/customers", post(customers::register_customer))
        .route("/customers/:id", get(customers::get_customer))
        .route("/customers/:id/trips", get(customers::customer_trips))
        .route("/customers/:id/bookings", post(customers::book_trip))
        // Trips
        .route("/trips", get(trips::list_trips))
        .route("/trips/:id", get(trips::get_trip).put(trips::edit_trip))
        .route("/trips/:id/complete", post(trips::complete_trip))
        .route("/trips/:id/cancel", post(trips::cancel_trip))
        .route(
            "/trips/:id/payments",
            get(trips::list_trip_payments).post(trips::record_payment),
        )
        // Dispatch
        .route("/dispatch/pending", get(dispatch::pending_trips))
        .route("/dispatch/drivers", get(dispatch::available_drivers))
        .route("/dispatch/assign", post(dispatch::assign))
        // Drivers
        .route("/drivers", get(drivers::list_drivers).post(drivers::add_driver))
        .route(
            "/drivers/:id",
            get(drivers::get_driver)
                .put(drivers::update_driver)
                .delete(drivers::delete_driver),
        )
        .route("/drivers/:id/trips", get(drivers::active_trips))
        // Payments
        .route("/payments", get(payments::list_payments))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// CORS for the configured origins. `*` admits any origin; entries that are not valid
/// header values are skipped with a warning.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
