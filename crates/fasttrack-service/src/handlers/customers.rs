//! Customer registration and booking handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use fasttrack_core::{BookingRequest, Customer, CustomerId, NewCustomer};
use fasttrack_engine::Booking;

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::handlers::TripsResponse;
use crate::state::AppState;

/// Register a customer.
pub async fn register_customer(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<NewCustomer>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state.engine.registry.register_customer(&body).await?;
    Ok(Json(customer))
}

/// Get a customer.
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.engine.registry.get_customer(customer_id).await?))
}

/// List a customer's trips, newest first.
pub async fn customer_trips(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<TripsResponse>, ApiError> {
    let trips = state.engine.registry.customer_trips(customer_id).await?;
    Ok(Json(trips.into()))
}

/// Book a trip and record its fare payment.
pub async fn book_trip(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    AppJson(body): AppJson<BookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state.engine.booking.book(customer_id, &body).await?;
    Ok(Json(booking))
}
