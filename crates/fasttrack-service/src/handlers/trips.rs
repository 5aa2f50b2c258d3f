//! Trip lifecycle handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use fasttrack_core::{Payment, PaymentMethod, Trip, TripDetails, TripId};

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::handlers::TripsResponse;
use crate::state::AppState;

/// List every trip.
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TripsResponse>, ApiError> {
    Ok(Json(state.engine.registry.all_trips().await?.into()))
}

/// Get a trip.
pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Trip>, ApiError> {
    Ok(Json(state.engine.lifecycle.get_trip(trip_id).await?))
}

/// Replace the booked fields of a requested trip.
pub async fn edit_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
    AppJson(body): AppJson<TripDetails>,
) -> Result<Json<Trip>, ApiError> {
    Ok(Json(state.engine.lifecycle.edit_fields(trip_id, &body).await?))
}

/// Mark an assigned trip completed now.
pub async fn complete_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Trip>, ApiError> {
    Ok(Json(state.engine.lifecycle.complete(trip_id).await?))
}

/// Cancel a trip that is not yet completed or cancelled.
pub async fn cancel_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Trip>, ApiError> {
    Ok(Json(state.engine.lifecycle.cancel(trip_id).await?))
}

/// Payments for one trip.
#[derive(Debug, Serialize)]
pub struct TripPaymentsResponse {
    /// The trip.
    pub trip_id: TripId,
    /// Its payments, oldest first.
    pub payments: Vec<Payment>,
}

/// List a trip's payments.
pub async fn list_trip_payments(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<TripPaymentsResponse>, ApiError> {
    let payments = state.engine.booking.payments_for_trip(trip_id).await?;
    Ok(Json(TripPaymentsResponse { trip_id, payments }))
}

/// Record payment request.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Amount paid.
    pub amount: f64,
    /// Payment method; eSewa when omitted.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Record a further payment against a trip.
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
    AppJson(body): AppJson<RecordPaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .engine
        .booking
        .record_payment(trip_id, body.amount, body.method.unwrap_or_default())
        .await?;
    Ok(Json(payment))
}
