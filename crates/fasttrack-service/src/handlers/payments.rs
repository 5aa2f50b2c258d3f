//! Payment history handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use fasttrack_core::Payment;

use crate::error::ApiError;
use crate::state::AppState;

/// Payment history response.
#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    /// Every payment, by ID.
    pub payments: Vec<Payment>,
    /// How many of them are not linked to a trip.
    pub orphaned: usize,
}

/// List every payment.
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PaymentsResponse>, ApiError> {
    let payments = state.engine.booking.all_payments().await?;
    let orphaned = payments.iter().filter(|p| p.is_orphan()).count();
    Ok(Json(PaymentsResponse { payments, orphaned }))
}
