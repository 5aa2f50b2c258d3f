//! Operator dispatch handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use fasttrack_core::{Driver, DriverId, TripId};
use fasttrack_engine::Assignment;

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::handlers::TripsResponse;
use crate::state::AppState;

/// Requested trips waiting for a driver, oldest first.
pub async fn pending_trips(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TripsResponse>, ApiError> {
    Ok(Json(state.engine.dispatch.pending_trips().await?.into()))
}

/// A list of drivers.
#[derive(Debug, Serialize)]
pub struct DriversResponse {
    /// The drivers.
    pub drivers: Vec<Driver>,
}

/// Drivers free for assignment, by name.
pub async fn available_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriversResponse>, ApiError> {
    let drivers = state.engine.dispatch.available_drivers().await?;
    Ok(Json(DriversResponse { drivers }))
}

/// Assign request: the operator's selection from the two views.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Selected pending trip.
    pub trip_id: TripId,
    /// Selected available driver.
    pub driver_id: DriverId,
}

/// Dispatch the selected driver to the selected trip.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<AssignRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .engine
        .dispatch
        .assign_selected(body.trip_id, body.driver_id)
        .await?;
    Ok(Json(assignment))
}
