//! Driver administration handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use fasttrack_core::{Driver, DriverId, DriverUpdate, NewDriver};

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::handlers::dispatch::DriversResponse;
use crate::handlers::TripsResponse;
use crate::state::AppState;

/// List every driver.
pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriversResponse>, ApiError> {
    let drivers = state.engine.registry.list_drivers().await?;
    Ok(Json(DriversResponse { drivers }))
}

/// Add a driver.
pub async fn add_driver(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<NewDriver>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.engine.registry.add_driver(&body).await?))
}

/// Get a driver.
pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<DriverId>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.engine.registry.get_driver(driver_id).await?))
}

/// Update a driver's profile.
pub async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<DriverId>,
    AppJson(body): AppJson<DriverUpdate>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(
        state.engine.registry.update_driver(driver_id, &body).await?,
    ))
}

/// Delete a driver.
pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<DriverId>,
) -> Result<StatusCode, ApiError> {
    state.engine.registry.delete_driver(driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A driver's active trips. Restores a stray unavailable flag when none is assigned.
pub async fn active_trips(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<DriverId>,
) -> Result<Json<TripsResponse>, ApiError> {
    let trips = state.engine.lifecycle.driver_active_trips(driver_id).await?;
    Ok(Json(trips.into()))
}
