//! Dispatch Service.
//!
//! The operator picks one pending trip and one available driver from the two views;
//! there is no ranking or automatic matching.

use std::sync::Arc;

use serde::Serialize;

use fasttrack_core::{Driver, DriverId, FastTrackError, Result, Trip, TripId, TripListing};
use fasttrack_store::Store;

use crate::lifecycle::{rejected, TripLifecycle};

/// The outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// The trip, now assigned.
    pub trip: Trip,
    /// Name of the dispatched driver.
    pub driver_name: String,
}

/// Serves the dispatch views and binds operator selections.
#[derive(Clone)]
pub struct DispatchService {
    store: Arc<dyn Store>,
    lifecycle: TripLifecycle,
}

impl DispatchService {
    /// Create a dispatch service that assigns through `lifecycle`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, lifecycle: TripLifecycle) -> Self {
        Self { store, lifecycle }
    }

    /// Requested trips without a driver, oldest booking first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn pending_trips(&self) -> Result<Vec<TripListing>> {
        Ok(self.store.list_pending_trips().await?)
    }

    /// Drivers free for a new assignment, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn available_drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.store.list_available_drivers().await?)
    }

    /// Dispatch the selected driver to the selected trip.
    ///
    /// Both rows are re-read first so that a selection made from stale lists is
    /// reported instead of attempted.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if either selection no longer exists.
    /// - `FastTrackError::Conflict` if the trip is no longer pending or the driver no
    ///   longer available. Both lists should be refreshed before retrying.
    pub async fn assign_selected(&self, trip_id: TripId, driver_id: DriverId) -> Result<Assignment> {
        let trip = self
            .store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| FastTrackError::trip_not_found(trip_id))?;
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| FastTrackError::driver_not_found(driver_id))?;

        if !trip.is_pending() {
            return Err(rejected(
                trip_id,
                FastTrackError::Conflict(format!(
                    "trip {trip_id} is no longer pending; refresh the pending list"
                )),
            ));
        }
        if !driver.available {
            return Err(rejected(
                trip_id,
                FastTrackError::Conflict(format!(
                    "driver {driver_id} is no longer available; refresh the driver list"
                )),
            ));
        }

        let trip = self.lifecycle.assign_rows(&trip, &driver).await?;
        tracing::info!(
            trip_id = %trip_id,
            driver_id = %driver_id,
            driver_name = %driver.name,
            "Driver dispatched"
        );

        Ok(Assignment {
            trip,
            driver_name: driver.name,
        })
    }
}
