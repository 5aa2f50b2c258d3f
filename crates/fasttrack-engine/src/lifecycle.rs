//! Trip Lifecycle Controller.
//!
//! Each operation reads the current trip (and driver) rows, plans the transition with
//! the pure planners from `fasttrack_core::lifecycle`, and hands the plan to the store,
//! which writes it only if both rows are still as they were read. A lost race therefore
//! surfaces as `FastTrackError::Conflict` with nothing written.

use std::sync::Arc;

use chrono::NaiveDateTime;

use fasttrack_core::{
    plan_assign, plan_cancel, plan_complete, plan_edit, Driver, DriverId, FastTrackError,
    Result, Transition, Trip, TripDetails, TripId, TripListing, TripStatus,
};
use fasttrack_store::Store;

/// Owns every trip status transition.
#[derive(Clone)]
pub struct TripLifecycle {
    store: Arc<dyn Store>,
}

impl TripLifecycle {
    /// Create a controller over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get a trip by ID.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the trip doesn't exist.
    pub async fn get_trip(&self, trip_id: TripId) -> Result<Trip> {
        self.store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| FastTrackError::trip_not_found(trip_id))
    }

    async fn get_driver(&self, driver_id: DriverId) -> Result<Driver> {
        self.store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| FastTrackError::driver_not_found(driver_id))
    }

    /// Dispatch `driver_id` to `trip_id`.
    ///
    /// Both rows are re-read here, immediately before the guarded write.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if either row is missing.
    /// - `FastTrackError::Conflict` if the trip is no longer pending or the driver is
    ///   no longer available, whether that is seen on the read or at the write.
    pub async fn assign(&self, trip_id: TripId, driver_id: DriverId) -> Result<Trip> {
        let trip = self.get_trip(trip_id).await?;
        let driver = self.get_driver(driver_id).await?;
        self.assign_rows(&trip, &driver).await
    }

    /// Dispatch using rows the caller has just read.
    pub(crate) async fn assign_rows(&self, trip: &Trip, driver: &Driver) -> Result<Trip> {
        let transition = plan_assign(trip, driver).map_err(|err| rejected(trip.id, err))?;
        self.apply(&transition).await
    }

    /// Mark an assigned trip completed at the current local wall-clock time.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if the trip doesn't exist.
    /// - `FastTrackError::InvalidState` unless the trip is assigned.
    pub async fn complete(&self, trip_id: TripId) -> Result<Trip> {
        self.complete_at(trip_id, chrono::Local::now().naive_local())
            .await
    }

    /// Mark an assigned trip completed at `at`. Stamps the dropoff date and time and
    /// releases the driver.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if the trip doesn't exist.
    /// - `FastTrackError::InvalidState` unless the trip is assigned.
    /// - `FastTrackError::Conflict` if the trip changed after it was read.
    pub async fn complete_at(&self, trip_id: TripId, at: NaiveDateTime) -> Result<Trip> {
        let trip = self.get_trip(trip_id).await?;
        let transition = plan_complete(&trip, at).map_err(|err| rejected(trip_id, err))?;
        self.apply(&transition).await
    }

    /// Cancel a trip that has not reached a terminal status. Clears the dropoff
    /// columns and releases the driver, if one is attached.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if the trip doesn't exist.
    /// - `FastTrackError::InvalidState` if the trip is completed or cancelled.
    /// - `FastTrackError::Conflict` if the trip changed after it was read.
    pub async fn cancel(&self, trip_id: TripId) -> Result<Trip> {
        let trip = self.get_trip(trip_id).await?;
        let transition = plan_cancel(&trip).map_err(|err| rejected(trip_id, err))?;
        self.apply(&transition).await
    }

    /// Replace the booked fields of a requested trip in one write.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` if any field is malformed. Nothing is read.
    /// - `FastTrackError::NotFound` if the trip doesn't exist.
    /// - `FastTrackError::InvalidState` unless the trip is requested.
    /// - `FastTrackError::Conflict` if the trip changed after it was read.
    pub async fn edit_fields(&self, trip_id: TripId, details: &TripDetails) -> Result<Trip> {
        let fields = details.validate()?;
        let trip = self.get_trip(trip_id).await?;
        let transition = plan_edit(&trip, fields).map_err(|err| rejected(trip_id, err))?;
        self.apply(&transition).await
    }

    /// List a driver's non-terminal trips, newest first.
    ///
    /// If none of them is assigned but the driver is flagged unavailable, the flag is
    /// restored as part of this read. That divergence can only come from rows written
    /// outside this engine, such as a trip left with a legacy `paid` status.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the driver doesn't exist.
    pub async fn driver_active_trips(&self, driver_id: DriverId) -> Result<Vec<TripListing>> {
        let driver = self.get_driver(driver_id).await?;
        let trips = self.store.list_active_trips_by_driver(driver_id).await?;

        let holds_trip = trips.iter().any(|l| l.trip.status == TripStatus::Assigned);
        if !holds_trip
            && !driver.available
            && self.store.release_idle_driver(driver_id).await?
        {
            tracing::warn!(
                driver_id = %driver_id,
                "Driver was unavailable with no assigned trip; availability restored"
            );
        }

        Ok(trips)
    }

    async fn apply(&self, transition: &Transition) -> Result<Trip> {
        match self.store.apply_transition(transition).await {
            Ok(trip) => {
                tracing::info!(
                    trip_id = %trip.id,
                    driver_id = ?trip.driver_id,
                    operation = %transition.operation,
                    status = %trip.status,
                    "Trip transition applied"
                );
                Ok(trip)
            }
            Err(err) => Err(rejected(transition.trip_id, err.into())),
        }
    }
}

/// Log a failed operation at the level its kind deserves and pass it on.
pub(crate) fn rejected(trip_id: TripId, err: FastTrackError) -> FastTrackError {
    match &err {
        FastTrackError::Persistence(_) => {
            tracing::error!(trip_id = %trip_id, error = %err, "Trip operation failed");
        }
        _ => tracing::warn!(trip_id = %trip_id, error = %err, "Trip operation rejected"),
    }
    err
}
