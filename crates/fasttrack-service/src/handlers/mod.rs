//! API handlers.

pub mod customers;
pub mod dispatch;
pub mod drivers;
pub mod health;
pub mod payments;
pub mod trips;

use fasttrack_core::TripListing;
use serde::Serialize;

/// A list of trips.
#[derive(Debug, Serialize)]
pub struct TripsResponse {
    /// Trips with the names of their parties.
    pub trips: Vec<TripListing>,
}

impl From<Vec<TripListing>> for TripsResponse {
    fn from(trips: Vec<TripListing>) -> Self {
        Self { trips }
    }
}
