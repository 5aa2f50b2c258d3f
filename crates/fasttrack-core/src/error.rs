//! Error types for FastTrack.

use crate::trip::TripStatus;
use crate::TripId;

/// Result type for FastTrack operations.
pub type Result<T> = std::result::Result<T, FastTrackError>;

/// Errors that can occur in FastTrack operations.
///
/// None of these are retried automatically. Every failure leaves the rows as they were
/// and the caller decides whether to refresh and try the whole operation again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FastTrackError {
    /// Malformed caller input, rejected before anything was read or written.
    #[error("validation error: {0}")]
    Validation(String),

    /// A precondition no longer held when the write was attempted (trip already
    /// taken, driver already busy). The caller must re-fetch both candidate lists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The trip's status forbids the requested operation.
    #[error("cannot {operation} trip {trip_id} while it is {status}")]
    InvalidState {
        /// The trip the operation targeted.
        trip_id: TripId,
        /// The status the trip was found in.
        status: TripStatus,
        /// The rejected operation.
        operation: crate::Operation,
    },

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of row (trip, driver, customer, payment).
        entity: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },

    /// A unique column already holds this value.
    #[error("{entity} with this {field} already exists")]
    Duplicate {
        /// The kind of row.
        entity: &'static str,
        /// The unique column.
        field: &'static str,
    },

    /// The persistence gateway failed; the operation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl FastTrackError {
    /// Shorthand for a `NotFound` on a trip.
    #[must_use]
    pub fn trip_not_found(id: TripId) -> Self {
        Self::NotFound {
            entity: "trip",
            id: id.get(),
        }
    }

    /// Shorthand for a `NotFound` on a driver.
    #[must_use]
    pub fn driver_not_found(id: crate::DriverId) -> Self {
        Self::NotFound {
            entity: "driver",
            id: id.get(),
        }
    }

    /// Shorthand for a `NotFound` on a customer.
    #[must_use]
    pub fn customer_not_found(id: crate::CustomerId) -> Self {
        Self::NotFound {
            entity: "customer",
            id: id.get(),
        }
    }
}
