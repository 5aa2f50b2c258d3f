//! Trip lifecycle planning.
//!
//! The planners check an operation's preconditions against a snapshot of the trip
//! (and driver) and describe the resulting writes as a [`Transition`]. They do no I/O.
//! The store applies a transition as a compare-and-swap: the trip row is only
//! written while it still has `expected_status` and `expected_driver`, and the driver
//! row only while its flag still equals `AvailabilityChange::expected`. A snapshot
//! that went stale between planning and writing therefore fails instead of
//! overwriting someone else's change.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{Driver, DriverId, FastTrackError, Result, Trip, TripId, TripStatus, TripUpdate};

/// The operations that write to a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Dispatch a driver.
    Assign,
    /// Driver finished the ride.
    Complete,
    /// Any party called it off.
    Cancel,
    /// Customer changed the booked fields.
    Edit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assign => "assign",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Edit => "edit",
        })
    }
}

/// What happens to `dropoff_date` / `dropoff_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropoffChange {
    /// Leave both columns as they are.
    Keep,
    /// Stamp both columns.
    Set {
        /// Dropoff date.
        date: NaiveDate,
        /// Dropoff time.
        time: NaiveTime,
    },
    /// Null both columns.
    Clear,
}

/// A write to `driver.available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityChange {
    /// The driver whose flag changes.
    pub driver_id: DriverId,
    /// The new flag value.
    pub available: bool,
    /// When set, the write only happens while the flag still has this value.
    pub expected: Option<bool>,
}

/// The complete set of writes an operation performs, together with the row state it
/// was planned against.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The trip being written.
    pub trip_id: TripId,
    /// The operation that produced this plan.
    pub operation: Operation,
    /// Status the trip must still have.
    pub expected_status: TripStatus,
    /// Driver reference the trip must still have.
    pub expected_driver: Option<DriverId>,
    /// Status after the write.
    pub status: TripStatus,
    /// Driver to attach, if any. Never used to detach.
    pub attach_driver: Option<DriverId>,
    /// Dropoff column change.
    pub dropoff: DropoffChange,
    /// Replacement booked fields (edits only).
    pub fields: Option<TripUpdate>,
    /// Driver flag change.
    pub availability: Option<AvailabilityChange>,
}

impl Transition {
    fn from_snapshot(trip: &Trip, operation: Operation, status: TripStatus) -> Self {
        Self {
            trip_id: trip.id,
            operation,
            expected_status: trip.status,
            expected_driver: trip.driver_id,
            status,
            attach_driver: None,
            dropoff: DropoffChange::Keep,
            fields: None,
            availability: None,
        }
    }

    /// Release the trip's driver, if it has one.
    fn releasing_driver(mut self, trip: &Trip) -> Self {
        self.availability = trip.driver_id.map(|driver_id| AvailabilityChange {
            driver_id,
            available: true,
            expected: None,
        });
        self
    }
}

fn invalid_state(trip: &Trip, operation: Operation) -> FastTrackError {
    FastTrackError::InvalidState {
        trip_id: trip.id,
        status: trip.status,
        operation,
    }
}

/// Plan dispatching `driver` to `trip`.
///
/// # Errors
///
/// Returns `FastTrackError::Conflict` when the trip is no longer requested, already has
/// a driver, or the driver is not available.
pub fn plan_assign(trip: &Trip, driver: &Driver) -> Result<Transition> {
    if trip.status != TripStatus::Requested {
        return Err(FastTrackError::Conflict(format!(
            "trip {} is no longer pending (status {})",
            trip.id, trip.status
        )));
    }
    if let Some(current) = trip.driver_id {
        return Err(FastTrackError::Conflict(format!(
            "trip {} already has driver {current}",
            trip.id
        )));
    }
    if !driver.available {
        return Err(FastTrackError::Conflict(format!(
            "driver {} is not available",
            driver.id
        )));
    }

    let mut transition = Transition::from_snapshot(trip, Operation::Assign, TripStatus::Assigned);
    transition.attach_driver = Some(driver.id);
    transition.availability = Some(AvailabilityChange {
        driver_id: driver.id,
        available: false,
        expected: Some(true),
    });
    Ok(transition)
}

/// Plan completing `trip` at wall-clock instant `at` (stored to the second).
///
/// # Errors
///
/// Returns `FastTrackError::InvalidState` unless the trip is assigned.
pub fn plan_complete(trip: &Trip, at: NaiveDateTime) -> Result<Transition> {
    if !trip.status.can_transition_to(TripStatus::Completed) {
        return Err(invalid_state(trip, Operation::Complete));
    }

    let time = at.time();
    let mut transition = Transition::from_snapshot(trip, Operation::Complete, TripStatus::Completed)
        .releasing_driver(trip);
    transition.dropoff = DropoffChange::Set {
        date: at.date(),
        time: time.with_nanosecond(0).unwrap_or(time),
    };
    Ok(transition)
}

/// Plan cancelling `trip`.
///
/// # Errors
///
/// Returns `FastTrackError::InvalidState` when the trip is already terminal.
pub fn plan_cancel(trip: &Trip) -> Result<Transition> {
    if !trip.status.can_transition_to(TripStatus::Cancelled) {
        return Err(invalid_state(trip, Operation::Cancel));
    }

    let mut transition = Transition::from_snapshot(trip, Operation::Cancel, TripStatus::Cancelled)
        .releasing_driver(trip);
    transition.dropoff = DropoffChange::Clear;
    Ok(transition)
}

/// Plan replacing the booked fields of `trip`.
///
/// # Errors
///
/// Returns `FastTrackError::InvalidState` unless the trip is still requested.
pub fn plan_edit(trip: &Trip, fields: TripUpdate) -> Result<Transition> {
    if trip.status != TripStatus::Requested {
        return Err(invalid_state(trip, Operation::Edit));
    }

    let mut transition = Transition::from_snapshot(trip, Operation::Edit, TripStatus::Requested);
    transition.fields = Some(fields);
    Ok(transition)
}
