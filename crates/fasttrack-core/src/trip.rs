//! Trip types for FastTrack.
//!
//! A trip is one ride request and its status through the lifecycle. Trips are never
//! deleted; cancellation is a status.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::validation;
use crate::{CustomerId, DriverId, PaymentMethod, Result, TripId};

/// Storage and wire format of trip dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage and wire format of trip times (24 hour clock).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Status of a trip.
///
/// Only the edges `requested → assigned → completed` and
/// `requested | assigned → cancelled` exist. Rows written by older versions of the
/// system may carry other status text (`paid`); those read as `Unrecognized`, which is
/// not terminal and can only be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Booked by a customer, waiting for dispatch.
    Requested,
    /// A driver has been dispatched.
    Assigned,
    /// The driver finished the ride. Terminal.
    Completed,
    /// Cancelled by any party before completion. Terminal.
    Cancelled,
    /// Stored text outside the four states above. Never written.
    Unrecognized,
}

impl TripStatus {
    /// The lifecycle statuses, in order.
    pub const ALL: [Self; 4] = [
        Self::Requested,
        Self::Assigned,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The text stored in `trip.status`. `Unrecognized` has no stored form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Read a stored `trip.status` column. A null status is `Requested`; text outside
    /// the lifecycle is `Unrecognized`.
    #[must_use]
    pub fn from_stored(text: Option<&str>) -> Self {
        text.map_or(Self::Requested, |t| t.parse().unwrap_or(Self::Unrecognized))
    }

    /// Whether no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `self → next` is an edge of the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Assigned | Self::Cancelled)
                | (Self::Assigned, Self::Completed | Self::Cancelled)
                | (Self::Unrecognized, Self::Cancelled)
        )
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when stored status text is not one of the four lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trip status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for TripStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requested" => Ok(Self::Requested),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A persisted trip row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Trip ID.
    pub id: TripId,
    /// Owning customer; `None` once the customer row has been removed.
    pub customer_id: Option<CustomerId>,
    /// Dispatched driver. Set when the trip leaves `requested` and kept afterwards.
    pub driver_id: Option<DriverId>,
    /// Pickup location.
    pub pickup: String,
    /// Dropoff location.
    pub dropoff: String,
    /// Requested pickup date.
    pub pickup_date: NaiveDate,
    /// Requested pickup time.
    pub pickup_time: NaiveTime,
    /// Dropoff date, stamped on completion.
    pub dropoff_date: Option<NaiveDate>,
    /// Dropoff time, stamped on completion.
    pub dropoff_time: Option<NaiveTime>,
    /// Fare charged at booking.
    pub fare: f64,
    /// Lifecycle status.
    pub status: TripStatus,
    /// The stored status text when `status` is `Unrecognized`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// When the booking was stored.
    pub created_at: Option<NaiveDateTime>,
}

impl Trip {
    /// Whether the trip sits in the dispatch queue (requested, no driver).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TripStatus::Requested && self.driver_id.is_none()
    }

    /// Whether the trip is completed or cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A trip row joined with the display names of its parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripListing {
    /// The trip itself.
    #[serde(flatten)]
    pub trip: Trip,
    /// Customer name, if the customer still exists.
    pub customer_name: Option<String>,
    /// Driver name, if a driver is attached and still exists.
    pub driver_name: Option<String>,
}

/// Trip fields as entered by the caller, before validation.
///
/// Dates and times arrive as text so that a malformed value is reported as a
/// validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripDetails {
    /// Pickup location.
    pub pickup: String,
    /// Dropoff location.
    pub dropoff: String,
    /// Pickup date, `YYYY-MM-DD`.
    pub pickup_date: String,
    /// Pickup time, `HH:MM:SS`.
    pub pickup_time: String,
    /// Optional dropoff date, `YYYY-MM-DD`. Blank means none.
    #[serde(default)]
    pub dropoff_date: Option<String>,
    /// Optional dropoff time, `HH:MM:SS`. Blank means none.
    #[serde(default)]
    pub dropoff_time: Option<String>,
    /// Fare.
    pub fare: f64,
}

impl TripDetails {
    /// Validate every field and convert to typed values.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<TripUpdate> {
        let pickup = validation::required("pickup", &self.pickup)?;
        let dropoff = validation::required("dropoff", &self.dropoff)?;
        let pickup_date = validation::parse_date("pickup_date", &self.pickup_date)?;
        let pickup_time = validation::parse_time("pickup_time", &self.pickup_time)?;
        let dropoff_date = validation::optional(self.dropoff_date.as_deref())
            .map(|s| validation::parse_date("dropoff_date", s))
            .transpose()?;
        let dropoff_time = validation::optional(self.dropoff_time.as_deref())
            .map(|s| validation::parse_time("dropoff_time", s))
            .transpose()?;
        let fare = validation::fare(self.fare)?;

        Ok(TripUpdate {
            pickup,
            dropoff,
            pickup_date,
            pickup_time,
            dropoff_date,
            dropoff_time,
            fare,
        })
    }
}

/// Validated, typed trip fields. Used both for booking and for edits of a
/// requested trip; an edit replaces all of them at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripUpdate {
    /// Pickup location.
    pub pickup: String,
    /// Dropoff location.
    pub dropoff: String,
    /// Pickup date.
    pub pickup_date: NaiveDate,
    /// Pickup time.
    pub pickup_time: NaiveTime,
    /// Dropoff date.
    pub dropoff_date: Option<NaiveDate>,
    /// Dropoff time.
    pub dropoff_time: Option<NaiveTime>,
    /// Fare.
    pub fare: f64,
}

/// A trip about to be inserted. Always `requested` with no driver.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    /// Booking customer.
    pub customer_id: CustomerId,
    /// Booked fields.
    pub fields: TripUpdate,
}

/// A customer's booking: trip details plus the payment method used to pay the fare.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Trip details.
    #[serde(flatten)]
    pub details: TripDetails,
    /// Payment method; eSewa when omitted.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}
