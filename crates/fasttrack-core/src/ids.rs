//! Identifier types for FastTrack.
//!
//! Every table uses an `INTEGER PRIMARY KEY`, so identifiers are thin newtypes over the
//! SQLite rowid. Keeping them distinct stops a driver id from being passed where a trip id
//! is expected.
//!
//! # Macro-based ID Types
//!
//! The `row_id_type!` macro generates the newtype together with its serialization,
//! parsing and display traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to define a rowid-based identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `i64` with implementations for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as a bare integer)
/// - `FromStr`, `Display`, `Debug`
/// - `From<i64>`, `Into<i64>`
macro_rules! row_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw rowid.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the raw rowid.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id_type!(AdminId, "An operator account identifier (`admin.id`).");
row_id_type!(CustomerId, "A customer identifier (`customer.id`).");
row_id_type!(
    DriverId,
    "A driver identifier (`driver.id`).\n\nReferenced by `trip.driver_id` once a trip is dispatched."
);
row_id_type!(TripId, "A trip identifier (`trip.id`).");
row_id_type!(
    PaymentId,
    "A payment identifier (`payment.id`).\n\nPayments reference their trip through `payment.trip_id`."
);
